#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spread system that advances contamination one step at a time.
//!
//! Every tile that is malignant in the pre-step snapshot infects each of its
//! healthy neighbours under the board's adjacency rule. Targets are gathered
//! from the snapshot before any command is emitted, so tiles infected during
//! a step never spread within the same step and the outcome does not depend
//! on iteration order.

use std::collections::VecDeque;

use contagion_core::{Command, TilePosition, TileStatus, TileView};

/// Summary of a single spread step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpreadOutcome {
    /// Tiles the step turned malignant, sorted row-major.
    pub infected: Vec<TilePosition>,
    /// Whether the step belongs to the automatic spread loop.
    pub auto_play: bool,
    /// One-based index of the step since the system was created.
    pub step_index: u64,
}

/// Pure system that computes contamination spread and board status counts.
#[derive(Debug, Default)]
pub struct SpreadEngine {
    steps: u64,
    scratch_targets: Vec<TilePosition>,
    scratch_visited: Vec<bool>,
    scratch_frontier: VecDeque<TilePosition>,
}

impl SpreadEngine {
    /// Creates a new spread system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances contamination by one step, emitting a single infection command.
    ///
    /// `auto_play` does not alter the rule; it is echoed in the outcome so the
    /// caller can tell player-triggered steps from automatic ones.
    pub fn step(
        &mut self,
        view: TileView<'_>,
        auto_play: bool,
        out: &mut Vec<Command>,
    ) -> SpreadOutcome {
        self.steps = self.steps.saturating_add(1);
        self.scratch_targets.clear();

        for tile in view.iter() {
            if tile.status != TileStatus::Malignant {
                continue;
            }
            self.scratch_targets.extend(
                view.neighbours(tile.position)
                    .filter(|neighbour| neighbour.status == TileStatus::Healthy)
                    .map(|neighbour| neighbour.position),
            );
        }

        self.scratch_targets.sort_unstable();
        self.scratch_targets.dedup();
        let infected = self.scratch_targets.clone();

        if !infected.is_empty() {
            out.push(Command::InfectTiles {
                positions: infected.clone(),
            });
        }

        log::debug!(
            "spread step {} infected {} tiles (auto_play: {auto_play})",
            self.steps,
            infected.len()
        );

        SpreadOutcome {
            infected,
            auto_play,
            step_index: self.steps,
        }
    }

    /// Counts the tiles that are currently malignant.
    #[must_use]
    pub fn malignant_remaining(&self, view: TileView<'_>) -> usize {
        view.iter()
            .filter(|tile| tile.status == TileStatus::Malignant)
            .count()
    }

    /// Counts the legal matches still available on the board.
    ///
    /// A legal match is a connected component of at least two live tiles of
    /// the same kind under the board's adjacency rule.
    pub fn matches_remaining(&mut self, view: TileView<'_>) -> usize {
        let (columns, rows) = view.dimensions();
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        self.scratch_visited.clear();
        self.scratch_visited.resize(cell_count, false);

        let mut matches = 0;
        for tile in view.iter() {
            if !tile.status.is_live() || self.is_visited(view, tile.position) {
                continue;
            }

            self.mark_visited(view, tile.position);
            self.scratch_frontier.clear();
            self.scratch_frontier.push_back(tile.position);
            let mut size = 0usize;

            while let Some(current) = self.scratch_frontier.pop_front() {
                size += 1;
                for neighbour in view.neighbours(current) {
                    if neighbour.kind != tile.kind
                        || !neighbour.status.is_live()
                        || self.is_visited(view, neighbour.position)
                    {
                        continue;
                    }
                    self.mark_visited(view, neighbour.position);
                    self.scratch_frontier.push_back(neighbour.position);
                }
            }

            if size >= 2 {
                matches += 1;
            }
        }
        matches
    }

    fn is_visited(&self, view: TileView<'_>, position: TilePosition) -> bool {
        view.index(position)
            .and_then(|index| self.scratch_visited.get(index).copied())
            .unwrap_or(true)
    }

    fn mark_visited(&mut self, view: TileView<'_>, position: TilePosition) {
        if let Some(slot) = view
            .index(position)
            .and_then(|index| self.scratch_visited.get_mut(index))
        {
            *slot = true;
        }
    }
}
