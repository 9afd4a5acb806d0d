#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure matching system that tracks a drag gesture and resolves it into removals.

use contagion_core::{Command, Match, Tile, TileKind, TilePosition, TileStatus, TileView};

/// Tracks the in-progress selection path and converts it into removal commands.
#[derive(Debug, Default, Clone)]
pub struct MatchEngine {
    path: Vec<TilePosition>,
    kind: Option<TileKind>,
}

impl MatchEngine {
    /// Creates a new matching system with an empty selection path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a tile to the selection path, returning whether it was accepted.
    ///
    /// An empty path accepts any live tile as its start. Offering the
    /// second-to-last tile retracts the last one. Any other tile must be
    /// live, adjacent to the last tile, of the path's kind and not already
    /// selected; otherwise it is rejected and the path is left untouched.
    pub fn select_tile(&mut self, view: TileView<'_>, position: TilePosition) -> bool {
        let Some(tile) = view.tile(position) else {
            return false;
        };

        let Some(last) = self.path.last().copied() else {
            if !tile.status.is_live() {
                return false;
            }
            self.path.push(position);
            self.kind = Some(tile.kind);
            return true;
        };

        if self.is_backtrack(position) {
            let _ = self.path.pop();
            return true;
        }

        let accepted = tile.status.is_live()
            && Some(tile.kind) == self.kind
            && view.are_adjacent(last, position)
            && !self.path.contains(&position);
        if accepted {
            self.path.push(position);
        }
        accepted
    }

    /// Returns the tiles of the current path, in selection order.
    #[must_use]
    pub fn tiles_in_match(&self, view: TileView<'_>) -> Vec<Tile> {
        self.path
            .iter()
            .filter_map(|position| view.tile(*position))
            .collect()
    }

    /// Positions of the current path, in selection order.
    #[must_use]
    pub fn path(&self) -> &[TilePosition] {
        &self.path
    }

    /// Resolves the current path, emitting a removal command on success.
    ///
    /// The path is consumed: a second call without new selections yields
    /// `None`. Paths shorter than two tiles never match.
    pub fn resolve_match(&mut self, view: TileView<'_>, out: &mut Vec<Command>) -> Option<Match> {
        let path = std::mem::take(&mut self.path);
        let kind = self.kind.take()?;

        if path.len() < 2 {
            return None;
        }

        let mut cured = 0;
        for position in &path {
            match view.tile(*position) {
                Some(tile) if tile.status.is_live() && tile.kind == kind => {
                    if tile.status == TileStatus::Malignant {
                        cured += 1;
                    }
                }
                _ => {
                    log::debug!("discarding stale selection path at {position:?}");
                    return None;
                }
            }
        }

        out.push(Command::RemoveTiles {
            positions: path.clone(),
        });
        log::debug!("resolved {kind:?} match of {} tiles", path.len());
        Some(Match::new(kind, path, cured))
    }

    /// Empties the selection path.
    pub fn clear_path(&mut self) {
        self.path.clear();
        self.kind = None;
    }

    fn is_backtrack(&self, position: TilePosition) -> bool {
        self.path.len() >= 2 && self.path[self.path.len() - 2] == position
    }
}
