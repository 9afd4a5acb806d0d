#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Contagion.

use contagion_core::{
    grid_index, Adjacency, Command, Event, LevelTemplate, Tile, TilePosition, TileStatus,
};
use thiserror::Error;

/// Errors reported by board lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// No tile occupies the position: it is out of bounds or an omitted cell.
    #[error("no tile at {position:?}")]
    NotFound {
        /// Position that was looked up.
        position: TilePosition,
    },
}

/// Represents the authoritative tile grid of the active level.
#[derive(Clone, Debug, Default)]
pub struct Board {
    title: String,
    columns: u32,
    rows: u32,
    adjacency: Adjacency,
    cells: Vec<Option<Tile>>,
}

impl Board {
    /// Creates an empty board with no tiles; no level is loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh board from the provided template.
    #[must_use]
    pub fn from_template(template: &LevelTemplate) -> Self {
        let mut cells = vec![None; template.cells().len()];
        for (position, cell) in template.placed_cells() {
            if let Some(index) = grid_index(position, template.columns(), template.rows()) {
                cells[index] = Some(Tile {
                    position,
                    kind: cell.kind,
                    status: cell.status,
                });
            }
        }

        Self {
            title: template.title().to_owned(),
            columns: template.columns(),
            rows: template.rows(),
            adjacency: template.adjacency(),
            cells,
        }
    }

    fn tile_mut(&mut self, position: TilePosition) -> Option<&mut Tile> {
        let index = grid_index(position, self.columns, self.rows)?;
        self.cells.get_mut(index).and_then(Option::as_mut)
    }

    fn remove(&mut self, position: TilePosition) -> bool {
        match self.tile_mut(position) {
            Some(tile) if tile.status.is_live() => {
                tile.status = TileStatus::Removed;
                true
            }
            _ => false,
        }
    }

    fn infect(&mut self, position: TilePosition) -> bool {
        match self.tile_mut(position) {
            Some(tile) if tile.status == TileStatus::Healthy => {
                tile.status = TileStatus::Malignant;
                true
            }
            _ => false,
        }
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { template } => {
            *board = Board::from_template(&template);
            let tiles = board.cells.iter().flatten().count();
            log::debug!(
                "loaded board '{}' ({}x{}, {tiles} tiles)",
                board.title,
                board.columns,
                board.rows
            );
            out_events.push(Event::BoardLoaded {
                columns: board.columns,
                rows: board.rows,
                tiles,
            });
        }
        Command::RemoveTiles { positions } => {
            let removed: Vec<TilePosition> = positions
                .into_iter()
                .filter(|position| board.remove(*position))
                .collect();
            if !removed.is_empty() {
                out_events.push(Event::TilesRemoved { positions: removed });
            }
        }
        Command::InfectTiles { positions } => {
            let infected: Vec<TilePosition> = positions
                .into_iter()
                .filter(|position| board.infect(*position))
                .collect();
            if !infected.is_empty() {
                out_events.push(Event::TilesInfected {
                    positions: infected,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use super::{Board, BoardError};
    use contagion_core::{Adjacency, Tile, TilePosition, TileStatus, TileView};

    /// Retrieves the tile at the provided position.
    pub fn tile(board: &Board, position: TilePosition) -> Result<Tile, BoardError> {
        tile_view(board)
            .tile(position)
            .ok_or(BoardError::NotFound { position })
    }

    /// Collects every tile matching the predicate in row-major order.
    #[must_use]
    pub fn tiles_where<P>(board: &Board, mut predicate: P) -> Vec<Tile>
    where
        P: FnMut(&Tile) -> bool,
    {
        board
            .cells
            .iter()
            .flatten()
            .filter(|tile| predicate(*tile))
            .copied()
            .collect()
    }

    /// Captures a read-only view of the dense tile grid.
    #[must_use]
    pub fn tile_view(board: &Board) -> TileView<'_> {
        TileView::new(&board.cells, board.columns, board.rows, board.adjacency)
    }

    /// Counts the tiles currently in the provided status.
    #[must_use]
    pub fn count_status(board: &Board, status: TileStatus) -> usize {
        board
            .cells
            .iter()
            .flatten()
            .filter(|tile| tile.status == status)
            .count()
    }

    /// Display title of the loaded level.
    #[must_use]
    pub fn title(board: &Board) -> &str {
        &board.title
    }

    /// Neighbourhood rule of the loaded level.
    #[must_use]
    pub fn adjacency(board: &Board) -> Adjacency {
        board.adjacency
    }

    /// Dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(board: &Board) -> (u32, u32) {
        (board.columns, board.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contagion_core::{TileKind, TileStatus};

    fn board_from(layout: &str) -> Board {
        let template = LevelTemplate::from_ascii("Test", Adjacency::Orthogonal, layout)
            .expect("layout parses");
        Board::from_template(&template)
    }

    #[test]
    fn load_level_replaces_previous_board() {
        let mut board = board_from("bb\nbb");
        let mut events = Vec::new();
        let template = LevelTemplate::from_ascii("Next", Adjacency::Octile, "r.r\nrRr")
            .expect("layout parses");

        apply(&mut board, Command::LoadLevel { template }, &mut events);

        assert_eq!(
            events,
            vec![Event::BoardLoaded {
                columns: 3,
                rows: 2,
                tiles: 5,
            }]
        );
        assert_eq!(query::title(&board), "Next");
        assert_eq!(query::adjacency(&board), Adjacency::Octile);
        assert_eq!(query::count_status(&board, TileStatus::Malignant), 1);
    }

    #[test]
    fn lookup_reports_holes_and_out_of_bounds() {
        let board = board_from("b.\nbb");
        let hole = TilePosition::new(0, 1);
        let outside = TilePosition::new(5, 0);

        assert_eq!(
            query::tile(&board, hole),
            Err(BoardError::NotFound { position: hole })
        );
        assert_eq!(
            query::tile(&board, outside),
            Err(BoardError::NotFound { position: outside })
        );
        let tile = query::tile(&board, TilePosition::new(1, 1)).expect("tile exists");
        assert_eq!(tile.kind, TileKind::Blue);
    }

    #[test]
    fn infect_only_touches_healthy_tiles() {
        let mut board = board_from("bR\nbb");
        let mut events = Vec::new();
        let healthy = TilePosition::new(0, 0);
        let malignant = TilePosition::new(0, 1);

        apply(
            &mut board,
            Command::RemoveTiles {
                positions: vec![TilePosition::new(1, 1)],
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut board,
            Command::InfectTiles {
                positions: vec![healthy, malignant, TilePosition::new(1, 1)],
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TilesInfected {
                positions: vec![healthy],
            }]
        );
        let removed = query::tile(&board, TilePosition::new(1, 1)).expect("tile exists");
        assert_eq!(removed.status, TileStatus::Removed);
    }

    #[test]
    fn tiles_where_filters_in_row_major_order() {
        let board = board_from("bRb\nRbR");
        let malignant = query::tiles_where(&board, |tile| tile.status == TileStatus::Malignant);
        let positions: Vec<_> = malignant.iter().map(|tile| tile.position).collect();
        assert_eq!(
            positions,
            vec![
                TilePosition::new(0, 1),
                TilePosition::new(1, 0),
                TilePosition::new(1, 2),
            ]
        );
    }
}
