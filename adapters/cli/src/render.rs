use std::fmt::Write as _;

use contagion_board::{query, Board};
use contagion_core::{Tile, TilePosition, TileStatus, HOLE_GLYPH};

const REMOVED_GLYPH: char = '_';
const SELECTED_MARKER: char = '*';

/// Renders the board as text, one line per row, marking selected tiles.
///
/// Healthy tiles print their lowercase glyph, malignant tiles the uppercase
/// glyph, removed tiles `_` and holes `.`.
pub(crate) fn render_board(board: &Board, selected: &[Tile]) -> String {
    let (columns, rows) = query::dimensions(board);
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} ({:?})",
        query::title(board),
        query::adjacency(board)
    );

    for row in 0..rows {
        let mut line = String::new();
        for column in 0..columns {
            let position = TilePosition::new(row, column);
            let glyph = match query::tile(board, position) {
                Ok(tile) => tile_glyph(tile),
                Err(_) => HOLE_GLYPH,
            };
            let marker = if selected.iter().any(|tile| tile.position == position) {
                SELECTED_MARKER
            } else {
                ' '
            };
            line.push(glyph);
            line.push(marker);
        }
        let _ = writeln!(text, "{}", line.trim_end());
    }
    text
}

fn tile_glyph(tile: Tile) -> char {
    match tile.status {
        TileStatus::Healthy => tile.kind.glyph(),
        TileStatus::Malignant => tile.kind.glyph().to_ascii_uppercase(),
        TileStatus::Removed => REMOVED_GLYPH,
    }
}
