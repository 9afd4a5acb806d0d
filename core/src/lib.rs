#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Contagion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and pure systems. Systems read immutable [`TileView`]
//! snapshots and respond with [`Command`] batches; the board executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values that
//! describe exactly which tiles changed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the active board with a fresh one built from the template.
    LoadLevel {
        /// Immutable layout the new board is constructed from.
        template: LevelTemplate,
    },
    /// Marks every listed tile as removed.
    ///
    /// Positions that are unknown or already removed are ignored.
    RemoveTiles {
        /// Tiles to remove, usually the positions of a resolved match.
        positions: Vec<TilePosition>,
    },
    /// Turns every listed healthy tile malignant.
    ///
    /// Positions that are unknown, malignant or removed are ignored.
    InfectTiles {
        /// Tiles to infect, computed from a single pre-step snapshot.
        positions: Vec<TilePosition>,
    },
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new board replaced the previous one.
    BoardLoaded {
        /// Number of columns in the new board.
        columns: u32,
        /// Number of rows in the new board.
        rows: u32,
        /// Number of tiles the template placed on the board.
        tiles: usize,
    },
    /// Confirms the tiles whose status actually changed to removed.
    TilesRemoved {
        /// Positions that transitioned, in command order.
        positions: Vec<TilePosition>,
    },
    /// Confirms the tiles whose status actually changed to malignant.
    TilesInfected {
        /// Positions that transitioned, in command order.
        positions: Vec<TilePosition>,
    },
}

/// Location of a single tile expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePosition {
    row: u32,
    column: u32,
}

impl TilePosition {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the position shifted by the provided signed offsets.
    ///
    /// Yields `None` when the shift would leave the non-negative quadrant.
    #[must_use]
    pub fn offset(self, row_delta: i32, column_delta: i32) -> Option<Self> {
        let row = self.row.checked_add_signed(row_delta)?;
        let column = self.column.checked_add_signed(column_delta)?;
        Some(Self::new(row, column))
    }
}

/// Colour category that decides which tiles may chain together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Red tiles.
    Red,
    /// Yellow tiles.
    Yellow,
    /// Green tiles.
    Green,
    /// Blue tiles.
    Blue,
    /// Purple tiles.
    Purple,
}

impl TileKind {
    /// Every kind in declaration order.
    pub const ALL: [TileKind; 5] = [
        TileKind::Red,
        TileKind::Yellow,
        TileKind::Green,
        TileKind::Blue,
        TileKind::Purple,
    ];

    /// Lowercase glyph used by the ASCII layout format.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Yellow => 'y',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Purple => 'p',
        }
    }

    /// Resolves a glyph, ignoring case, to its kind.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        let lowered = glyph.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.glyph() == lowered)
    }
}

/// Health of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileStatus {
    /// Uncontaminated tile.
    Healthy,
    /// Contaminated tile that spreads to its neighbours every step.
    Malignant,
    /// Tile cleared by a match. Terminal; the position is never reused.
    Removed,
}

impl TileStatus {
    /// Reports whether the tile still takes part in play.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// Immutable representation of a single tile used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Grid position occupied by the tile.
    pub position: TilePosition,
    /// Colour category of the tile.
    pub kind: TileKind,
    /// Current health of the tile.
    pub status: TileStatus,
}

/// Neighbourhood rule shared by matching and spreading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjacency {
    /// Four neighbours: north, east, south and west.
    #[default]
    Orthogonal,
    /// Eight neighbours: the orthogonal ones plus the diagonals.
    Octile,
}

const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
const OCTILE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Adjacency {
    /// Row and column offsets that reach every neighbour.
    #[must_use]
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::Orthogonal => &ORTHOGONAL_OFFSETS,
            Self::Octile => &OCTILE_OFFSETS,
        }
    }

    /// Reports whether two positions neighbour each other under the rule.
    #[must_use]
    pub fn are_adjacent(self, a: TilePosition, b: TilePosition) -> bool {
        let row_diff = a.row().abs_diff(b.row());
        let column_diff = a.column().abs_diff(b.column());
        match self {
            Self::Orthogonal => row_diff + column_diff == 1,
            Self::Octile => row_diff.max(column_diff) == 1,
        }
    }
}

/// Read-only view into the dense tile grid of a board.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    cells: &'a [Option<Tile>],
    columns: u32,
    rows: u32,
    adjacency: Adjacency,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Option<Tile>], columns: u32, rows: u32, adjacency: Adjacency) -> Self {
        Self {
            cells,
            columns,
            rows,
            adjacency,
        }
    }

    /// Returns the tile at the provided position, if one exists.
    #[must_use]
    pub fn tile(&self, position: TilePosition) -> Option<Tile> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Iterates over every tile in row-major order, skipping holes.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + 'a {
        self.cells.iter().filter_map(|cell| *cell)
    }

    /// Iterates over the tiles neighbouring the provided position.
    pub fn neighbours(&self, position: TilePosition) -> impl Iterator<Item = Tile> + 'a {
        let view = *self;
        self.adjacency
            .offsets()
            .iter()
            .filter_map(move |(row_delta, column_delta)| {
                position
                    .offset(*row_delta, *column_delta)
                    .and_then(|neighbour| view.tile(neighbour))
            })
    }

    /// Reports whether two positions neighbour each other on this board.
    #[must_use]
    pub fn are_adjacent(&self, a: TilePosition, b: TilePosition) -> bool {
        self.adjacency.are_adjacent(a, b)
    }

    /// Neighbourhood rule in effect for the board.
    #[must_use]
    pub const fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Converts a position into an index of the dense cell slice.
    #[must_use]
    pub fn index(&self, position: TilePosition) -> Option<usize> {
        grid_index(position, self.columns, self.rows)
    }
}

/// Converts a position into a row-major index for a grid of the given size.
#[must_use]
pub fn grid_index(position: TilePosition, columns: u32, rows: u32) -> Option<usize> {
    if position.column() < columns && position.row() < rows {
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(columns).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

/// One-based level index. Values below one clamp to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelNumber(u32);

impl LevelNumber {
    /// The first level.
    pub const FIRST: LevelNumber = LevelNumber(1);

    /// Creates a level number, clamping anything below one up to one.
    #[must_use]
    pub const fn clamped(value: u32) -> Self {
        if value == 0 {
            Self::FIRST
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric value of the level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Level that precedes this one, never dropping below the first level.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }
}

/// Initial content of a single cell in a level template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellTemplate {
    /// Colour category of the tile placed in the cell.
    pub kind: TileKind,
    /// Initial health of the tile.
    pub status: TileStatus,
}

/// Reasons a level template fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The cell list does not cover the declared grid exactly.
    #[error("template declares {columns}x{rows} cells but provides {provided}")]
    CellCountMismatch {
        /// Declared number of columns.
        columns: u32,
        /// Declared number of rows.
        rows: u32,
        /// Number of cells actually provided.
        provided: usize,
    },
    /// A template cell starts out removed.
    #[error("cell at row {row}, column {column} cannot start removed")]
    RemovedCell {
        /// Row of the offending cell.
        row: u32,
        /// Column of the offending cell.
        column: u32,
    },
    /// The ASCII layout contained no rows.
    #[error("layout is empty")]
    EmptyLayout,
    /// An ASCII layout row differs in width from the first row.
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The grid has more rows or columns than a `u32` can address.
    #[error("layout exceeds the addressable grid size")]
    GridTooLarge,
    /// An ASCII layout used a glyph that names no tile kind.
    #[error("unknown glyph '{glyph}' in layout row {row}")]
    UnknownGlyph {
        /// Zero-based index of the offending row.
        row: usize,
        /// The unrecognised character.
        glyph: char,
    },
}

/// Glyph marking an intentionally omitted cell in ASCII layouts.
pub const HOLE_GLYPH: char = '.';

/// Immutable layout a board is constructed from.
///
/// Deserialized templates pass through [`LevelTemplate::new`] and are
/// rejected when they fail its validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelTemplate")]
pub struct LevelTemplate {
    title: String,
    columns: u32,
    rows: u32,
    adjacency: Adjacency,
    cells: Vec<Option<CellTemplate>>,
}

impl LevelTemplate {
    /// Creates a template from explicit row-major cells.
    pub fn new(
        title: impl Into<String>,
        columns: u32,
        rows: u32,
        adjacency: Adjacency,
        cells: Vec<Option<CellTemplate>>,
    ) -> Result<Self, TemplateError> {
        let expected = u64::from(columns) * u64::from(rows);
        if u64::try_from(cells.len()).ok() != Some(expected) {
            return Err(TemplateError::CellCountMismatch {
                columns,
                rows,
                provided: cells.len(),
            });
        }

        let width = row_width(columns);
        for (index, cell) in cells.iter().enumerate() {
            if let Some(CellTemplate {
                status: TileStatus::Removed,
                ..
            }) = cell
            {
                let position = position_at(index, width).ok_or(TemplateError::GridTooLarge)?;
                return Err(TemplateError::RemovedCell {
                    row: position.row(),
                    column: position.column(),
                });
            }
        }

        Ok(Self {
            title: title.into(),
            columns,
            rows,
            adjacency,
            cells,
        })
    }

    /// Parses a template from the ASCII layout format.
    ///
    /// Each non-blank line is a row. `r y g b p` place healthy tiles of that
    /// kind, the uppercase glyph places a malignant one, and `.` leaves the
    /// cell empty. Whitespace inside a row is ignored.
    pub fn from_ascii(
        title: impl Into<String>,
        adjacency: Adjacency,
        layout: &str,
    ) -> Result<Self, TemplateError> {
        let mut cells = Vec::new();
        let mut width: Option<usize> = None;
        let mut rows: u32 = 0;

        for (row, line) in layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut found = 0;
            for glyph in line.chars().filter(|glyph| !glyph.is_whitespace()) {
                cells.push(parse_glyph(glyph, row)?);
                found += 1;
            }

            match width {
                None => width = Some(found),
                Some(expected) if expected != found => {
                    return Err(TemplateError::RaggedRow {
                        row,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            rows = rows.checked_add(1).ok_or(TemplateError::GridTooLarge)?;
        }

        let Some(width) = width else {
            return Err(TemplateError::EmptyLayout);
        };

        let columns = u32::try_from(width).map_err(|_| TemplateError::GridTooLarge)?;
        Self::new(title, columns, rows, adjacency, cells)
    }

    /// Renders the template back into the ASCII layout format, one line per row.
    #[must_use]
    pub fn to_ascii(&self) -> Vec<String> {
        self.cells
            .chunks(row_width(self.columns))
            .map(|row| row.iter().map(|cell| cell_glyph(*cell)).collect())
            .collect()
    }

    /// Display title of the level.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Neighbourhood rule the level is played with.
    #[must_use]
    pub const fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Row-major cell contents; `None` marks an omitted cell.
    #[must_use]
    pub fn cells(&self) -> &[Option<CellTemplate>] {
        &self.cells
    }

    /// Iterates over the occupied cells together with their positions.
    pub fn placed_cells(&self) -> impl Iterator<Item = (TilePosition, CellTemplate)> + '_ {
        let width = row_width(self.columns);
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            cell.zip(position_at(index, width))
                .map(|(cell, position)| (position, cell))
        })
    }
}

#[derive(Serialize, Deserialize)]
struct RawLevelTemplate {
    title: String,
    columns: u32,
    rows: u32,
    adjacency: Adjacency,
    cells: Vec<Option<CellTemplate>>,
}

impl TryFrom<RawLevelTemplate> for LevelTemplate {
    type Error = TemplateError;

    fn try_from(raw: RawLevelTemplate) -> Result<Self, Self::Error> {
        Self::new(raw.title, raw.columns, raw.rows, raw.adjacency, raw.cells)
    }
}

fn row_width(columns: u32) -> usize {
    usize::try_from(columns.max(1)).unwrap_or(usize::MAX)
}

fn position_at(index: usize, width: usize) -> Option<TilePosition> {
    let row = u32::try_from(index / width).ok()?;
    let column = u32::try_from(index % width).ok()?;
    Some(TilePosition::new(row, column))
}

fn parse_glyph(glyph: char, row: usize) -> Result<Option<CellTemplate>, TemplateError> {
    if glyph == HOLE_GLYPH {
        return Ok(None);
    }

    let kind = TileKind::from_glyph(glyph).ok_or(TemplateError::UnknownGlyph { row, glyph })?;
    let status = if glyph.is_ascii_uppercase() {
        TileStatus::Malignant
    } else {
        TileStatus::Healthy
    };
    Ok(Some(CellTemplate { kind, status }))
}

fn cell_glyph(cell: Option<CellTemplate>) -> char {
    match cell {
        None => HOLE_GLYPH,
        Some(CellTemplate {
            kind,
            status: TileStatus::Malignant,
        }) => kind.glyph().to_ascii_uppercase(),
        Some(CellTemplate { kind, .. }) => kind.glyph(),
    }
}

/// Descriptor of a resolved selection path, removed together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    kind: TileKind,
    positions: Vec<TilePosition>,
    cured: usize,
}

impl Match {
    /// Creates a match descriptor.
    #[must_use]
    pub fn new(kind: TileKind, positions: Vec<TilePosition>, cured: usize) -> Self {
        Self {
            kind,
            positions,
            cured,
        }
    }

    /// Kind shared by every tile of the match.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Number of tiles removed by the match.
    #[must_use]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// Removed positions in the order they were selected.
    #[must_use]
    pub fn positions(&self) -> &[TilePosition] {
        &self.positions
    }

    /// Number of removed tiles that were malignant.
    #[must_use]
    pub const fn cured(&self) -> usize {
        self.cured
    }
}
