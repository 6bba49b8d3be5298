//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Board side length.
pub const SIDE: usize = 3;

/// One of the two move markers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Symbol {
    /// Moves first.
    X,
    /// Moves second.
    O,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    Empty,
    /// Holds a player's mark.
    Marked(Symbol),
}

impl Cell {
    /// Character used in the ASCII grid.
    pub fn glyph(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Marked(Symbol::X) => 'X',
            Cell::Marked(Symbol::O) => 'O',
        }
    }
}

/// A validated `(row, col)` pair, both in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    row: usize,
    col: usize,
}

impl Coord {
    /// Creates a coordinate, or `None` when either index is off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < SIDE && col < SIDE).then_some(Self { row, col })
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// All nine coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..SIDE).flat_map(|row| (0..SIDE).map(move |col| Coord { row, col }))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; SIDE]; SIDE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; SIDE]; SIDE],
        }
    }

    /// Returns the cell at the coordinate.
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[at.row][at.col]
    }

    /// Overwrites the cell at the coordinate.
    pub(crate) fn set(&mut self, at: Coord, cell: Cell) {
        self.cells[at.row][at.col] = cell;
    }

    /// Checks if the cell at the coordinate is empty.
    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at) == Cell::Empty
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> &[[Cell; SIDE]; SIDE] {
        &self.cells
    }

    /// Number of marked cells.
    pub fn marked_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Renders the board as rows of space-separated glyphs, `-` for empty.
    ///
    /// ```
    /// use parley_tictactoe::Board;
    ///
    /// assert_eq!(Board::new().to_ascii(), "- - -\n- - -\n- - -");
    /// ```
    pub fn to_ascii(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.glyph().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parses a compact layout such as `"X-O/-X-/--O"`.
    ///
    /// Rows are separated by `/` and whitespace is ignored. Accepts `-` or `.`
    /// for empty cells. Mark counts are not checked; this is a fixture and
    /// debugging helper, not a legal-position validator.
    pub fn from_layout(layout: &str) -> Option<Self> {
        let rows: Vec<Vec<char>> = layout
            .split('/')
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();
        if rows.len() != SIDE || rows.iter().any(|row| row.len() != SIDE) {
            return None;
        }

        let mut board = Board::new();
        for (row, chars) in rows.iter().enumerate() {
            for (col, c) in chars.iter().enumerate() {
                let cell = match c.to_ascii_uppercase() {
                    'X' => Cell::Marked(Symbol::X),
                    'O' => Cell::Marked(Symbol::O),
                    '-' | '.' => Cell::Empty,
                    _ => return None,
                };
                board.cells[row][col] = cell;
            }
        }
        Some(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
