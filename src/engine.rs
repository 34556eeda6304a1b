//! Core game engine for the Number Match puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Cell`: the three kinds of board slot (active digit, cleared slot,
//!   vacant padding).
//! - `Board`: the dealt tiles as a flat sequence in rows of nine, with
//!   parsing, move enumeration, move application (including row
//!   compaction), and the "deal more tiles" extension.
//! - `Move`: an ordered pair of positions whose tiles are removed together.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;

/// Number of cells in a board row. Boards always hold whole rows.
pub const ROW_WIDTH: usize = 9;

/// One slot of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// An active tile holding a digit 1-9, eligible for matching.
    Digit(u8),
    /// A previously matched slot. Still occupies space, never matchable.
    Cleared,
    /// Padding beyond the dealt tiles. Never matchable, never counted.
    Vacant,
}

impl Cell {
    /// Whether this cell holds a matchable digit.
    pub fn is_active(&self) -> bool {
        matches!(self, Cell::Digit(_))
    }

    /// The digit held by an active cell.
    pub fn digit(&self) -> Option<u8> {
        match self {
            Cell::Digit(d) => Some(*d),
            _ => None,
        }
    }

    /// Character representation used by [`Board::parse`] and `Display`.
    ///
    /// # Examples
    /// ```
    /// use numbermatch_solver::engine::Cell;
    /// assert_eq!(Cell::Digit(7).to_char(), '7');
    /// assert_eq!(Cell::Cleared.to_char(), '.');
    /// assert_eq!(Cell::Vacant.to_char(), ' ');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Cell::Digit(d) => (b'0' + d) as char,
            Cell::Cleared => '.',
            Cell::Vacant => ' ',
        }
    }

    fn from_char(c: char) -> Cell {
        match c {
            '1'..='9' => Cell::Digit(c as u8 - b'0'),
            '.' | '0' => Cell::Cleared,
            _ => Cell::Vacant,
        }
    }
}

/// Structural violations rejected by parsing and move application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The board text held nothing but blank lines.
    #[error("board text contains no parsable rows")]
    NoRows,
    /// A text row was wider than the board.
    #[error("row {line} holds {len} cells (a row fits {width})", width = ROW_WIDTH)]
    RowTooLong { line: usize, len: usize },
    /// A cell sequence did not fill whole rows.
    #[error("cell count {len} is not a multiple of the row width {width}", width = ROW_WIDTH)]
    RaggedLength { len: usize },
    /// A move position was past the end of the board.
    #[error("position {index} is outside the board (length {len})")]
    OutOfRange { index: usize, len: usize },
    /// A move position did not hold an active digit.
    #[error("position {index} does not hold an active digit")]
    NotActive { index: usize },
}

/// An ordered pair of board positions whose tiles are removed together.
///
/// The two tiles must hold equal digits or digits summing to ten, and no
/// other active tile may sit between them along the direction connecting
/// them. Positions index the flattened board; `a < b` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    /// Lower position of the pair.
    pub a: usize,
    /// Higher position of the pair.
    pub b: usize,
}

impl Move {
    /// Builds a move from two distinct positions, lower position first.
    pub fn new(a: usize, b: usize) -> Move {
        assert!(a != b, "a move joins two distinct positions");
        if a < b {
            Move { a, b }
        } else {
            Move { a: b, b: a }
        }
    }

    /// Whether the endpoints sit on a strict diagonal of the grid.
    pub fn is_diagonal(&self) -> bool {
        let (row_a, col_a) = Board::row_col(self.a);
        let (row_b, col_b) = Board::row_col(self.b);
        row_a != row_b && row_b - row_a == col_a.abs_diff(col_b)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (row_a, col_a) = Board::row_col(self.a);
        let (row_b, col_b) = Board::row_col(self.b);
        write!(f, "({row_a},{col_a})-({row_b},{col_b})")
    }
}

/// The puzzle board: dealt tiles in reading order, nine per row.
///
/// Boards are immutable values; every transformation returns a new board.
/// Equality and hashing cover the exact ordered cell sequence, with
/// digit, cleared, and vacant slots all distinguished, so two boards
/// differing only in their padding are distinct states. This identity is
/// what the solver's visited set keys on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Reads a board from text, one row per line.
    ///
    /// Lines are trimmed and blank lines dropped. Within a row, digits
    /// `1`-`9` become active tiles, `.` (or `0`) a cleared slot, and any
    /// other character a vacant slot; short rows are padded with vacant
    /// slots to the full row width.
    ///
    /// # Examples
    /// ```
    /// use numbermatch_solver::engine::{Board, Cell};
    /// let board = Board::parse("91\n.5").unwrap();
    /// assert_eq!(board.len(), 18);
    /// assert_eq!(board.remaining_count(), 3);
    /// assert_eq!(board.cells()[9], Cell::Cleared);
    /// ```
    pub fn parse(text: &str) -> Result<Board, BoardError> {
        let mut cells = Vec::new();
        let mut rows = 0usize;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let len = line.chars().count();
            if len > ROW_WIDTH {
                return Err(BoardError::RowTooLong { line: rows + 1, len });
            }
            let mut row = [Cell::Vacant; ROW_WIDTH];
            for (col, ch) in line.chars().enumerate() {
                row[col] = Cell::from_char(ch);
            }
            cells.extend_from_slice(&row);
            rows += 1;
        }
        if rows == 0 {
            return Err(BoardError::NoRows);
        }
        Ok(Board { cells })
    }

    /// Builds a board directly from cells; the count must fill whole rows.
    pub fn from_cells(cells: Vec<Cell>) -> Result<Board, BoardError> {
        if cells.len() % ROW_WIDTH != 0 {
            return Err(BoardError::RaggedLength { len: cells.len() });
        }
        Ok(Board { cells })
    }

    /// A fresh deal of `rows` full rows of random digits.
    ///
    /// The same seed always produces the same deal.
    pub fn random_deal(rows: usize, seed: u64) -> Board {
        let mut rng = SmallRng::seed_from_u64(seed);
        let cells = (0..rows * ROW_WIDTH)
            .map(|_| Cell::Digit(rng.gen_range(1..=9)))
            .collect();
        Board { cells }
    }

    /// The cells in reading order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total number of cells, vacant padding included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the board holds no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows on the board.
    pub fn row_count(&self) -> usize {
        self.cells.len() / ROW_WIDTH
    }

    /// Number of active digits left on the board.
    pub fn remaining_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active()).count()
    }

    /// Converts a flat position to (row, column) coordinates.
    pub fn row_col(index: usize) -> (usize, usize) {
        (index / ROW_WIDTH, index % ROW_WIDTH)
    }

    /// Converts (row, column) coordinates to a flat position.
    pub fn index(row: usize, col: usize) -> usize {
        row * ROW_WIDTH + col
    }

    /// Enumerates every legal pairing on the board.
    ///
    /// For each active cell, four directions are probed and only the
    /// nearest active cell along each is a candidate: the next active cell
    /// in reading order (which lets a pair wrap past a row boundary), then
    /// straight down, diagonally down-right, and diagonally down-left. A
    /// nearest candidate that does not pair is discarded, not retried
    /// further out. Two directions may reach the same partner, so the
    /// returned list can repeat a pair.
    ///
    /// # Examples
    /// ```
    /// use numbermatch_solver::engine::{Board, Move};
    /// let board = Board::parse("91").unwrap();
    /// assert_eq!(board.find_all_moves(), vec![Move::new(0, 1)]);
    /// ```
    pub fn find_all_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let n = self.cells.len();
        for i in 0..n {
            if !self.cells[i].is_active() {
                continue;
            }
            let (row, col) = Self::row_col(i);
            if let Some(k) = (i + 1..n).find(|&k| self.cells[k].is_active()) {
                if self.pairs(i, k) {
                    moves.push(Move::new(i, k));
                }
            }
            for (d_row, d_col) in [(1isize, 0isize), (1, 1), (1, -1)] {
                if let Some(j) = self.next_in_direction(row, col, d_row, d_col) {
                    if j > i && self.pairs(i, j) {
                        moves.push(Move::new(i, j));
                    }
                }
            }
        }
        moves
    }

    /// Whether the tiles at `i` and `j` hold equal digits or sum to ten.
    fn pairs(&self, i: usize, j: usize) -> bool {
        match (self.cells[i].digit(), self.cells[j].digit()) {
            (Some(a), Some(b)) => a == b || a + b == 10,
            _ => false,
        }
    }

    /// Nearest active cell from (row, col) along a fixed direction,
    /// skipping cleared and vacant slots.
    fn next_in_direction(&self, row: usize, col: usize, d_row: isize, d_col: isize) -> Option<usize> {
        let rows = self.row_count() as isize;
        let mut r = row as isize + d_row;
        let mut c = col as isize + d_col;
        while r >= 0 && r < rows && c >= 0 && (c as usize) < ROW_WIDTH {
            let index = Self::index(r as usize, c as usize);
            if self.cells[index].is_active() {
                return Some(index);
            }
            r += d_row;
            c += d_col;
        }
        None
    }

    /// Whether no active tile sits strictly between `i` and `j` along the
    /// direction connecting them: reading order, vertical, or diagonal.
    pub fn has_clear_path(&self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        if self.cells[i + 1..j].iter().all(|c| !c.is_active()) {
            return true;
        }
        let (row_i, col_i) = Self::row_col(i);
        let (row_j, col_j) = Self::row_col(j);
        if col_i == col_j {
            return (row_i + 1..row_j).all(|r| !self.cells[Self::index(r, col_i)].is_active());
        }
        if row_j - row_i == col_i.abs_diff(col_j) {
            let step: isize = if col_j > col_i { 1 } else { -1 };
            let mut col = col_i as isize;
            for row in row_i + 1..row_j {
                col += step;
                if self.cells[Self::index(row, col as usize)].is_active() {
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// Whether `mv` could be played on this board right now: both ends
    /// active, pairing rule satisfied, and the path between them clear.
    pub fn is_move_legal(&self, mv: Move) -> bool {
        mv.b < self.cells.len() && self.pairs(mv.a, mv.b) && self.has_clear_path(mv.a, mv.b)
    }

    /// Plays `mv`: clears both tiles, then drops every row left without an
    /// active tile, closing the gap. This is the only operation that
    /// shrinks a board, and the result always holds whole rows (possibly
    /// none).
    ///
    /// Fails on positions outside the board or not holding an active digit.
    ///
    /// # Examples
    /// ```
    /// use numbermatch_solver::engine::{Board, Move};
    /// let board = Board::parse("91").unwrap();
    /// let next = board.apply(Move::new(0, 1)).unwrap();
    /// assert!(next.is_empty());
    /// ```
    pub fn apply(&self, mv: Move) -> Result<Board, BoardError> {
        let len = self.cells.len();
        for index in [mv.a, mv.b] {
            if index >= len {
                return Err(BoardError::OutOfRange { index, len });
            }
            if !self.cells[index].is_active() {
                return Err(BoardError::NotActive { index });
            }
        }
        Ok(self.apply_known(mv))
    }

    /// `apply` for moves already known to target active tiles.
    pub(crate) fn apply_known(&self, mv: Move) -> Board {
        debug_assert!(mv.b < self.cells.len());
        debug_assert!(self.cells[mv.a].is_active() && self.cells[mv.b].is_active());
        let mut cells = self.cells.clone();
        cells[mv.a] = Cell::Cleared;
        cells[mv.b] = Cell::Cleared;
        let mut kept = Vec::with_capacity(cells.len());
        for row in cells.chunks(ROW_WIDTH) {
            if row.iter().any(|c| c.is_active()) {
                kept.extend_from_slice(row);
            }
        }
        Board { cells: kept }
    }

    /// Deals the remaining tiles again: every active digit, in reading
    /// order, is appended after the last non-vacant cell, and the result
    /// is padded with vacant slots to whole rows. Cleared slots before the
    /// last tile stay where they are; only the trailing padding is
    /// stripped before appending.
    ///
    /// # Examples
    /// ```
    /// use numbermatch_solver::engine::Board;
    /// let board = Board::parse("7").unwrap();
    /// assert_eq!(board.extend().to_string(), "77");
    /// ```
    pub fn extend(&self) -> Board {
        let deal: Vec<Cell> = self.cells.iter().filter(|c| c.is_active()).copied().collect();
        let mut cells = match self.cells.iter().rposition(|c| *c != Cell::Vacant) {
            Some(last) => self.cells[..=last].to_vec(),
            None => Vec::new(),
        };
        cells.extend(deal);
        while cells.len() % ROW_WIDTH != 0 {
            cells.push(Cell::Vacant);
        }
        Board { cells }
    }
}

impl fmt::Display for Board {
    /// One line per row; vacant slots print as spaces, trimmed on the right.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(ROW_WIDTH).enumerate() {
            if r > 0 {
                f.write_str("\n")?;
            }
            let line: String = row.iter().map(Cell::to_char).collect();
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}
