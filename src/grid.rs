//! Board state and placement operations for pentomino tilings.
//!
//! The mask is fixed for the lifetime of a board. Filled cells, the
//! cell-to-piece map and the used-piece set change together through
//! [`Board::apply`] and [`Board::unapply`], which must always be paired.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;

use crate::geometry::{shift_cells, OrientationTable};
use crate::pieces::{Coord, Piece, PieceSet, Problem};

/// Cell-to-piece assignment, ordered row-major.
pub type BoardMap = BTreeMap<Coord, Piece>;

/// A piece at absolute board cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub piece: Piece,
    pub cells: Vec<Coord>,
}

/// Mutable board owned by a single search call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: i32,
    cols: i32,
    /// Mask cells in row-major order; the anchor scan walks this.
    sorted_mask: Vec<Coord>,
    allowed: FxHashSet<Coord>,
    filled: FxHashSet<Coord>,
    assignment: BoardMap,
    used: PieceSet,
}

impl Board {
    pub fn new(problem: &Problem) -> Self {
        Self {
            rows: problem.rows,
            cols: problem.cols,
            sorted_mask: problem.mask.clone(),
            allowed: problem.mask.iter().copied().collect(),
            filled: FxHashSet::default(),
            assignment: BoardMap::new(),
            used: PieceSet::default(),
        }
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[inline]
    pub fn mask(&self) -> &[Coord] {
        &self.sorted_mask
    }

    #[inline]
    pub fn is_allowed(&self, cell: Coord) -> bool {
        self.allowed.contains(&cell)
    }

    #[inline]
    pub fn is_filled(&self, cell: Coord) -> bool {
        self.filled.contains(&cell)
    }

    #[inline]
    pub fn is_used(&self, piece: Piece) -> bool {
        self.used.contains(piece)
    }

    #[inline]
    pub fn used(&self) -> PieceSet {
        self.used
    }

    #[inline]
    pub fn assignment(&self) -> &BoardMap {
        &self.assignment
    }

    /// True once every mask cell is filled.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled.len() == self.sorted_mask.len()
    }

    /// The first unfilled mask cell in row-major order.
    ///
    /// Returns `None` if the board is full.
    pub fn first_empty(&self) -> Option<Coord> {
        self.sorted_mask
            .iter()
            .copied()
            .find(|cell| !self.filled.contains(cell))
    }

    /// True iff every cell is on the mask and currently empty.
    pub fn can_place(&self, cells: &[Coord]) -> bool {
        cells
            .iter()
            .all(|cell| self.allowed.contains(cell) && !self.filled.contains(cell))
    }

    pub fn apply(&mut self, piece: Piece, cells: &[Coord]) {
        self.used.insert(piece);
        for &cell in cells {
            self.filled.insert(cell);
            self.assignment.insert(cell, piece);
        }
    }

    /// Reverses an [`apply`](Self::apply) made with the same arguments.
    pub fn unapply(&mut self, piece: Piece, cells: &[Coord]) {
        self.used.remove(piece);
        for cell in cells {
            self.filled.remove(cell);
            self.assignment.remove(cell);
        }
    }

    /// Every legal placement covering `anchor`, in search order.
    ///
    /// Order: pieces as listed, orientations as generated, then each cell of
    /// the orientation aligned onto the anchor. Any of the five cells may be
    /// the one that lands on the anchor, so all are tried.
    pub fn placements_at(
        &self,
        anchor: Coord,
        pieces: &[Piece],
        orientations: &OrientationTable,
    ) -> Vec<Placement> {
        let (anchor_row, anchor_col) = anchor;
        let mut placements = Vec::new();

        for &piece in pieces {
            if self.used.contains(piece) {
                continue;
            }
            for orientation in orientations.get(piece) {
                for &(cell_row, cell_col) in orientation {
                    let cells =
                        shift_cells(orientation, anchor_row - cell_row, anchor_col - cell_col);
                    if self.can_place(&cells) {
                        placements.push(Placement { piece, cells });
                    }
                }
            }
        }

        placements
    }

    /// Canonical string for the current assignment.
    pub fn signature(&self) -> String {
        board_signature(&self.assignment)
    }
}

/// Encodes an assignment as `r,c:P|r,c:P|...` in row-major order.
///
/// Two boards with the same assignment always share a signature.
pub fn board_signature(assignment: &BoardMap) -> String {
    assignment
        .iter()
        .map(|(&(r, c), piece)| format!("{r},{c}:{piece}"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Formats an assignment as a grid of piece letters.
///
/// Empty mask cells show as `.`, cells off the mask as a space.
pub fn format_board(assignment: &BoardMap, problem: &Problem) -> String {
    let allowed: FxHashSet<Coord> = problem.mask.iter().copied().collect();
    let mut output = String::new();

    for r in 0..problem.rows {
        for c in 0..problem.cols {
            let display_char = match assignment.get(&(r, c)) {
                Some(piece) => piece.letter(),
                None if allowed.contains(&(r, c)) => '.',
                None => ' ',
            };
            output.push(display_char);
        }
        // keep lines free of trailing padding
        let trimmed = output.trim_end_matches(' ').len();
        output.truncate(trimmed);
        output.push('\n');
    }

    output
}
