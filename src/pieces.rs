//! Pentomino definitions, coordinate types and puzzle problems.
//!
//! Each piece is defined as a set of unit cells in the plane, normalized
//! so the minimum row and column are zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProblemError;

/// A board cell as `(row, col)`. Tuple ordering is row-major.
pub type Coord = (i32, i32);

/// Number of cells in every piece.
pub const PIECE_CELLS: usize = 5;

/// The twelve free pentominoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Piece {
    F,
    I,
    L,
    P,
    N,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

/// All pieces in canonical order.
pub const PIECES: [Piece; 12] = [
    Piece::F,
    Piece::I,
    Piece::L,
    Piece::P,
    Piece::N,
    Piece::T,
    Piece::U,
    Piece::V,
    Piece::W,
    Piece::X,
    Piece::Y,
    Piece::Z,
];

impl Piece {
    /// Position of this piece in [`PIECES`], used as its bit in a [`PieceSet`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn letter(self) -> char {
        match self {
            Piece::F => 'F',
            Piece::I => 'I',
            Piece::L => 'L',
            Piece::P => 'P',
            Piece::N => 'N',
            Piece::T => 'T',
            Piece::U => 'U',
            Piece::V => 'V',
            Piece::W => 'W',
            Piece::X => 'X',
            Piece::Y => 'Y',
            Piece::Z => 'Z',
        }
    }

    /// Canonical cells of the piece.
    pub const fn cells(self) -> &'static [Coord; PIECE_CELLS] {
        match self {
            Piece::F => &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 0)],
            Piece::I => &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)],
            Piece::L => &[(0, 0), (1, 0), (2, 0), (3, 0), (3, 1)],
            Piece::P => &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 0)],
            Piece::N => &[(0, 0), (1, 0), (1, 1), (2, 1), (3, 1)],
            Piece::T => &[(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)],
            Piece::U => &[(0, 0), (0, 2), (1, 0), (1, 1), (1, 2)],
            Piece::V => &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)],
            Piece::W => &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)],
            Piece::X => &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)],
            Piece::Y => &[(0, 1), (1, 1), (2, 0), (2, 1), (3, 1)],
            Piece::Z => &[(0, 0), (0, 1), (1, 1), (2, 1), (2, 2)],
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Piece {
    type Err = ProblemError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.trim().chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(letter), None) => letter.to_ascii_uppercase(),
            _ => {
                return Err(ProblemError::UnknownPiece {
                    name: name.to_string(),
                })
            }
        };
        PIECES
            .iter()
            .copied()
            .find(|piece| piece.letter() == letter)
            .ok_or_else(|| ProblemError::UnknownPiece {
                name: name.to_string(),
            })
    }
}

/// Parses a piece list such as `"TIPXWUYNV"` or `"T,I,P"`.
pub fn parse_pieces(list: &str) -> Result<Vec<Piece>, ProblemError> {
    list.chars()
        .filter(|ch| !ch.is_whitespace() && *ch != ',')
        .map(|ch| ch.to_string().parse())
        .collect()
}

/// Set of pieces as a bitmask over [`Piece::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PieceSet(u16);

impl PieceSet {
    #[inline]
    pub fn contains(self, piece: Piece) -> bool {
        self.0 & (1 << piece.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, piece: Piece) {
        self.0 |= 1 << piece.index();
    }

    #[inline]
    pub fn remove(&mut self, piece: Piece) {
        self.0 &= !(1 << piece.index());
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Piece> {
        PIECES.into_iter().filter(move |piece| self.contains(*piece))
    }
}

/// A tiling problem: board extents, the allowed cells, and the ordered
/// candidate pieces.
///
/// The piece order decides which solution is found first, never whether
/// one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub rows: i32,
    pub cols: i32,
    /// Allowed cells, sorted row-major and deduplicated.
    pub mask: Vec<Coord>,
    pub pieces: Vec<Piece>,
}

impl Problem {
    /// Validates and builds a problem.
    pub fn new(
        rows: i32,
        cols: i32,
        mask: impl IntoIterator<Item = Coord>,
        pieces: Vec<Piece>,
    ) -> Result<Self, ProblemError> {
        if rows <= 0 || cols <= 0 {
            return Err(ProblemError::InvalidDimensions { rows, cols });
        }

        let mut mask: Vec<Coord> = mask.into_iter().collect();
        mask.sort_unstable();
        mask.dedup();
        if mask.is_empty() {
            return Err(ProblemError::EmptyMask);
        }
        if let Some(&(row, col)) = mask
            .iter()
            .find(|&&(r, c)| !(0..rows).contains(&r) || !(0..cols).contains(&c))
        {
            return Err(ProblemError::CellOutsideBoard {
                row,
                col,
                rows,
                cols,
            });
        }

        if pieces.is_empty() {
            return Err(ProblemError::NoPieces);
        }
        let mut seen = PieceSet::default();
        for &piece in &pieces {
            if seen.contains(piece) {
                return Err(ProblemError::DuplicatePiece { piece });
            }
            seen.insert(piece);
        }

        Ok(Self {
            rows,
            cols,
            mask,
            pieces,
        })
    }

    /// A fully open `rows x cols` rectangle.
    pub fn rectangle(rows: i32, cols: i32, pieces: Vec<Piece>) -> Result<Self, ProblemError> {
        let cells = (0..rows).flat_map(|r| (0..cols).map(move |c| (r, c)));
        Self::new(rows, cols, cells, pieces)
    }

    /// The shape of `piece` scaled up by three: each cell becomes a 3x3 block.
    ///
    /// The region has area 45 and needs nine pentominoes.
    pub fn triplicated(piece: Piece, pieces: Vec<Piece>) -> Result<Self, ProblemError> {
        let (rows, cols, cells) = triplicate_cells(piece);
        Self::new(rows, cols, cells, pieces)
    }

    /// The same board with a different piece order.
    pub fn with_pieces(&self, pieces: Vec<Piece>) -> Result<Self, ProblemError> {
        Self::new(self.rows, self.cols, self.mask.iter().copied(), pieces)
    }
}

/// Returns `(rows, cols, cells)` for `piece` scaled by three.
pub fn triplicate_cells(piece: Piece) -> (i32, i32, Vec<Coord>) {
    let base = piece.cells();
    let rows = base.iter().map(|&(r, _)| r).max().unwrap_or(0) + 1;
    let cols = base.iter().map(|&(_, c)| c).max().unwrap_or(0) + 1;

    let mut cells = Vec::with_capacity(base.len() * 9);
    for &(r, c) in base {
        for dr in 0..3 {
            for dc in 0..3 {
                cells.push((r * 3 + dr, c * 3 + dc));
            }
        }
    }

    (rows * 3, cols * 3, cells)
}
