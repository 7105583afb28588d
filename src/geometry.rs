//! Planar rotation and reflection utilities.
//!
//! A square has 8 symmetries: 4 quarter turns, each with or without a
//! reflection. Pieces with symmetry of their own collapse some of these
//! into duplicates.

use crate::pieces::{Coord, Piece, PIECES};

/// A piece orientation: cells sorted row-major with minimum row and column at zero.
pub type Orientation = Vec<Coord>;

/// Applies an optional reflection followed by `turns` quarter turns.
///
/// Reflection negates the column; a quarter turn maps `(r, c)` to `(c, -r)`.
/// The result is normalized to the origin.
pub fn transform(cells: &[Coord], turns: u8, reflect: bool) -> Orientation {
    let transformed = cells
        .iter()
        .map(|&(r, c)| {
            let (mut x, mut y) = (r, if reflect { -c } else { c });
            for _ in 0..turns % 4 {
                (x, y) = (y, -x);
            }
            (x, y)
        })
        .collect();
    normalize_to_origin(transformed)
}

/// Generates all unique orientations of a piece.
///
/// Variants are produced unreflected first, then reflected, each through
/// 0..4 quarter turns; the first occurrence of each shape is kept. This
/// order is part of the search order, so it stays fixed.
pub fn orientations_of(piece: Piece) -> Vec<Orientation> {
    let mut orientations: Vec<Orientation> = Vec::with_capacity(8);
    for reflect in [false, true] {
        for turns in 0..4 {
            let variant = transform(piece.cells(), turns, reflect);
            // normalized and sorted, so equal shapes compare equal
            if !orientations.contains(&variant) {
                orientations.push(variant);
            }
        }
    }
    orientations
}

/// Translates cells so the minimum row and column are zero, then sorts them.
fn normalize_to_origin(mut cells: Vec<Coord>) -> Orientation {
    let min_row = cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
    let min_col = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);

    for (r, c) in &mut cells {
        *r -= min_row;
        *c -= min_col;
    }

    cells.sort_unstable();
    cells
}

/// Shifts every cell by `(dr, dc)`.
#[inline]
pub fn shift_cells(cells: &[Coord], dr: i32, dc: i32) -> Vec<Coord> {
    cells.iter().map(|&(r, c)| (r + dr, c + dc)).collect()
}

/// Orientations of all twelve pieces, computed once per search.
#[derive(Debug, Clone)]
pub struct OrientationTable {
    by_piece: Vec<Vec<Orientation>>,
}

impl OrientationTable {
    pub fn new() -> Self {
        Self {
            by_piece: PIECES.iter().map(|&piece| orientations_of(piece)).collect(),
        }
    }

    #[inline]
    pub fn get(&self, piece: Piece) -> &[Orientation] {
        &self.by_piece[piece.index()]
    }
}

impl Default for OrientationTable {
    fn default() -> Self {
        Self::new()
    }
}
