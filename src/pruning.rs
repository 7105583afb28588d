//! Connectivity-based feasibility check.
//!
//! Every empty region of the board must eventually be covered by whole
//! pentominoes, so a connected region whose size is not a multiple of five
//! can never be filled. The check is necessary, not sufficient: regions of
//! valid size may still be untileable.

use rustc_hash::FxHashSet;

use crate::grid::Board;
use crate::pieces::{Coord, PIECE_CELLS};

const NEIGHBOR_OFFSETS: [Coord; 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Returns false if some 4-connected empty region has a size that is not a
/// multiple of the piece size.
pub fn feasible(board: &Board) -> bool {
    let mut visited: FxHashSet<Coord> = FxHashSet::default();
    let mut stack: Vec<Coord> = Vec::new();

    for &start in board.mask() {
        if board.is_filled(start) || !visited.insert(start) {
            continue;
        }

        let mut region_size = 0;
        stack.push(start);

        while let Some((row, col)) = stack.pop() {
            region_size += 1;
            for (dr, dc) in NEIGHBOR_OFFSETS {
                let next = (row + dr, col + dc);
                if !board.is_allowed(next) || board.is_filled(next) {
                    continue;
                }
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        if region_size % PIECE_CELLS != 0 {
            return false;
        }
    }

    true
}
