//! Piece-order search.
//!
//! The piece order decides which solution the search finds first, and with
//! it where the solution chain lands in the layout. This module hill-climbs
//! over seeded shuffles of the order to put the chain right of center.

use tracing::{debug, info};

use crate::layout::{compute_layout, LayoutParams};
use crate::pieces::{Piece, Problem};
use crate::trace::{build_trace, TraceOptions};

/// Score for a trace whose root has no chain child.
const NO_CHAIN_SCORE: f64 = -1e9;

/// 32-bit linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        f64::from(self.state) / 4_294_967_296.0
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64) as usize;
            items.swap(i, j);
        }
    }
}

/// Parameters for [`pick_order_with_right_solution_branch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSearch {
    pub attempts: usize,
    pub seed: u32,
    pub trace: TraceOptions,
    pub layout: LayoutParams,
}

impl Default for OrderSearch {
    fn default() -> Self {
        Self {
            attempts: 80,
            seed: 1,
            trace: TraceOptions {
                max_display_depth: 3,
                max_display_children: 3,
                max_nodes: 1_500_000,
                rightmost_branch_depth: Some(9),
                continue_siblings_after_solution: false,
            },
            layout: LayoutParams::default(),
        }
    }
}

/// x of the root's chain child in the pruned trace's layout.
///
/// Aborted traces still score from whatever they recorded.
pub fn score_order(problem: &Problem, search: &OrderSearch) -> f64 {
    let trace = build_trace(problem, true, &search.trace);
    let positions = compute_layout(&trace.nodes, &search.layout);
    trace
        .chain_child()
        .map_or(NO_CHAIN_SCORE, |chain_child| positions[chain_child][0])
}

/// Picks a piece order for `problem` whose solution chain leaves the root
/// to the right.
///
/// The problem's own order is the baseline to beat. Shuffled copies are then
/// scored in turn; the first with a positive score wins, else the best seen.
/// Deterministic for a fixed seed and attempt count.
pub fn pick_order_with_right_solution_branch(problem: &Problem, search: &OrderSearch) -> Vec<Piece> {
    let mut rng = Lcg::new(search.seed);
    let mut best = problem.pieces.clone();
    let mut best_score = score_order(problem, search);

    for attempt in 0..search.attempts {
        let mut candidate = problem.pieces.clone();
        rng.shuffle(&mut candidate);

        // a permutation of a valid piece list is itself valid
        let reordered = Problem {
            pieces: candidate,
            ..problem.clone()
        };
        let score = score_order(&reordered, search);
        debug!(attempt, score, "scored piece order");

        if score > best_score {
            best = reordered.pieces.clone();
            best_score = score;
        }
        if score > 0.0 {
            info!(attempt, score, "found order with chain on the right");
            return reordered.pieces;
        }
    }

    info!(best_score, "no order put the chain on the right; keeping best");
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PIECES;

    #[test]
    fn test_lcg_sequence() {
        let mut rng = Lcg::new(1);
        // 1664525 * 1 + 1013904223
        assert_eq!(rng.next_f64(), 1_015_568_748.0 / 4_294_967_296.0);
        let second = rng.next_f64();
        assert!((0.0..1.0).contains(&second));
    }

    #[test]
    fn test_shuffle_is_a_seeded_permutation() {
        let mut first = PIECES.to_vec();
        let mut second = PIECES.to_vec();
        Lcg::new(7).shuffle(&mut first);
        Lcg::new(7).shuffle(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, PIECES.to_vec());
    }

    #[test]
    fn test_shuffle_handles_tiny_slices() {
        let mut rng = Lcg::new(3);
        let mut empty: [u8; 0] = [];
        rng.shuffle(&mut empty);
        let mut one = [9];
        rng.shuffle(&mut one);
        assert_eq!(one, [9]);
    }

    #[test]
    fn test_pick_order_is_deterministic() {
        let problem = Problem::triplicated(
            Piece::Z,
            vec![
                Piece::T,
                Piece::I,
                Piece::P,
                Piece::X,
                Piece::W,
                Piece::U,
                Piece::Y,
                Piece::N,
                Piece::V,
            ],
        )
        .unwrap();
        let search = OrderSearch {
            attempts: 6,
            ..OrderSearch::default()
        };

        let first = pick_order_with_right_solution_branch(&problem, &search);
        let second = pick_order_with_right_solution_branch(&problem, &search);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        let mut base = problem.pieces.clone();
        base.sort();
        assert_eq!(sorted, base);
    }
}
