//! Randomized solution sampling.
//!
//! Each attempt runs a depth-first search whose piece, orientation and
//! anchor-cell order is shuffled by a seeded [`Lcg`], so different seeds
//! land on different solutions. Attempt `i` uses seed `i + 1`.
//!
//! No pruning oracle runs here: every visit draws from the generator, so
//! skipping subtrees would shift the draws and change which solution a
//! seed finds.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::geometry::{shift_cells, OrientationTable};
use crate::grid::{Board, Placement};
use crate::ordering::Lcg;
use crate::pieces::{Piece, Problem};

/// Canonical text for a placement: `P:r,c|r,c|...` with sorted cells.
pub fn placement_signature(placement: &Placement) -> String {
    let mut cells = placement.cells.clone();
    cells.sort_unstable();
    let cells: Vec<String> = cells.iter().map(|(r, c)| format!("{r},{c}")).collect();
    format!("{}:{}", placement.piece, cells.join("|"))
}

/// Order-independent text for a full solution.
pub fn solution_signature(solution: &[Placement]) -> String {
    let mut parts: Vec<String> = solution.iter().map(placement_signature).collect();
    parts.sort_unstable();
    parts.join("||")
}

/// Collects up to `count` distinct solutions from at most `max_attempts`
/// seeded searches, each limited to `max_nodes` visits.
pub fn find_unique_solutions(
    problem: &Problem,
    count: usize,
    max_attempts: u32,
    max_nodes: u64,
) -> Vec<Vec<Placement>> {
    let orientations = OrientationTable::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut unique = Vec::new();

    for attempt in 0..max_attempts {
        if unique.len() >= count {
            break;
        }
        let mut sampler = RandomSolver {
            problem,
            orientations: &orientations,
            board: Board::new(problem),
            rng: Lcg::new(attempt + 1),
            budget: max_nodes,
        };
        let Some(solution) = sampler.solve() else {
            debug!(attempt, "sampling attempt found no solution");
            continue;
        };
        if seen.insert(solution_signature(&solution)) {
            unique.push(solution);
        }
    }

    unique
}

struct RandomSolver<'a> {
    problem: &'a Problem,
    orientations: &'a OrientationTable,
    board: Board,
    rng: Lcg,
    budget: u64,
}

impl RandomSolver<'_> {
    /// Placements of the first solution found, in placement order.
    fn solve(&mut self) -> Option<Vec<Placement>> {
        let mut path = Vec::new();
        self.extend(&mut path).then_some(path)
    }

    fn extend(&mut self, path: &mut Vec<Placement>) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;

        let Some((anchor_row, anchor_col)) = self.board.first_empty() else {
            return true;
        };

        let mut pieces: Vec<Piece> = self
            .problem
            .pieces
            .iter()
            .copied()
            .filter(|&piece| !self.board.is_used(piece))
            .collect();
        self.rng.shuffle(&mut pieces);

        for piece in pieces {
            let mut orientations = self.orientations.get(piece).to_vec();
            self.rng.shuffle(&mut orientations);

            for orientation in orientations {
                let mut anchors = orientation.clone();
                self.rng.shuffle(&mut anchors);

                for (cell_row, cell_col) in anchors {
                    let cells =
                        shift_cells(&orientation, anchor_row - cell_row, anchor_col - cell_col);
                    if !self.board.can_place(&cells) {
                        continue;
                    }

                    self.board.apply(piece, &cells);
                    path.push(Placement {
                        piece,
                        cells: cells.clone(),
                    });
                    if self.extend(path) {
                        return true;
                    }
                    path.pop();
                    self.board.unapply(piece, &cells);
                }
            }
        }

        false
    }
}
