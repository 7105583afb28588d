//! Step-by-step replay of a plain backtracking search.
//!
//! Records every placement and removal, in order, until a solution is
//! found or the step cap is reached. Feeds board animations that show the
//! search one move at a time.

use serde::{Deserialize, Serialize};

use crate::geometry::OrientationTable;
use crate::grid::Board;
use crate::pieces::{Coord, Piece, Problem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOp {
    Place,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    pub op: StepOp,
    pub piece: Piece,
    pub cells: Vec<Coord>,
}

/// Runs the search on `problem` and returns at most `max_steps` events.
pub fn replay_steps(problem: &Problem, max_steps: usize) -> Vec<StepEvent> {
    let mut replay = Replay {
        problem,
        orientations: OrientationTable::new(),
        board: Board::new(problem),
        max_steps,
        events: Vec::new(),
    };
    replay.search();
    replay.events
}

struct Replay<'a> {
    problem: &'a Problem,
    orientations: OrientationTable,
    board: Board,
    max_steps: usize,
    events: Vec<StepEvent>,
}

impl Replay<'_> {
    /// Appends an event; true once the cap is reached.
    fn record(&mut self, op: StepOp, piece: Piece, cells: &[Coord]) -> bool {
        if self.events.len() >= self.max_steps {
            return true;
        }
        self.events.push(StepEvent {
            op,
            piece,
            cells: cells.to_vec(),
        });
        self.events.len() >= self.max_steps
    }

    /// True when the search should stop: solved or out of steps.
    fn search(&mut self) -> bool {
        if self.events.len() >= self.max_steps {
            return true;
        }
        let Some(anchor) = self.board.first_empty() else {
            return true;
        };

        let placements =
            self.board
                .placements_at(anchor, &self.problem.pieces, &self.orientations);
        for placement in placements {
            self.board.apply(placement.piece, &placement.cells);
            if self.record(StepOp::Place, placement.piece, &placement.cells) || self.search() {
                return true;
            }
            self.board.unapply(placement.piece, &placement.cells);
            if self.record(StepOp::Remove, placement.piece, &placement.cells) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PIECES;

    #[test]
    fn test_replay_stops_at_cap() {
        let problem = Problem::rectangle(6, 10, PIECES.to_vec()).unwrap();
        let events = replay_steps(&problem, 100);
        assert_eq!(events.len(), 100);
        assert_eq!(events[0].op, StepOp::Place);
        assert_eq!(events[0].piece, Piece::F);
    }

    #[test]
    fn test_replay_places_and_removes_in_pairs() {
        let problem = Problem::rectangle(6, 10, PIECES.to_vec()).unwrap();
        let events = replay_steps(&problem, 500);

        let mut placed: Vec<&StepEvent> = Vec::new();
        for event in &events {
            match event.op {
                StepOp::Place => placed.push(event),
                StepOp::Remove => {
                    let last = placed.pop().expect("remove without place");
                    assert_eq!(last.piece, event.piece);
                    assert_eq!(last.cells, event.cells);
                }
            }
        }
    }

    #[test]
    fn test_replay_ends_on_solution() {
        let problem = Problem::rectangle(1, 5, vec![Piece::I]).unwrap();
        let events = replay_steps(&problem, 100);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].op, StepOp::Place);
    }
}
