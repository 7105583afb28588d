//! Instrumented depth-first search that records a display tree.
//!
//! The search fills the first empty cell with every legal placement, in a
//! fixed order, so it is deterministic and replays exactly. Only a bounded
//! subset of the search tree is materialized as [`TraceNode`]s:
//! - nodes below the display depth cap are never expanded
//! - wide levels show the first two candidates plus the solution chain
//! - nodes on the solution chain expand only their chain child
//!
//! The enter/exit event stream brackets materialized nodes in call order.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::OrientationTable;
use crate::grid::{Board, BoardMap, Placement};
use crate::pieces::Problem;
use crate::pruning::feasible;

/// Dense index into [`TraceResult::nodes`].
pub type NodeId = usize;

/// The root node is always the first node created.
pub const ROOT: NodeId = 0;

pub const DEFAULT_DISPLAY_DEPTH: usize = 3;
pub const DEFAULT_DISPLAY_CHILDREN: usize = 3;
pub const DEFAULT_MAX_NODES: u64 = 1_500_000;

/// Display shaping and budget for [`build_trace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceOptions {
    /// Nodes off the solution chain are expanded only above this depth.
    pub max_display_depth: usize,
    /// Levels with more candidates than this show only the first two plus the chain.
    pub max_display_children: usize,
    /// Hard cap on search visits; exceeding it aborts the whole search.
    pub max_nodes: u64,
    /// Depth cap for nodes on the solution chain. Defaults to `max_display_depth`.
    pub rightmost_branch_depth: Option<usize>,
    /// Keep exploring siblings after a solution below a node off the chain.
    pub continue_siblings_after_solution: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            max_display_depth: DEFAULT_DISPLAY_DEPTH,
            max_display_children: DEFAULT_DISPLAY_CHILDREN,
            max_nodes: DEFAULT_MAX_NODES,
            rightmost_branch_depth: None,
            continue_siblings_after_solution: false,
        }
    }
}

impl TraceOptions {
    #[inline]
    pub fn chain_depth(&self) -> usize {
        self.rightmost_branch_depth.unwrap_or(self.max_display_depth)
    }
}

/// How a search (or subtree) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Solved,
    Exhausted,
    Aborted,
}

/// One materialized search state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// Board assignment on entry.
    #[serde(with = "board_entries")]
    pub board: BoardMap,
    /// Rejected by the pruning oracle; always a leaf.
    pub pruned: bool,
    /// Grafted from an unpruned twin trace.
    pub counterfactual: bool,
    /// On the path to the first solution.
    pub rightmost_chain: bool,
    pub step_at_enter: u64,
    pub elapsed_ms_at_enter: f64,
    pub children: Vec<NodeId>,
    /// Time spent in this node's subtree, stamped on exit.
    pub elapsed_ms: Option<f64>,
    /// Materialized nodes below this one.
    pub explored_subnodes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceEvent {
    pub kind: EventKind,
    pub node: NodeId,
}

impl TraceEvent {
    pub const fn enter(node: NodeId) -> Self {
        Self {
            kind: EventKind::Enter,
            node,
        }
    }

    pub const fn exit(node: NodeId) -> Self {
        Self {
            kind: EventKind::Exit,
            node,
        }
    }
}

/// A finished trace: node arena, event stream and counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    pub nodes: Vec<TraceNode>,
    pub events: Vec<TraceEvent>,
    pub outcome: Outcome,
    /// Search visits, materialized or not.
    pub total_steps: u64,
    pub total_elapsed_ms: f64,
    /// Elapsed time at each visit, after a leading zero.
    pub step_elapsed_ms: Vec<f64>,
}

impl TraceResult {
    #[inline]
    pub fn node(&self, id: NodeId) -> &TraceNode {
        &self.nodes[id]
    }

    pub fn root(&self) -> Option<&TraceNode> {
        self.nodes.first()
    }

    /// The root's child on the solution chain, if any.
    pub fn chain_child(&self) -> Option<NodeId> {
        self.root()?
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].rightmost_chain)
    }

    /// Node ids along the solution chain, root excluded.
    pub fn chain(&self) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.chain_child();
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes[id]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].rightmost_chain);
        }
        chain
    }
}

/// A candidate placement at the current anchor.
struct Attempt {
    placement: Placement,
    /// False if the pruning oracle rejected it.
    valid: bool,
}

/// Runs the instrumented search for `problem`.
///
/// With `enable_pruning`, candidates that leave an unfillable region are
/// marked pruned and never recursed into.
pub fn build_trace(problem: &Problem, enable_pruning: bool, options: &TraceOptions) -> TraceResult {
    let mut tracer = Tracer::new(problem, enable_pruning, *options);
    let root = tracer.create_node(None, 0, false, false);
    let (outcome, _) = tracer.visit(0, root);

    let result = TraceResult {
        nodes: tracer.nodes,
        events: tracer.events,
        outcome,
        total_steps: tracer.steps,
        total_elapsed_ms: elapsed_ms(tracer.start),
        step_elapsed_ms: tracer.step_elapsed_ms,
    };

    if outcome == Outcome::Aborted {
        warn!(
            max_nodes = options.max_nodes,
            nodes = result.nodes.len(),
            "trace aborted on node budget"
        );
    }
    info!(
        pruning = enable_pruning,
        ?outcome,
        steps = result.total_steps,
        nodes = result.nodes.len(),
        events = result.events.len(),
        elapsed_ms = result.total_elapsed_ms,
        "trace built"
    );

    result
}

#[inline]
fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

struct Tracer<'a> {
    problem: &'a Problem,
    orientations: OrientationTable,
    board: Board,
    enable_pruning: bool,
    options: TraceOptions,
    nodes: Vec<TraceNode>,
    events: Vec<TraceEvent>,
    steps: u64,
    start: Instant,
    step_elapsed_ms: Vec<f64>,
}

impl<'a> Tracer<'a> {
    fn new(problem: &'a Problem, enable_pruning: bool, options: TraceOptions) -> Self {
        Self {
            problem,
            orientations: OrientationTable::new(),
            board: Board::new(problem),
            enable_pruning,
            options,
            nodes: Vec::new(),
            events: Vec::new(),
            steps: 0,
            start: Instant::now(),
            step_elapsed_ms: vec![0.0],
        }
    }

    /// Materializes a node for the current board and opens its bracket.
    fn create_node(
        &mut self,
        parent: Option<NodeId>,
        depth: usize,
        pruned: bool,
        rightmost_chain: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TraceNode {
            id,
            parent,
            depth,
            board: self.board.assignment().clone(),
            pruned,
            counterfactual: false,
            rightmost_chain,
            step_at_enter: self.steps,
            elapsed_ms_at_enter: elapsed_ms(self.start),
            children: Vec::new(),
            elapsed_ms: None,
            explored_subnodes: 0,
        });
        self.events.push(TraceEvent::enter(id));
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    /// Stamps a node's totals and closes its bracket.
    fn close_node(&mut self, id: NodeId, step_start: Instant, subtree_nodes: usize) {
        let node = &mut self.nodes[id];
        node.elapsed_ms = Some(elapsed_ms(step_start));
        node.explored_subnodes = subtree_nodes.saturating_sub(1);
        self.events.push(TraceEvent::exit(id));
    }

    /// Visits the state under `node`; returns the outcome and the number of
    /// materialized nodes in its subtree, itself included.
    fn visit(&mut self, depth: usize, node: NodeId) -> (Outcome, usize) {
        self.steps += 1;
        self.step_elapsed_ms.push(elapsed_ms(self.start));
        let step_start = Instant::now();

        if self.steps > self.options.max_nodes {
            self.close_node(node, step_start, 1);
            return (Outcome::Aborted, 1);
        }

        let mut subtree_nodes = 1;
        let Some(anchor) = self.board.first_empty() else {
            self.close_node(node, step_start, subtree_nodes);
            return (Outcome::Solved, subtree_nodes);
        };

        let attempts = self.classify(anchor);
        let (selected, chain_index) = self.select_children(depth, node, &attempts);

        let node_on_chain = self.nodes[node].rightmost_chain;
        // only the root and chain nodes can extend the chain
        let chain_eligible = depth == 0 || node_on_chain;
        let mut found_solution = false;

        for index in selected {
            let Attempt { placement, valid } = &attempts[index];
            let on_chain = chain_eligible && chain_index == Some(index);

            self.board.apply(placement.piece, &placement.cells);

            if !valid {
                let leaf = self.create_node(Some(node), depth + 1, true, on_chain);
                self.events.push(TraceEvent::exit(leaf));
                self.board.unapply(placement.piece, &placement.cells);
                subtree_nodes += 1;
                continue;
            }

            let child = self.create_node(Some(node), depth + 1, false, on_chain);
            let (outcome, child_nodes) = self.visit(depth + 1, child);
            subtree_nodes += child_nodes;
            self.board.unapply(placement.piece, &placement.cells);

            match outcome {
                Outcome::Aborted => {
                    self.close_node(node, step_start, subtree_nodes);
                    return (Outcome::Aborted, subtree_nodes);
                }
                Outcome::Solved
                    if node_on_chain || !self.options.continue_siblings_after_solution =>
                {
                    self.close_node(node, step_start, subtree_nodes);
                    return (Outcome::Solved, subtree_nodes);
                }
                Outcome::Solved => found_solution = true,
                Outcome::Exhausted => {}
            }
        }

        self.close_node(node, step_start, subtree_nodes);
        let outcome = if found_solution {
            Outcome::Solved
        } else {
            Outcome::Exhausted
        };
        (outcome, subtree_nodes)
    }

    /// Enumerates placements at `anchor` and runs the oracle on each.
    ///
    /// Leaves the board as it found it.
    fn classify(&mut self, anchor: (i32, i32)) -> Vec<Attempt> {
        let placements =
            self.board
                .placements_at(anchor, &self.problem.pieces, &self.orientations);

        placements
            .into_iter()
            .map(|placement| {
                let valid = if self.enable_pruning {
                    self.board.apply(placement.piece, &placement.cells);
                    let passes = feasible(&self.board);
                    self.board.unapply(placement.piece, &placement.cells);
                    passes
                } else {
                    true
                };
                Attempt { placement, valid }
            })
            .collect()
    }

    /// Picks which attempts to materialize, in order, and the chain candidate.
    fn select_children(
        &mut self,
        depth: usize,
        node: NodeId,
        attempts: &[Attempt],
    ) -> (Vec<usize>, Option<usize>) {
        if attempts.is_empty() {
            return (Vec::new(), None);
        }

        let node_on_chain = self.nodes[node].rightmost_chain;
        let depth_cap = if node_on_chain {
            self.options.chain_depth()
        } else {
            self.options.max_display_depth
        };
        if depth >= depth_cap {
            return (Vec::new(), None);
        }

        let chain_index = self
            .solution_next_move()
            .and_then(|next| {
                attempts
                    .iter()
                    .position(|attempt| attempt.valid && attempt.placement == next)
            })
            .unwrap_or_else(|| {
                debug!(node, depth, "no lookahead move; falling back to last valid");
                attempts
                    .iter()
                    .rposition(|attempt| attempt.valid)
                    .unwrap_or(attempts.len() - 1)
            });

        let selected = if node_on_chain {
            vec![chain_index]
        } else if attempts.len() <= self.options.max_display_children {
            (0..attempts.len()).collect()
        } else {
            let mut picks = vec![0, 1, chain_index];
            picks.sort_unstable();
            picks.dedup();
            picks
        };

        (selected, Some(chain_index))
    }

    /// First move of the first solution reachable from the current board.
    ///
    /// Uses the same candidate order and the same oracle setting as the
    /// traced search. Gives up after `max_nodes` visits.
    fn solution_next_move(&mut self) -> Option<Placement> {
        let mut budget = self.options.max_nodes;
        let anchor = self.board.first_empty()?;
        let placements =
            self.board
                .placements_at(anchor, &self.problem.pieces, &self.orientations);

        for placement in placements {
            self.board.apply(placement.piece, &placement.cells);
            let solvable = self.passes_oracle() && self.solvable(&mut budget);
            self.board.unapply(placement.piece, &placement.cells);
            if solvable {
                return Some(placement);
            }
        }
        None
    }

    /// Plain backtracking: can the current board be completed?
    fn solvable(&mut self, budget: &mut u64) -> bool {
        if *budget == 0 {
            return false;
        }
        *budget -= 1;

        let Some(anchor) = self.board.first_empty() else {
            return true;
        };
        let placements =
            self.board
                .placements_at(anchor, &self.problem.pieces, &self.orientations);

        for placement in placements {
            self.board.apply(placement.piece, &placement.cells);
            let solved = self.passes_oracle() && self.solvable(budget);
            self.board.unapply(placement.piece, &placement.cells);
            if solved {
                return true;
            }
        }
        false
    }

    #[inline]
    fn passes_oracle(&self) -> bool {
        !self.enable_pruning || feasible(&self.board)
    }
}

/// Serializes a [`BoardMap`] as a list of `[[row, col], piece]` entries.
mod board_entries {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::grid::BoardMap;
    use crate::pieces::{Coord, Piece};

    pub fn serialize<S: Serializer>(board: &BoardMap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(board.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BoardMap, D::Error> {
        let entries = Vec::<(Coord, Piece)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
