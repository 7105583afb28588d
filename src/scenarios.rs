//! End-to-end pipelines: pruned and unpruned traces, grafting and layout.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::augment::graft;
use crate::error::ProblemError;
use crate::layout::{compute_layout, orient_solution_chain_to_right, LayoutParams, Position};
use crate::ordering::{pick_order_with_right_solution_branch, OrderSearch};
use crate::pieces::{Piece, Problem, PIECES};
use crate::trace::{build_trace, TraceOptions, TraceResult};

/// Pieces tried in the triplicated-Z scenario, before order search.
pub const TRIPLICATION_PIECES: [Piece; 9] = [
    Piece::T,
    Piece::I,
    Piece::P,
    Piece::X,
    Piece::W,
    Piece::U,
    Piece::Y,
    Piece::N,
    Piece::V,
];

/// Counters for one traced search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub total_steps: u64,
    pub total_elapsed_ms: f64,
    pub node_count: usize,
    pub event_count: usize,
}

impl From<&TraceResult> for TraceSummary {
    fn from(trace: &TraceResult) -> Self {
        Self {
            total_steps: trace.total_steps,
            total_elapsed_ms: trace.total_elapsed_ms,
            node_count: trace.nodes.len(),
            event_count: trace.events.len(),
        }
    }
}

/// Everything a renderer needs for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub problem: Problem,
    pub pruned: TraceSummary,
    pub unpruned: TraceSummary,
    /// Pruned trace with counterfactual subtrees grafted on.
    pub trace: TraceResult,
    /// Indexed by node id.
    pub layout: Vec<Position>,
}

/// Display settings shared by both twin traces of a scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioConfig {
    pub trace: TraceOptions,
    pub layout: LayoutParams,
    /// Mirror the layout so the chain leaves the root to the right.
    pub orient_right: bool,
}

impl ScenarioConfig {
    /// The 6x10 rectangle tree: long chain, siblings kept after solutions.
    pub fn rect_6x10(max_nodes: u64) -> Self {
        Self {
            trace: TraceOptions {
                max_display_depth: 3,
                max_display_children: 3,
                max_nodes,
                rightmost_branch_depth: Some(12),
                continue_siblings_after_solution: true,
            },
            layout: LayoutParams {
                chain_depth: 12.0,
                ..LayoutParams::default()
            },
            orient_right: false,
        }
    }

    /// The triplicated-piece tree: nine-piece chain, single solution path.
    pub fn triplication(max_nodes: u64) -> Self {
        Self {
            trace: TraceOptions {
                max_display_depth: 3,
                max_display_children: 3,
                max_nodes,
                rightmost_branch_depth: Some(9),
                continue_siblings_after_solution: false,
            },
            layout: LayoutParams {
                chain_depth: 9.0,
                ..LayoutParams::default()
            },
            orient_right: true,
        }
    }
}

/// Traces `problem` with and without pruning, grafts the unpruned subtrees
/// onto the pruned leaves, and lays the result out.
///
/// The two searches run one after the other, each on its own board.
pub fn run_scenario(problem: Problem, config: &ScenarioConfig) -> ScenarioReport {
    let pruned = build_trace(&problem, true, &config.trace);
    let unpruned = build_trace(&problem, false, &config.trace);

    let trace = graft(
        &pruned,
        &unpruned,
        config.trace.max_display_depth,
        config.trace.max_display_children,
    );
    let mut layout = compute_layout(&trace.nodes, &config.layout);
    if config.orient_right {
        layout = orient_solution_chain_to_right(&trace, layout);
    }
    debug!(nodes = trace.nodes.len(), "scenario laid out");

    ScenarioReport {
        pruned: TraceSummary::from(&pruned),
        unpruned: TraceSummary::from(&unpruned),
        problem,
        trace,
        layout,
    }
}

/// Twelve pentominoes in a 6x10 rectangle.
pub fn run_rect_6x10(max_nodes: u64) -> Result<ScenarioReport, ProblemError> {
    let problem = Problem::rectangle(6, 10, PIECES.to_vec())?;
    Ok(run_scenario(problem, &ScenarioConfig::rect_6x10(max_nodes)))
}

/// `piece` scaled by three, tiled by `pieces` in an order chosen so the
/// solution chain sits on the right.
pub fn run_triplication(
    piece: Piece,
    pieces: Vec<Piece>,
    max_nodes: u64,
    order_search: &OrderSearch,
) -> Result<ScenarioReport, ProblemError> {
    let base = Problem::triplicated(piece, pieces)?;
    let order = pick_order_with_right_solution_branch(&base, order_search);
    let problem = base.with_pieces(order)?;
    Ok(run_scenario(problem, &ScenarioConfig::triplication(max_nodes)))
}
