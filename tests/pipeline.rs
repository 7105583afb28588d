//! End-to-end runs of the twin-trace pipeline on the shipped scenarios.

use pentotrace::error::ProblemError;
use pentotrace::grid::board_signature;
use pentotrace::ordering::{pick_order_with_right_solution_branch, OrderSearch};
use pentotrace::pieces::{Piece, Problem, PIECES};
use pentotrace::scenarios::{run_rect_6x10, ScenarioReport, TRIPLICATION_PIECES};
use pentotrace::trace::{build_trace, EventKind, Outcome, TraceOptions, DEFAULT_MAX_NODES};

fn assert_well_formed(report: &ScenarioReport) {
    let trace = &report.trace;
    let mut stack = Vec::new();
    for event in &trace.events {
        match event.kind {
            EventKind::Enter => {
                assert_eq!(trace.nodes[event.node].parent, stack.last().copied());
                stack.push(event.node);
            }
            EventKind::Exit => assert_eq!(stack.pop(), Some(event.node)),
        }
    }
    assert!(stack.is_empty());
    assert_eq!(trace.events.len(), 2 * trace.nodes.len());
    assert_eq!(report.layout.len(), trace.nodes.len());
}

#[test]
fn test_rect_6x10_reaches_a_full_tiling() {
    let report = run_rect_6x10(DEFAULT_MAX_NODES).unwrap();
    assert_well_formed(&report);

    let trace = &report.trace;
    assert_eq!(trace.outcome, Outcome::Solved);
    assert!(!trace.nodes[0].pruned);

    let chain = trace.chain();
    assert_eq!(chain.len(), 12);
    let solved = &trace.nodes[*chain.last().unwrap()].board;
    assert_eq!(solved.len(), 60);
    let mut used: Vec<Piece> = solved.values().copied().collect();
    used.sort();
    used.dedup();
    assert_eq!(used, PIECES.to_vec());

    // pruning can only shrink the work the search does
    assert!(report.pruned.total_steps <= report.unpruned.total_steps);
}

#[test]
fn test_counterfactual_nodes_hang_below_pruned_leaves() {
    let report = run_rect_6x10(DEFAULT_MAX_NODES).unwrap();
    let trace = &report.trace;

    for node in trace.nodes.iter().filter(|n| n.counterfactual) {
        let parent = &trace.nodes[node.parent.unwrap()];
        assert!(parent.pruned || parent.counterfactual);
        assert_eq!(node.explored_subnodes, 0);
    }
    for node in trace.nodes.iter().filter(|n| n.pruned) {
        assert!(node.children.iter().all(|&c| trace.nodes[c].counterfactual));
    }
}

#[test]
fn test_pruning_agrees_on_the_first_solution() {
    let problem = Problem::rectangle(5, 5, PIECES.to_vec()).unwrap();
    let options = TraceOptions {
        max_display_depth: 1,
        max_nodes: 50_000,
        rightmost_branch_depth: Some(5),
        ..TraceOptions::default()
    };
    let pruned = build_trace(&problem, true, &options);
    let unpruned = build_trace(&problem, false, &options);

    let last_board = |trace: &pentotrace::TraceResult| {
        let chain = trace.chain();
        board_signature(&trace.nodes[*chain.last().unwrap()].board)
    };
    assert_eq!(pruned.outcome, Outcome::Solved);
    assert_eq!(unpruned.outcome, Outcome::Solved);
    assert_eq!(last_board(&pruned), last_board(&unpruned));
}

#[test]
fn test_triplicated_order_search_is_reproducible() {
    let problem = Problem::triplicated(Piece::Z, TRIPLICATION_PIECES.to_vec()).unwrap();
    let search = OrderSearch {
        attempts: 10,
        seed: 1,
        ..OrderSearch::default()
    };
    let order = pick_order_with_right_solution_branch(&problem, &search);
    assert_eq!(order, pick_order_with_right_solution_branch(&problem, &search));

    let trace = build_trace(&problem.with_pieces(order).unwrap(), true, &search.trace);
    assert_eq!(trace.outcome, Outcome::Solved);
    assert_eq!(trace.chain().len(), 9);
}

#[test]
fn test_malformed_problems_fail_before_search() {
    assert_eq!(
        Problem::rectangle(0, 5, vec![Piece::I]),
        Err(ProblemError::InvalidDimensions { rows: 0, cols: 5 })
    );
    assert_eq!(
        Problem::new(2, 2, Vec::<pentotrace::pieces::Coord>::new(), vec![Piece::I]),
        Err(ProblemError::EmptyMask)
    );
    assert!(matches!(
        pentotrace::pieces::parse_pieces("FIQ"),
        Err(ProblemError::UnknownPiece { .. })
    ));
}
