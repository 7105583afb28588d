//! Property-based invariant tests for the board, orientations and traces.
//!
//! 1. Every orientation is five distinct, sorted cells anchored at the origin.
//! 2. Orientation sets are closed under rotation and reflection.
//! 3. Applying then removing a placement restores the board.
//! 4. Trace events bracket the node table and subtree counts agree with it.
//! 5. Pruned nodes are leaves and the solution chain is a single path.
//! 6. Traces are deterministic apart from timing.
//! 7. Layout keeps siblings ordered left to right within the display width.

use pentotrace::geometry::{orientations_of, transform, OrientationTable};
use pentotrace::grid::Board;
use pentotrace::layout::{compute_layout, LayoutParams};
use pentotrace::pieces::{Piece, Problem, PIECES};
use pentotrace::trace::{build_trace, EventKind, NodeId, TraceOptions, TraceResult};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn piece_strategy() -> impl Strategy<Value = Piece> {
    prop::sample::select(PIECES.to_vec())
}

/// Small rectangles whose area fits the chosen pieces exactly.
fn problem_strategy() -> impl Strategy<Value = Problem> {
    prop::sample::select(vec![(1, 5), (5, 1), (2, 5), (5, 2), (3, 5), (5, 3), (2, 10)])
        .prop_flat_map(|(rows, cols)| {
            let count = (rows * cols / 5) as usize;
            prop::sample::subsequence(PIECES.to_vec(), count)
                .prop_shuffle()
                .prop_map(move |pieces| Problem::rectangle(rows, cols, pieces).unwrap())
        })
}

fn options_strategy() -> impl Strategy<Value = TraceOptions> {
    (1usize..=3, 2usize..=6, 1u64..=2_000, prop::option::of(1usize..=6), any::<bool>()).prop_map(
        |(depth, children, max_nodes, chain, continue_siblings)| TraceOptions {
            max_display_depth: depth,
            max_display_children: children,
            max_nodes,
            rightmost_branch_depth: chain,
            continue_siblings_after_solution: continue_siblings,
        },
    )
}

fn subtree_size(trace: &TraceResult, id: NodeId) -> usize {
    1 + trace.nodes[id]
        .children
        .iter()
        .map(|&child| subtree_size(trace, child))
        .sum::<usize>()
}

/// Node fields that do not depend on wall-clock time.
fn shape(trace: &TraceResult) -> Vec<(Option<NodeId>, usize, String, bool, bool, Vec<NodeId>, usize)> {
    trace
        .nodes
        .iter()
        .map(|n| {
            (
                n.parent,
                n.depth,
                format!("{:?}", n.board),
                n.pruned,
                n.rightmost_chain,
                n.children.clone(),
                n.explored_subnodes,
            )
        })
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Orientation cells are normalized
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn orientations_are_normalized(piece in piece_strategy()) {
        for orientation in orientations_of(piece) {
            prop_assert_eq!(orientation.len(), 5);
            prop_assert_eq!(orientation.iter().map(|c| c.0).min(), Some(0));
            prop_assert_eq!(orientation.iter().map(|c| c.1).min(), Some(0));
            prop_assert!(
                orientation.windows(2).all(|w| w[0] < w[1]),
                "cells of {} not strictly sorted: {:?}",
                piece, orientation
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Orientation sets are closed under the symmetry group
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn orientations_closed_under_transform(
        piece in piece_strategy(),
        turns in 0u8..4,
        reflect in any::<bool>(),
    ) {
        let all = orientations_of(piece);
        for orientation in &all {
            let moved = transform(orientation, turns, reflect);
            prop_assert!(all.contains(&moved), "{} orientation escaped: {:?}", piece, moved);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. apply / unapply symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn apply_then_unapply_restores_board(
        problem in problem_strategy(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..4),
    ) {
        let table = OrientationTable::new();
        let mut board = Board::new(&problem);

        // walk a few random legal moves, checking each undo on the way
        for pick in picks {
            let Some(anchor) = board.first_empty() else { break };
            let placements = board.placements_at(anchor, &problem.pieces, &table);
            if placements.is_empty() {
                break;
            }
            let placement = &placements[pick.index(placements.len())];

            let before = board.clone();
            board.apply(placement.piece, &placement.cells);
            prop_assert!(board.is_used(placement.piece));
            prop_assert!(placement.cells.iter().all(|&cell| board.is_filled(cell)));

            let mut undone = board.clone();
            undone.unapply(placement.piece, &placement.cells);
            prop_assert_eq!(&undone, &before);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Event brackets and subtree counts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn trace_events_bracket_nodes(
        problem in problem_strategy(),
        options in options_strategy(),
        pruning in any::<bool>(),
    ) {
        let trace = build_trace(&problem, pruning, &options);

        let mut stack: Vec<NodeId> = Vec::new();
        let mut entered = vec![0usize; trace.nodes.len()];
        for event in &trace.events {
            match event.kind {
                EventKind::Enter => {
                    entered[event.node] += 1;
                    prop_assert_eq!(trace.nodes[event.node].parent, stack.last().copied());
                    stack.push(event.node);
                }
                EventKind::Exit => prop_assert_eq!(stack.pop(), Some(event.node)),
            }
        }
        prop_assert!(stack.is_empty());
        prop_assert!(entered.iter().all(|&count| count == 1));

        for node in &trace.nodes {
            prop_assert_eq!(node.explored_subnodes, subtree_size(&trace, node.id) - 1);
        }
        prop_assert!(trace.total_steps <= options.max_nodes + 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Pruned leaves and the chain path
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn pruned_nodes_are_leaves_and_chain_is_a_path(
        problem in problem_strategy(),
        options in options_strategy(),
    ) {
        let trace = build_trace(&problem, true, &options);
        prop_assert!(!trace.nodes[0].pruned);
        prop_assert!(!trace.nodes[0].rightmost_chain);

        for node in &trace.nodes {
            if node.pruned {
                prop_assert!(node.children.is_empty());
            }
            let chain_children = node
                .children
                .iter()
                .filter(|&&child| trace.nodes[child].rightmost_chain)
                .count();
            prop_assert!(chain_children <= 1);
            if node.rightmost_chain {
                let parent = node.parent.expect("chain node without parent");
                prop_assert!(parent == 0 || trace.nodes[parent].rightmost_chain);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn traces_are_deterministic(
        problem in problem_strategy(),
        options in options_strategy(),
        pruning in any::<bool>(),
    ) {
        let a = build_trace(&problem, pruning, &options);
        let b = build_trace(&problem, pruning, &options);
        prop_assert_eq!(a.outcome, b.outcome);
        prop_assert_eq!(a.total_steps, b.total_steps);
        prop_assert_eq!(&a.events, &b.events);
        prop_assert_eq!(shape(&a), shape(&b));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Layout ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn layout_orders_siblings(
        problem in problem_strategy(),
        options in options_strategy(),
    ) {
        let trace = build_trace(&problem, true, &options);
        let params = LayoutParams::default();
        let positions = compute_layout(&trace.nodes, &params);
        prop_assert_eq!(positions.len(), trace.nodes.len());

        let half = params.total_width / 2.0 + 1e-9;
        for node in &trace.nodes {
            let [x, y, z] = positions[node.id];
            prop_assert!((-half..=half).contains(&x));
            prop_assert_eq!(z, 0.0);
            for pair in node.children.windows(2) {
                prop_assert!(positions[pair[0]][0] < positions[pair[1]][0]);
            }
            for &child in &node.children {
                prop_assert!(positions[child][1] < y);
            }
        }
    }
}
