//! Counterfactual grafting.
//!
//! A pruned trace stops at every candidate the oracle rejects. To show what
//! the pruning saved, the subtree an unpruned twin search explored from the
//! same board state is copied under each pruned leaf, flagged
//! `counterfactual`. Existing node ids and events are left untouched; the
//! copies get fresh ids after the last existing one.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::grid::board_signature;
use crate::trace::{EventKind, NodeId, TraceEvent, TraceNode, TraceResult};

/// Grafts bounded copies of unpruned subtrees onto the pruned leaves of
/// `pruned`.
///
/// A pruned leaf is matched to the first unpruned node entered with the same
/// board. Copies respect `max_display_depth` (absolute depth of the new
/// parent) and `max_display_children` (per parent, counting only the first
/// that many source children).
pub fn graft(
    pruned: &TraceResult,
    unpruned: &TraceResult,
    max_display_depth: usize,
    max_display_children: usize,
) -> TraceResult {
    let mut nodes = pruned.nodes.clone();
    let mut events = Vec::with_capacity(pruned.events.len());

    let mut first_by_signature: FxHashMap<String, NodeId> = FxHashMap::default();
    for event in &unpruned.events {
        if event.kind == EventKind::Enter {
            first_by_signature
                .entry(board_signature(&unpruned.nodes[event.node].board))
                .or_insert(event.node);
        }
    }

    let mut grafted = 0;
    for event in &pruned.events {
        events.push(*event);
        if event.kind != EventKind::Enter || !nodes[event.node].pruned {
            continue;
        }
        let signature = board_signature(&nodes[event.node].board);
        if let Some(&source) = first_by_signature.get(&signature) {
            grafted += clone_subtree(
                unpruned,
                source,
                event.node,
                &mut nodes,
                &mut events,
                max_display_depth,
                max_display_children,
            );
        }
    }

    debug!(
        pruned_leaves = pruned.nodes.iter().filter(|n| n.pruned).count(),
        grafted,
        "grafted counterfactual nodes"
    );

    TraceResult {
        nodes,
        events,
        outcome: pruned.outcome,
        total_steps: pruned.total_steps,
        total_elapsed_ms: pruned.total_elapsed_ms,
        step_elapsed_ms: pruned.step_elapsed_ms.clone(),
    }
}

/// Work item: copy children of `source` (in the unpruned trace) under
/// `target` (in the merged arena).
struct Frame {
    source: NodeId,
    target: NodeId,
    next_child: usize,
    /// False for the pruned leaf itself, whose exit is already in the stream.
    is_copy: bool,
}

/// Copies the subtree below `source` under `target` in pre-order, emitting
/// enter/exit events as the recursive walk would. Returns the number of
/// nodes created.
fn clone_subtree(
    unpruned: &TraceResult,
    source: NodeId,
    target: NodeId,
    nodes: &mut Vec<TraceNode>,
    events: &mut Vec<TraceEvent>,
    max_display_depth: usize,
    max_display_children: usize,
) -> usize {
    let mut created = 0;
    let mut stack = vec![Frame {
        source,
        target,
        next_child: 0,
        is_copy: false,
    }];

    while let Some(frame) = stack.last_mut() {
        let parent = &nodes[frame.target];
        let source_children = &unpruned.nodes[frame.source].children;
        let limit = source_children.len().min(max_display_children);

        if parent.depth >= max_display_depth
            || frame.next_child >= limit
            || parent.children.len() >= max_display_children
        {
            let (target, is_copy) = (frame.target, frame.is_copy);
            stack.pop();
            if is_copy {
                events.push(TraceEvent::exit(target));
            }
            continue;
        }

        let source_child = source_children[frame.next_child];
        frame.next_child += 1;
        let parent_id = frame.target;
        let depth = parent.depth + 1;

        let original = &unpruned.nodes[source_child];
        let id = nodes.len();
        nodes.push(TraceNode {
            id,
            parent: Some(parent_id),
            depth,
            board: original.board.clone(),
            pruned: false,
            counterfactual: true,
            rightmost_chain: original.rightmost_chain,
            step_at_enter: original.step_at_enter,
            elapsed_ms_at_enter: original.elapsed_ms_at_enter,
            children: Vec::new(),
            elapsed_ms: None,
            explored_subnodes: 0,
        });
        nodes[parent_id].children.push(id);
        events.push(TraceEvent::enter(id));
        created += 1;

        stack.push(Frame {
            source: source_child,
            target: id,
            next_child: 0,
            is_copy: true,
        });
    }

    created
}
