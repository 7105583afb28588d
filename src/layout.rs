//! Tree layout for display.
//!
//! x comes from a tidy-tree pass: leaves take consecutive slots in
//! depth-first order and each parent sits at the mean of its children.
//! y grows downward by depth, with chain nodes taking a shorter step so the
//! solution path reads as a compressed spine through the fan of explored
//! siblings. Coordinates have no meaning beyond display.

use serde::{Deserialize, Serialize};

use crate::trace::{NodeId, TraceNode, TraceResult, ROOT};

/// Display position `[x, y, z]`; z is always zero.
pub type Position = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Horizontal extent; x is rescaled to `[-total_width / 2, total_width / 2]`.
    pub total_width: f64,
    /// y of the root.
    pub top_y: f64,
    /// Vertical step per depth level off the chain.
    pub normal_step: f64,
    /// Chain nodes step by `normal_step * chain_depth_span / chain_depth`.
    pub chain_depth: f64,
    pub chain_depth_span: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            total_width: 12.0,
            top_y: 3.0,
            normal_step: 1.8,
            chain_depth: 9.0,
            chain_depth_span: 3.0,
        }
    }
}

impl LayoutParams {
    #[inline]
    pub fn chain_step(&self) -> f64 {
        self.normal_step * self.chain_depth_span / self.chain_depth
    }
}

/// Computes a position for every node, indexed by node id.
pub fn compute_layout(nodes: &[TraceNode], params: &LayoutParams) -> Vec<Position> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut x_slots: Vec<Option<f64>> = vec![None; nodes.len()];
    let mut next_leaf = 0.0;
    assign_x(nodes, ROOT, &mut x_slots, &mut next_leaf);

    let mut y_offsets: Vec<Option<f64>> = vec![None; nodes.len()];
    y_offsets[ROOT] = Some(0.0);
    assign_y(nodes, ROOT, params, &mut y_offsets);

    let placed = x_slots.iter().flatten();
    let min_x = placed.clone().copied().fold(f64::INFINITY, f64::min);
    let max_x = placed.copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max_x - min_x).max(1.0);

    nodes
        .iter()
        .map(|node| {
            // unreachable nodes fall back to the left edge and their depth
            let slot = x_slots[node.id].unwrap_or(min_x);
            let x = ((slot - min_x) / span - 0.5) * params.total_width;
            let offset = y_offsets[node.id].unwrap_or(node.depth as f64 * params.normal_step);
            [x, params.top_y - offset, 0.0]
        })
        .collect()
}

fn assign_x(nodes: &[TraceNode], id: NodeId, x_slots: &mut [Option<f64>], next_leaf: &mut f64) -> f64 {
    let children = &nodes[id].children;
    let x = if children.is_empty() {
        let slot = *next_leaf;
        *next_leaf += 1.0;
        slot
    } else {
        let sum: f64 = children
            .iter()
            .map(|&child| assign_x(nodes, child, x_slots, next_leaf))
            .sum();
        sum / children.len() as f64
    };
    x_slots[id] = Some(x);
    x
}

fn assign_y(nodes: &[TraceNode], id: NodeId, params: &LayoutParams, y_offsets: &mut [Option<f64>]) {
    let base = y_offsets[id].unwrap_or(0.0);
    for &child in &nodes[id].children {
        let step = if nodes[child].rightmost_chain {
            params.chain_step()
        } else {
            params.normal_step
        };
        y_offsets[child] = Some(base + step);
        assign_y(nodes, child, params, y_offsets);
    }
}

/// Mirrors every x if the root's chain child sits left of center.
pub fn orient_solution_chain_to_right(trace: &TraceResult, positions: Vec<Position>) -> Vec<Position> {
    let Some(chain_child) = trace.chain_child() else {
        return positions;
    };
    match positions.get(chain_child) {
        Some(&[x, _, _]) if x < 0.0 => positions
            .into_iter()
            .map(|[x, y, z]| [-x, y, z])
            .collect(),
        _ => positions,
    }
}
