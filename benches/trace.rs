//! Benchmarks for the pentomino search tracer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pentotrace::geometry::OrientationTable;
use pentotrace::grid::Board;
use pentotrace::layout::{compute_layout, LayoutParams};
use pentotrace::pieces::{Piece, Problem, PIECES};
use pentotrace::pruning::feasible;
use pentotrace::trace::{build_trace, TraceOptions};

fn rect_6x10() -> Problem {
    Problem::rectangle(6, 10, PIECES.to_vec()).unwrap()
}

fn chain_options() -> TraceOptions {
    TraceOptions {
        max_display_depth: 1,
        rightmost_branch_depth: Some(12),
        ..TraceOptions::default()
    }
}

/// Benchmark building the orientation table for all twelve pieces.
fn bench_orientations(c: &mut Criterion) {
    c.bench_function("orientation_table", |b| b.iter(OrientationTable::new));
}

/// Benchmark the region-size oracle on a board with one piece placed.
fn bench_feasible(c: &mut Criterion) {
    let problem = rect_6x10();
    let mut board = Board::new(&problem);
    board.apply(Piece::X, &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)]);

    c.bench_function("feasible_6x10", |b| b.iter(|| feasible(black_box(&board))));
}

/// Benchmark the pruned 6x10 trace down to its first solution.
fn bench_pruned_trace(c: &mut Criterion) {
    let problem = rect_6x10();
    let options = chain_options();

    let mut group = c.benchmark_group("trace");
    group.sample_size(10);
    group.bench_function("pruned_6x10", |b| {
        b.iter(|| build_trace(black_box(&problem), true, &options))
    });
    group.finish();
}

/// Benchmark laying out a finished trace.
fn bench_layout(c: &mut Criterion) {
    let trace = build_trace(&rect_6x10(), true, &chain_options());
    let params = LayoutParams {
        chain_depth: 12.0,
        ..LayoutParams::default()
    };

    c.bench_function("compute_layout", |b| {
        b.iter(|| compute_layout(black_box(&trace.nodes), &params))
    });
}

criterion_group!(
    benches,
    bench_orientations,
    bench_feasible,
    bench_pruned_trace,
    bench_layout
);
criterion_main!(benches);
