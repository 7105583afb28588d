//! Pentomino Search-Tree Tracer Library
//!
//! Provides an instrumented backtracking solver for pentomino tilings, the
//! tree layout used to render its search, and the scenarios built on top.

pub mod augment;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod ordering;
pub mod persistence;
pub mod pieces;
pub mod pruning;
pub mod replay;
pub mod sampler;
pub mod scenarios;
pub mod trace;

pub use augment::graft;
pub use error::{CliError, PersistenceError, ProblemError};
pub use layout::{compute_layout, LayoutParams};
pub use pieces::{Piece, Problem};
pub use trace::{build_trace, TraceOptions, TraceResult};
