use thiserror::Error;

use crate::pieces::Piece;

/// Malformed puzzle input, rejected before any search begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("board extents must be positive (rows={rows}, cols={cols})")]
    InvalidDimensions { rows: i32, cols: i32 },

    #[error("board mask is empty")]
    EmptyMask,

    #[error("mask cell ({row}, {col}) lies outside a {rows}x{cols} board")]
    CellOutsideBoard {
        row: i32,
        col: i32,
        rows: i32,
        cols: i32,
    },

    #[error("piece list is empty")]
    NoPieces,

    #[error("unknown piece name: {name:?}")]
    UnknownPiece { name: String },

    #[error("piece {piece} appears more than once")]
    DuplicatePiece { piece: Piece },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure of a command-line run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error("failed to write report to {path}: {source}")]
    Save {
        path: String,
        source: PersistenceError,
    },

    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        source: PersistenceError,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
