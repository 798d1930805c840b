use crate::arena::ArenaError;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while materializing a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("{origin}: {source}")]
    Io { origin: String, source: io::Error },

    #[error("{origin}: truncated {section}, expected {expected} bytes but only {available} available")]
    TruncatedInput {
        origin: String,
        section: &'static str,
        expected: usize,
        available: usize,
    },

    #[error("{origin}: format mismatch, {detail}")]
    FormatMismatch { origin: String, detail: String },

    #[error("{origin}: header declares {found} items but only {declared} were provisioned")]
    DeclaredCountExceeded {
        origin: String,
        declared: usize,
        found: usize,
    },

    #[error("{origin}: {items} x {rows} x {cols} bytes does not fit in memory")]
    ShapeOverflow {
        origin: String,
        items: usize,
        rows: usize,
        cols: usize,
    },

    #[error(transparent)]
    Arena(#[from] ArenaError),
}
