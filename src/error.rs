//! Error types
//!
//! Linear solver failures are kept in their own enum so the selector can be
//! used without the rest of the crate. Everything else funnels into [`Error`].

use thiserror::Error;

use crate::linalg::SolverStats;

/// Failures of a single linear solve
#[derive(Error, Debug, Clone)]
pub enum SolveError {
    #[error("dimension mismatch: matrix is {rows}x{cols}, right-hand side has {rhs} entries")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },

    #[error("matrix is singular: no usable pivot in column {column}")]
    Singular { column: usize },

    #[error("ILU(0) factorization failed: row {row} has no diagonal entry")]
    MissingDiagonal { row: usize },

    #[error("ILU(0) factorization failed: zero pivot in row {row}")]
    ZeroPivot { row: usize },

    #[error(
        "GMRES did not converge after {} iterations (relative residual {:.3e})",
        stats.iterations,
        stats.relative_residual
    )]
    NotConverged { stats: SolverStats },

    #[error("solution contains NaN or infinite values")]
    NonFinite,
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("invalid outcrop trace at line {line}: {message}")]
    Trace { line: u64, message: String },

    #[error("{stage} solve failed: {source}")]
    Solve {
        stage: String,
        #[source]
        source: SolveError,
    },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
