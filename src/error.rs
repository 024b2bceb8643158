// src/error.rs

use thiserror::Error;

/// Errors surfaced by the transformation pipeline and its boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Required columns absent from the input feed; fatal for the run.
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// No records survived cleaning.
    #[error("no records available after cleaning")]
    EmptyInput,

    /// The source answered with something that is not a JSON array of objects.
    #[error("could not decode raw rows: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
