use std::path::PathBuf;
use thiserror::Error;

/// Failures that prevent a listing or lookup from producing any result.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Tracking directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Tracking directory {path} is not readable: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Experiment '{0}' not found")]
    ExperimentNotFound(String),

    #[error("Run '{run_id}' not found in experiment '{experiment_id}'")]
    RunNotFound {
        experiment_id: String,
        run_id: String,
    },

    #[error("Invalid {kind} identifier: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single artifact file could not be decoded. These never abort a page;
/// they are reported as `ArtifactStatus::Malformed`.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("unsupported artifact format '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to read table: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("expected at least {expected} columns, found {actual}")]
    TooFewColumns { expected: usize, actual: usize },

    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: value '{value}' in column '{column}' is not a number")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: empty value in column '{column}'")]
    NullValue { row: usize, column: String },

    #[error(transparent)]
    Shape(#[from] core_types::CoreError),
}
