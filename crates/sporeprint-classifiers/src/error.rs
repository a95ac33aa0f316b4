use thiserror::Error;

/// Errors raised while loading data, fitting models or evaluating them.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed dataset: {0}")]
    MalformedData(String),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("target column '{column}' holds unknown class '{value}' at row {row}")]
    UnknownClass {
        column: String,
        value: String,
        row: usize,
    },

    #[error("cannot split dataset: {0}")]
    Split(String),

    #[error("{model} failed to fit: {reason}")]
    Fit { model: String, reason: String },

    #[error("{0} has not been fitted")]
    NotFitted(String),

    #[error("{0} requires a non-empty input")]
    EmptyInput(&'static str),

    #[error("scores and labels must have equal length ({scores} vs {labels})")]
    LengthMismatch { scores: usize, labels: usize },

    #[error("metric computation failed: {0}")]
    Metric(#[from] linfa::Error),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
