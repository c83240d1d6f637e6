//! Error types for trace loading and metric extraction.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MobilityError {
    #[error("Trace is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Trace has {found} columns, at least {minimum_required} are required")]
    InsufficientColumns {
        found: usize,
        minimum_required: usize,
    },

    #[error("Invalid value '{value}' for column '{column}' on line {line}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Trace contains no points")]
    EmptyTrace,

    #[error("Unsupported distance type '{0}' (expected 'euclidean' or 'haversine')")]
    UnsupportedDistanceType(String),

    #[error("Unsupported metric '{0}'")]
    UnsupportedMetric(String),

    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter { name: String, value: f64 },

    #[error("Metric {metric} requires the '{input}' table")]
    MissingInput { metric: String, input: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, MobilityError>;

impl From<serde_json::Error> for MobilityError {
    fn from(e: serde_json::Error) -> Self {
        MobilityError::Serialization(e.to_string())
    }
}

/// Convert a missing metric input into a [`MobilityError::MissingInput`].
pub trait OptionExt<T> {
    fn ok_or_missing_input(self, metric: &str, input: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_input(self, metric: &str, input: &str) -> Result<T> {
        self.ok_or_else(|| MobilityError::MissingInput {
            metric: metric.to_string(),
            input: input.to_string(),
        })
    }
}
