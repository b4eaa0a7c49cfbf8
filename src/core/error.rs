//! Error types for the projection engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the engine and its input boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is absent, or a required cell is empty.
    #[error("{}", missing_field_message(.field, .row))]
    MissingField { field: String, row: Option<usize> },

    /// A ratio was requested over a zero denominator.
    #[error("Division by zero: {context}")]
    DivisionByZero { context: String },

    /// Unrecognised projection or allocation policy name.
    #[error("Invalid policy '{name}', expected one of: {expected}")]
    InvalidPolicy { name: String, expected: String },

    #[error("Projection horizon must be at least one month")]
    NonPositiveHorizon,

    #[error("Projection horizon of {months} months exceeds the maximum of {max}")]
    HorizonTooLong { months: u32, max: u32 },

    /// A value is present but unusable (negative, non-finite or unparsable).
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn missing_field_message(field: &str, row: &Option<usize>) -> String {
    match row {
        Some(row) => format!("Missing required field '{field}' in row {row}"),
        None => format!("Missing required column '{field}'"),
    }
}

impl Error {
    pub fn missing_column(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            row: None,
        }
    }

    pub fn missing_cell(field: impl Into<String>, row: usize) -> Self {
        Self::MissingField {
            field: field.into(),
            row: Some(row),
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
