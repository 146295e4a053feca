//! Shared validation errors for domain model constructors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected model input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty after trim.
    BlankField(&'static str),
    /// `frequency_days` must be at least one day.
    InvalidFrequencyDays(u32),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidFrequencyDays(value) => {
                write!(f, "frequency_days must be >= 1, got {value}")
            }
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn normalize_required(
    field: &'static str,
    value: String,
) -> Result<String, ModelValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}
