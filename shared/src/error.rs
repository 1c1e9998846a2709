use thiserror::Error;

/// Errors raised while parsing request-scoped model values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid application id: {0}")]
    InvalidApplicationId(String),
    #[error("unknown vaccine type: {0}")]
    UnknownVaccineType(String),
    #[error("unknown meal type: {0}")]
    UnknownMealType(String),
}
