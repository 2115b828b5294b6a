//! Error types used throughout the billing engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Debitum
///
/// The variants follow the billing error taxonomy: validation failures are
/// surfaced before any persistence attempt, conflicts identify the record
/// that blocked the operation, and database errors preserve the underlying
/// cause as text.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Debitum operations
pub type Result<T> = std::result::Result<T, BillingError>;
