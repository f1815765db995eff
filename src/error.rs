//! Error types for the problem bank
//!
//! This module defines all error types used by the record model, the store
//! and the loaders.

use crate::bank::Violation;
use thiserror::Error;

/// The main error type for the problem bank
#[derive(Error, Debug)]
pub enum Error {
    // ========== Record Errors ==========
    #[error("Record error: {0}")]
    MalformedRecord(String),

    // ========== Bank Errors ==========
    #[error("Bank error: {} violation(s) found{}", .0.len(), first_violation(.0))]
    InvalidBank(Vec<Violation>),

    #[error("Bank error: problem '{0}' not found")]
    NotFound(String),

    // ========== Loader Errors ==========
    #[error("Parse error in '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map(|v| format!(", first: {}", v))
        .unwrap_or_default()
}

/// Result type alias for problem bank operations
pub type Result<T> = std::result::Result<T, Error>;
