//! sqlbank - a validated in-memory bank of SQL practice problems
//!
//! This library provides:
//! - the record model (problem records, schemas, column types, sample values)
//! - bank-level validation
//! - an insertion-ordered store with lookup
//! - loaders for JSON manifests and markdown problem files

pub mod bank;
pub mod error;
pub mod loader;
pub mod model;

pub use bank::{validate, Store, Violation};
pub use error::{Error, Result};
pub use model::{ProblemRecord, ProblemRecordBuilder};
