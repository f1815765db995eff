//! Problem bank
//!
//! This module contains the bank-level validator and the record store.

pub mod store;
pub mod validator;

pub use store::{Records, Store};
pub use validator::{validate, Violation};
