//! Record model
//!
//! This module contains the problem record, its schemas, column types and
//! sample values.

pub mod record;
pub mod schema;
pub mod types;
pub mod value;

pub use record::{slugify, ProblemRecord, ProblemRecordBuilder, RawRecord};
pub use schema::{InputColumn, InputSchema, OutputColumn, SampleRow};
pub use types::ColumnType;
pub use value::Value;
