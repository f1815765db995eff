//! Bank-level validation
//!
//! `validate` checks a collection of records for the invariants that span
//! records (unique ids) or that tie sample data to the declared schema.
//! It is a single read-only pass and never fails; an empty result means
//! the collection is valid.

use crate::model::{ColumnType, ProblemRecord};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two records share an id. `first` and `duplicate` are positions in the
    /// validated collection.
    DuplicateId {
        id: String,
        first: usize,
        duplicate: usize,
    },
    /// A sample row names a column its table does not declare
    UndeclaredColumn {
        id: String,
        row: usize,
        table: String,
        column: String,
    },
    /// A sample cell holds a value the declared column type cannot store
    TypeMismatch {
        id: String,
        row: usize,
        table: String,
        column: String,
        expected: ColumnType,
        found: &'static str,
    },
    EmptyReferenceQuery {
        id: String,
    },
    EmptyOutputSchema {
        id: String,
    },
}

impl Violation {
    /// Id of the offending record
    pub fn record_id(&self) -> &str {
        match self {
            Violation::DuplicateId { id, .. }
            | Violation::UndeclaredColumn { id, .. }
            | Violation::TypeMismatch { id, .. }
            | Violation::EmptyReferenceQuery { id }
            | Violation::EmptyOutputSchema { id } => id,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateId {
                id,
                first,
                duplicate,
            } => write!(
                f,
                "duplicate id '{}' at positions {} and {}",
                id, first, duplicate
            ),
            Violation::UndeclaredColumn {
                id,
                row,
                table,
                column,
            } => write!(
                f,
                "problem '{}' sample row {} references undeclared column '{}.{}'",
                id, row, table, column
            ),
            Violation::TypeMismatch {
                id,
                row,
                table,
                column,
                expected,
                found,
            } => write!(
                f,
                "problem '{}' sample row {} stores {} in '{}.{}' declared as {}",
                id, row, found, table, column, expected
            ),
            Violation::EmptyReferenceQuery { id } => {
                write!(f, "problem '{}' has an empty reference query", id)
            }
            Violation::EmptyOutputSchema { id } => {
                write!(f, "problem '{}' has an empty expected output schema", id)
            }
        }
    }
}

/// Check a collection of records. Violations come back in record order,
/// then sample row order, then cell order.
pub fn validate(records: &[ProblemRecord]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (position, record) in records.iter().enumerate() {
        let id = record.id();

        match first_seen.get(id) {
            Some(&first) => violations.push(Violation::DuplicateId {
                id: id.to_string(),
                first,
                duplicate: position,
            }),
            None => {
                first_seen.insert(id, position);
            }
        }

        if record.reference_query().trim().is_empty() {
            violations.push(Violation::EmptyReferenceQuery { id: id.to_string() });
        }
        if record.expected_output_schema().is_empty() {
            violations.push(Violation::EmptyOutputSchema { id: id.to_string() });
        }

        check_sample_rows(record, &mut violations);
    }

    debug!(
        records = records.len(),
        violations = violations.len(),
        "validated problem records"
    );
    violations
}

fn check_sample_rows(record: &ProblemRecord, violations: &mut Vec<Violation>) {
    let schema = record.input_schema();

    for (row_idx, row) in record.sample_rows().iter().enumerate() {
        for (column, value) in &row.values {
            match schema.get_column(&row.table, column) {
                None => violations.push(Violation::UndeclaredColumn {
                    id: record.id().to_string(),
                    row: row_idx,
                    table: row.table.clone(),
                    column: column.clone(),
                }),
                Some(declared) if !value.fits(&declared.column_type) => {
                    violations.push(Violation::TypeMismatch {
                        id: record.id().to_string(),
                        row: row_idx,
                        table: row.table.clone(),
                        column: column.clone(),
                        expected: declared.column_type.clone(),
                        found: value.type_name(),
                    })
                }
                Some(_) => {}
            }
        }
    }
}
