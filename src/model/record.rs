//! Problem records
//!
//! A [`ProblemRecord`] is one SQL problem: its statement, the tables it reads,
//! the shape of the result and the canonical query. Records are immutable
//! once built; every way of creating one goes through the same field checks.

use super::schema::{InputColumn, InputSchema, OutputColumn, SampleRow};
use super::types::ColumnType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Unchecked record fields, as supplied by an author or a loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub id: String,
    pub title: String,
    pub statement: String,
    pub input_schema: Vec<InputColumn>,
    pub expected_output_schema: Vec<OutputColumn>,
    pub sample_rows: Vec<SampleRow>,
    pub reference_query: String,
}

/// A single validated problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct ProblemRecord {
    id: String,
    title: String,
    statement: String,
    input_schema: InputSchema,
    expected_output_schema: Vec<OutputColumn>,
    sample_rows: Vec<SampleRow>,
    reference_query: String,
}

impl TryFrom<RawRecord> for ProblemRecord {
    type Error = Error;

    fn try_from(raw: RawRecord) -> Result<Self> {
        if raw.id.trim().is_empty() {
            return Err(Error::MalformedRecord("record has no id".to_string()));
        }
        if raw.reference_query.trim().is_empty() {
            return Err(Error::MalformedRecord(format!(
                "record '{}' has no reference query",
                raw.id
            )));
        }
        if raw.expected_output_schema.is_empty() {
            return Err(Error::MalformedRecord(format!(
                "record '{}' has no expected output schema",
                raw.id
            )));
        }

        let title = if raw.title.trim().is_empty() {
            raw.id.clone()
        } else {
            raw.title
        };

        Ok(Self {
            id: raw.id,
            title,
            statement: raw.statement,
            input_schema: InputSchema::from_columns(raw.input_schema),
            expected_output_schema: raw.expected_output_schema,
            sample_rows: raw.sample_rows,
            reference_query: raw.reference_query,
        })
    }
}

impl ProblemRecord {
    /// Build a record from raw fields
    pub fn from_raw(raw: RawRecord) -> Result<Self> {
        Self::try_from(raw)
    }

    /// Unique id of the problem
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Problem description
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Declared input tables
    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    /// Columns of the expected result
    pub fn expected_output_schema(&self) -> &[OutputColumn] {
        &self.expected_output_schema
    }

    /// Example input rows, possibly empty
    pub fn sample_rows(&self) -> &[SampleRow] {
        &self.sample_rows
    }

    /// The canonical query, verbatim
    pub fn reference_query(&self) -> &str {
        &self.reference_query
    }

    /// Distinct input tables in declaration order
    pub fn tables(&self) -> Vec<&str> {
        self.input_schema.tables()
    }

    /// Whether the reference query opens with a WITH clause
    pub fn uses_cte(&self) -> bool {
        let query = strip_leading_comments(&self.reference_query);
        let keyword: String = query
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        keyword.eq_ignore_ascii_case("with")
    }

    /// Convert back into raw fields
    pub fn into_raw(self) -> RawRecord {
        RawRecord {
            id: self.id,
            title: self.title,
            statement: self.statement,
            input_schema: self.input_schema.into(),
            expected_output_schema: self.expected_output_schema,
            sample_rows: self.sample_rows,
            reference_query: self.reference_query,
        }
    }
}

/// Skip whitespace and `--` line comments at the start of a query
fn strip_leading_comments(mut query: &str) -> &str {
    loop {
        query = query.trim_start();
        match query.strip_prefix("--") {
            Some(rest) => query = rest.split_once('\n').map_or("", |(_, tail)| tail),
            None => return query,
        }
    }
}

/// Derive a record id from a title: lower-case ASCII alphanumerics with
/// every other run of characters collapsed into a single `_`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Builder for creating records with a fluent API
#[derive(Debug, Clone, Default)]
pub struct ProblemRecordBuilder {
    raw: RawRecord,
}

impl ProblemRecordBuilder {
    /// Start building a record with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            raw: RawRecord {
                id: id.into(),
                ..RawRecord::default()
            },
        }
    }

    /// Start building a record whose id is derived from its title
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        Self::new(slugify(&title)).title(title)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.raw.title = title.into();
        self
    }

    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.raw.statement = statement.into();
        self
    }

    /// Declare a column of an input table
    pub fn input_column(
        mut self,
        table: impl Into<String>,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        self.raw
            .input_schema
            .push(InputColumn::new(table, name, column_type));
        self
    }

    /// Declare a column of the expected result
    pub fn output_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.raw
            .expected_output_schema
            .push(OutputColumn::new(name, column_type));
        self
    }

    pub fn sample_row(mut self, row: SampleRow) -> Self {
        self.raw.sample_rows.push(row);
        self
    }

    pub fn reference_query(mut self, query: impl Into<String>) -> Self {
        self.raw.reference_query = query.into();
        self
    }

    /// Build the record, applying the construction checks
    pub fn build(self) -> Result<ProblemRecord> {
        ProblemRecord::try_from(self.raw)
    }
}
