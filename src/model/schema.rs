//! Schema definitions for problem records
//!
//! This module defines the declared input tables, the expected output shape
//! and sample rows of a problem.

use super::types::ColumnType;
use super::value::Value;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Column of a declared input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputColumn {
    /// Table the column belongs to
    pub table: String,
    /// Column name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl InputColumn {
    pub fn new(table: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            column_type,
        }
    }
}

/// Column of the expected result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Column name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl OutputColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Input schema - ordered (table, column, type) declarations of a problem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<InputColumn>", into = "Vec<InputColumn>")]
pub struct InputSchema {
    /// Ordered list of columns
    columns: Vec<InputColumn>,
    /// (table, column) to index mapping
    name_to_index: HashMap<(String, String), usize>,
}

impl InputSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// Create a schema from a list of columns
    pub fn from_columns(columns: Vec<InputColumn>) -> Self {
        let mut schema = Self::new();
        for col in columns {
            schema.add_column(col);
        }
        schema
    }

    /// Add a column to the schema. A repeated (table, column) pair keeps
    /// its first position for lookups.
    pub fn add_column(&mut self, column: InputColumn) {
        self.name_to_index
            .entry((column.table.clone(), column.name.clone()))
            .or_insert(self.columns.len());
        self.columns.push(column);
    }

    /// Get a column by table and column name
    pub fn get_column(&self, table: &str, name: &str) -> Option<&InputColumn> {
        self.name_to_index
            .get(&(table.to_string(), name.to_string()))
            .map(|&idx| &self.columns[idx])
    }

    /// Check if a (table, column) pair is declared
    pub fn has_column(&self, table: &str, name: &str) -> bool {
        self.get_column(table, name).is_some()
    }

    /// Get all columns
    pub fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    /// Columns of one table, in declaration order
    pub fn columns_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a InputColumn> + 'a {
        self.columns.iter().filter(move |c| c.table == table)
    }

    /// Distinct table names in declaration order
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for col in &self.columns {
            if !tables.contains(&col.table.as_str()) {
                tables.push(&col.table);
            }
        }
        tables
    }

    /// Check if a table is declared
    pub fn has_table(&self, table: &str) -> bool {
        self.columns.iter().any(|c| c.table == table)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::new()
    }
}

// Lookup index is derived state
impl PartialEq for InputSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for InputSchema {}

impl From<Vec<InputColumn>> for InputSchema {
    fn from(columns: Vec<InputColumn>) -> Self {
        Self::from_columns(columns)
    }
}

impl From<InputSchema> for Vec<InputColumn> {
    fn from(schema: InputSchema) -> Self {
        schema.columns
    }
}

/// One row of example input data for a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRow {
    /// Table the row belongs to
    pub table: String,
    /// Cells by column name, in the order they were written. A column may
    /// appear only once; deserializing a repeated column is an error.
    #[serde(deserialize_with = "unique_cells")]
    pub values: IndexMap<String, Value>,
}

fn unique_cells<'de, D>(deserializer: D) -> Result<IndexMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CellsVisitor;

    impl<'de> Visitor<'de> for CellsVisitor {
        type Value = IndexMap<String, super::value::Value>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of column names to values")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut cells = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((column, value)) =
                map.next_entry::<String, super::value::Value>()?
            {
                if cells.contains_key(&column) {
                    return Err(de::Error::custom(format!(
                        "duplicate cell for column '{}'",
                        column
                    )));
                }
                cells.insert(column, value);
            }
            Ok(cells)
        }
    }

    deserializer.deserialize_map(CellsVisitor)
}

impl SampleRow {
    /// Create an empty row for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: IndexMap::new(),
        }
    }

    /// Add a cell, replacing any earlier value for the same column
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Column names referenced by this row
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts_schema() -> InputSchema {
        InputSchema::from_columns(vec![
            InputColumn::new("accounts", "account_id", ColumnType::Integer),
            InputColumn::new("accounts", "status", ColumnType::Varchar(10)),
            InputColumn::new("events", "account_id", ColumnType::Integer),
        ])
    }

    #[test]
    fn test_schema_lookup() {
        let schema = accounts_schema();

        assert_eq!(schema.len(), 3);
        assert!(schema.has_column("accounts", "status"));
        assert!(schema.has_column("events", "account_id"));
        assert!(!schema.has_column("events", "status"));
        assert_eq!(
            schema.get_column("accounts", "status").unwrap().column_type,
            ColumnType::Varchar(10)
        );
    }

    #[test]
    fn test_tables_in_declaration_order() {
        let schema = accounts_schema();
        assert_eq!(schema.tables(), vec!["accounts", "events"]);
        assert_eq!(schema.columns_of("accounts").count(), 2);
        assert!(schema.has_table("events"));
        assert!(!schema.has_table("users"));
    }

    #[test]
    fn test_schema_serde_as_list() {
        let schema = accounts_schema();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json[1]["type"], "VARCHAR(10)");

        let back: InputSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
        assert!(back.has_column("accounts", "account_id"));
    }

    #[test]
    fn test_sample_row_rejects_repeated_column() {
        let json = r#"{ "table": "accounts", "values": { "status": "open", "status": "closed" } }"#;
        let err = serde_json::from_str::<SampleRow>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate cell for column 'status'"));

        let json = r#"{ "table": "accounts", "values": { "account_id": 1, "status": null } }"#;
        let row: SampleRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.values["status"], Value::Null);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["account_id", "status"]);
    }

    #[test]
    fn test_sample_row_order() {
        let row = SampleRow::new("accounts")
            .with("status", "open")
            .with("account_id", 1);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["status", "account_id"]);
    }
}
