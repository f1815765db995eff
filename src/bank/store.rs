//! Problem store
//!
//! In-memory keyed collection of validated records.

use super::validator::validate;
use crate::error::{Error, Result};
use crate::model::ProblemRecord;
use indexmap::IndexMap;
use tracing::{info, warn};

/// Validated problem bank, keyed by id in insertion order
#[derive(Debug, Clone, Default)]
pub struct Store {
    records: IndexMap<String, ProblemRecord>,
}

impl Store {
    /// Create a store from records, rejecting the whole set if any
    /// violation is found
    pub fn load(records: Vec<ProblemRecord>) -> Result<Self> {
        let violations = validate(&records);
        if !violations.is_empty() {
            for violation in &violations {
                warn!(%violation, "problem bank violation");
            }
            return Err(Error::InvalidBank(violations));
        }

        let records: IndexMap<String, ProblemRecord> = records
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect();
        info!(records = records.len(), "problem bank loaded");

        Ok(Self { records })
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Result<&ProblemRecord> {
        self.records
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Iterate over all records in insertion order. Each call starts a new
    /// traversal.
    pub fn list(&self) -> Records<'_> {
        Records {
            inner: self.records.values(),
        }
    }

    /// Check if a record exists
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// All ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose title or statement contains `term`, ignoring case
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a ProblemRecord> + 'a {
        let needle = term.to_lowercase();
        self.list().filter(move |r| {
            r.title().to_lowercase().contains(&needle)
                || r.statement().to_lowercase().contains(&needle)
        })
    }

    /// Records that declare `table` as an input
    pub fn using_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ProblemRecord> + 'a {
        self.list().filter(move |r| r.input_schema().has_table(table))
    }

    /// Get record info as a formatted string
    pub fn describe(&self, id: &str) -> Result<String> {
        let record = self.get(id)?;
        let mut info = format!("Problem: {} ({})\n", record.title(), record.id());

        for table in record.tables() {
            info.push_str(&format!("Table {}:\n", table));
            for col in record.input_schema().columns_of(table) {
                info.push_str(&format!("  {} {}\n", col.name, col.column_type));
            }
        }

        info.push_str("Output:\n");
        for col in record.expected_output_schema() {
            info.push_str(&format!("  {} {}\n", col.name, col.column_type));
        }

        if !record.sample_rows().is_empty() {
            info.push_str(&format!("Sample rows: {}\n", record.sample_rows().len()));
        }
        if record.uses_cte() {
            info.push_str("Uses CTE\n");
        }

        Ok(info)
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = &'a ProblemRecord;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.list()
    }
}

/// Iterator over the records of a [`Store`]
#[derive(Debug, Clone)]
pub struct Records<'a> {
    inner: indexmap::map::Values<'a, String, ProblemRecord>,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a ProblemRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records<'_> {}

impl DoubleEndedIterator for Records<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}
