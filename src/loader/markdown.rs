//! Markdown problem extraction
//!
//! Pulls one [`ProblemRecord`] out of a markdown problem file. The layout
//! it understands:
//!
//! ```text
//! # Closed Accounts                    <- title, id = slugify(title)
//!
//! Find the accounts that were closed.  <- statement
//!
//! Table: `accounts`                    <- input table
//! | Column Name | Type    |
//! |-------------|---------|
//! | account_id  | int     |
//!
//! ## Expected Output                   <- any ## heading containing "output"
//! | Column Name | Type |
//! |-------------|------|
//! | account_id  | int  |
//!
//! (fenced sql block)                   <- first sql or bare fence = query
//! ```
//!
//! Sample rows are not extracted.

use crate::error::{Error, Result};
use crate::model::{slugify, ColumnType, InputColumn, OutputColumn, ProblemRecord, RawRecord};
use tracing::debug;

/// Section the scanner is currently inside
#[derive(Debug, Clone, PartialEq)]
enum Section {
    /// Prose before the first structural element
    Statement,
    /// Pipe table of an input table
    Input(String),
    /// Pipe table of the expected output
    Output,
    /// Anything else; pipe tables here are ignored
    Other,
}

/// Line-oriented markdown scanner
struct Extractor<'a> {
    /// Input lines
    lines: Vec<&'a str>,
    /// Current line index
    position: usize,
    section: Section,
    /// Whether the current section's pipe table header was consumed
    header_seen: bool,
    title: Option<String>,
    statement: Vec<&'a str>,
    input: Vec<InputColumn>,
    output: Vec<OutputColumn>,
    query: Option<String>,
}

impl<'a> Extractor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            position: 0,
            section: Section::Statement,
            header_seen: false,
            title: None,
            statement: Vec::new(),
            input: Vec::new(),
            output: Vec::new(),
            query: None,
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.lines.len()
    }

    fn advance(&mut self) -> &'a str {
        let line = self.lines[self.position];
        self.position += 1;
        line
    }

    fn enter(&mut self, section: Section) {
        self.section = section;
        self.header_seen = false;
    }

    fn run(&mut self) -> Result<()> {
        while !self.is_at_end() {
            let line_no = self.position + 1;
            let line = self.advance();
            let trimmed = line.trim();

            if let Some(lang) = trimmed.strip_prefix("```") {
                self.read_fence(lang.trim());
            } else if let Some(heading) = trimmed.strip_prefix("# ") {
                if self.title.is_none() {
                    self.title = Some(heading.trim().to_string());
                } else {
                    self.enter(Section::Other);
                }
            } else if trimmed.starts_with("##") {
                let heading = trimmed.trim_start_matches('#').to_lowercase();
                if heading.contains("output") {
                    self.enter(Section::Output);
                } else {
                    self.enter(Section::Other);
                }
            } else if let Some(table) = table_label(trimmed) {
                self.enter(Section::Input(table));
            } else if trimmed.starts_with('|') {
                self.read_table_row(trimmed, line_no)?;
            } else if self.section == Section::Statement {
                self.statement.push(trimmed);
            }
        }
        Ok(())
    }

    /// Consume a fenced block; the first sql or bare block becomes the query
    fn read_fence(&mut self, lang: &str) {
        let mut body = Vec::new();
        while !self.is_at_end() {
            let line = self.advance();
            if line.trim_start().starts_with("```") {
                break;
            }
            body.push(line);
        }

        if self.section == Section::Statement {
            self.enter(Section::Other);
        }
        if self.query.is_none() && (lang.is_empty() || lang.eq_ignore_ascii_case("sql")) {
            self.query = Some(body.join("\n").trim().to_string());
        }
    }

    fn read_table_row(&mut self, line: &str, line_no: usize) -> Result<()> {
        if self.section == Section::Statement {
            self.enter(Section::Other);
        }
        if self.section == Section::Other || is_separator(line) {
            return Ok(());
        }
        if !self.header_seen {
            self.header_seen = true;
            return Ok(());
        }

        let cells = split_cells(line);
        let (name, ty) = match cells.as_slice() {
            [name, ty, ..] if !name.is_empty() => (*name, *ty),
            _ => {
                return Err(Error::MalformedRecord(format!(
                    "line {}: expected '| column | type |'",
                    line_no
                )))
            }
        };
        let column_type: ColumnType = ty
            .parse()
            .map_err(|e| Error::MalformedRecord(format!("line {}: {}", line_no, e)))?;

        match &self.section {
            Section::Input(table) => {
                self.input.push(InputColumn::new(table.clone(), name, column_type))
            }
            Section::Output => self.output.push(OutputColumn::new(name, column_type)),
            Section::Statement | Section::Other => {}
        }
        Ok(())
    }

    fn statement(&self) -> String {
        let mut text = String::new();
        let mut blank_run = false;
        for line in &self.statement {
            if line.is_empty() {
                blank_run = true;
                continue;
            }
            if !text.is_empty() {
                text.push_str(if blank_run { "\n\n" } else { "\n" });
            }
            text.push_str(line);
            blank_run = false;
        }
        text
    }
}

/// `Table: name` label, with backticks and emphasis stripped
fn table_label(line: &str) -> Option<String> {
    let (label, rest) = line.split_once(':')?;
    let label = label.trim_matches(|c| c == '*' || c == '_').trim();
    if !label.eq_ignore_ascii_case("table") {
        return None;
    }
    let name = rest
        .trim()
        .trim_matches(|c| c == '`' || c == '*' || c == '_')
        .trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn split_cells(line: &str) -> Vec<&str> {
    line.trim()
        .trim_start_matches('|')
        .trim_end_matches('|')
        .split('|')
        .map(|c| c.trim().trim_matches('`'))
        .collect()
}

fn is_separator(line: &str) -> bool {
    split_cells(line)
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

/// Extract a record from markdown. `fallback_id` is used when the text has
/// no title (or a title that slugifies to nothing).
pub fn parse_problem(text: &str, fallback_id: &str) -> Result<ProblemRecord> {
    let mut extractor = Extractor::new(text);
    extractor.run()?;

    let statement = extractor.statement();
    let title = extractor.title.take().unwrap_or_default();
    let id = match slugify(&title) {
        slug if slug.is_empty() => fallback_id.to_string(),
        slug => slug,
    };
    debug!(
        %id,
        input_columns = extractor.input.len(),
        output_columns = extractor.output.len(),
        "extracted markdown problem"
    );

    ProblemRecord::try_from(RawRecord {
        id,
        title,
        statement,
        input_schema: extractor.input,
        expected_output_schema: extractor.output,
        sample_rows: Vec::new(),
        reference_query: extractor.query.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSED_ACCOUNTS: &str = "\
# Closed Accounts

Find the ids of all accounts
that were closed.

Return the result in any order.

Table: `accounts`
| Column Name | Type        |
|-------------|-------------|
| account_id  | int         |
| status      | varchar(10) |

Table: events
| Column Name | Type |
| --- | --- |
| account_id | int |
| happened_at | datetime |

## Expected Output
| Column Name | Type |
|-------------|------|
| account_id  | int  |

## Solution

```sql
SELECT account_id
FROM accounts
WHERE status = 'closed';
```

```sql
-- alternative
SELECT 1;
```
";

    #[test]
    fn test_parse_problem() {
        let record = parse_problem(CLOSED_ACCOUNTS, "fallback").unwrap();

        assert_eq!(record.id(), "closed_accounts");
        assert_eq!(record.title(), "Closed Accounts");
        assert_eq!(
            record.statement(),
            "Find the ids of all accounts\nthat were closed.\n\nReturn the result in any order."
        );
        assert_eq!(record.tables(), vec!["accounts", "events"]);
        assert_eq!(
            record
                .input_schema()
                .get_column("accounts", "status")
                .unwrap()
                .column_type,
            ColumnType::Varchar(10)
        );
        assert_eq!(
            record
                .input_schema()
                .get_column("events", "happened_at")
                .unwrap()
                .column_type,
            ColumnType::Timestamp
        );
        assert_eq!(record.expected_output_schema().len(), 1);
        assert_eq!(
            record.reference_query(),
            "SELECT account_id\nFROM accounts\nWHERE status = 'closed';"
        );
    }

    #[test]
    fn test_fallback_id_without_title() {
        let text = "## Output\n| c | t |\n|---|---|\n| n | int |\n\n```\nSELECT 1 AS n\n```\n";
        let record = parse_problem(text, "select_one").unwrap();
        assert_eq!(record.id(), "select_one");
        assert_eq!(record.title(), "select_one");
        assert!(record.input_schema().is_empty());
    }

    #[test]
    fn test_non_sql_fence_is_skipped() {
        let text = "# Q\n\n## Output\n| c | t |\n|---|---|\n| n | int |\n\n\
```text\n+---+\n| n |\n+---+\n```\n\n```sql\nSELECT 1 AS n\n```\n";
        let record = parse_problem(text, "q").unwrap();
        assert_eq!(record.reference_query(), "SELECT 1 AS n");
        assert_eq!(record.expected_output_schema().len(), 1);
    }

    #[test]
    fn test_missing_query_is_malformed() {
        let text = "# Q\n\n## Output\n| c | t |\n|---|---|\n| n | int |\n";
        assert!(matches!(
            parse_problem(text, "q"),
            Err(Error::MalformedRecord(msg)) if msg.contains("reference query")
        ));
    }

    #[test]
    fn test_bad_row_reports_line() {
        let text = "# Q\n\nTable: t\n| c | t |\n|---|---|\n| only_one |\n";
        assert!(matches!(
            parse_problem(text, "q"),
            Err(Error::MalformedRecord(msg)) if msg.starts_with("line 6")
        ));
    }

    #[test]
    fn test_table_label() {
        assert_eq!(table_label("Table: `orders`"), Some("orders".to_string()));
        assert_eq!(table_label("**Table:** users"), Some("users".to_string()));
        assert_eq!(table_label("Note: nothing"), None);
        assert_eq!(table_label("Table:"), None);
    }
}
