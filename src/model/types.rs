//! Column types for problem schemas
//!
//! This module defines the SQL column types a problem statement can declare.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared SQL column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    /// Boolean type
    Boolean,
    /// Small integer (16-bit)
    SmallInt,
    /// Integer (32-bit)
    Integer,
    /// Big integer (64-bit)
    BigInt,
    /// Single-precision floating point
    Float,
    /// Double-precision floating point
    Double,
    /// Fixed-point decimal with precision and scale
    Decimal(u8, u8),
    /// Fixed-length character string
    Char(usize),
    /// Variable-length character string with max length
    Varchar(usize),
    /// Unlimited text
    Text,
    /// Date (year, month, day)
    Date,
    /// Time (hour, minute, second)
    Time,
    /// Timestamp (date + time)
    Timestamp,
    /// Enumerated string values
    Enum(Vec<String>),
    /// Any type name not listed above, kept verbatim
    Other(String),
}

/// Default length for `VARCHAR` declared without one
pub const DEFAULT_VARCHAR_LEN: usize = 255;

impl ColumnType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::SmallInt
                | ColumnType::Integer
                | ColumnType::BigInt
                | ColumnType::Float
                | ColumnType::Double
                | ColumnType::Decimal(_, _)
        )
    }

    /// Check if this type holds fractional numbers
    pub fn is_fractional(&self) -> bool {
        matches!(
            self,
            ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_, _)
        )
    }

    /// Check if this type is a string type
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Text
        )
    }

    /// Check if this type is a date/time type
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::Time | ColumnType::Timestamp
        )
    }
}

/// Split `name(arg, arg)` into the name and its argument list
fn split_args(s: &str) -> Result<(&str, Option<Vec<String>>), String> {
    match (s.find('('), s.ends_with(')')) {
        (Some(open), true) => {
            let args = scan_args(&s[open + 1..s.len() - 1])?;
            Ok((s[..open].trim(), Some(args)))
        }
        _ => Ok((s, None)),
    }
}

/// Split a comma-separated argument list. A quoted argument keeps its
/// commas, and a doubled quote inside it stands for one quote character.
fn scan_args(list: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = list.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' if !quoted && current.trim().is_empty() => {
                current.clear();
                loop {
                    match chars.next() {
                        Some(q) if q == c && chars.peek() == Some(&c) => {
                            chars.next();
                            current.push(c);
                        }
                        Some(q) if q == c => break,
                        Some(other) => current.push(other),
                        None => return Err(format!("unterminated quote in '({})'", list)),
                    }
                }
                quoted = true;
            }
            ',' => {
                push_arg(&mut args, &mut current, quoted);
                quoted = false;
            }
            c if quoted => {
                if !c.is_whitespace() {
                    return Err(format!("unexpected '{}' after quoted argument", c));
                }
            }
            c => current.push(c),
        }
    }
    push_arg(&mut args, &mut current, quoted);
    Ok(args)
}

fn push_arg(args: &mut Vec<String>, current: &mut String, quoted: bool) {
    let arg = std::mem::take(current);
    if quoted {
        args.push(arg);
    } else if !arg.trim().is_empty() {
        args.push(arg.trim().to_string());
    }
}

/// Numeric argument at `idx`: `None` when absent, an error when present but
/// not a valid number for the target type
fn parse_len<T: FromStr>(
    args: &[String],
    idx: usize,
    type_name: &str,
) -> Result<Option<T>, String> {
    match args.get(idx) {
        None => Ok(None),
        Some(arg) => arg
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid argument '{}' for {}", arg, type_name)),
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("empty column type".to_string());
        }

        let (name, args) = split_args(trimmed)?;
        let args = args.unwrap_or_default();
        let ty = match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ColumnType::Boolean,
            "smallint" | "tinyint" => ColumnType::SmallInt,
            "int" | "integer" => ColumnType::Integer,
            "bigint" => ColumnType::BigInt,
            "float" | "real" => ColumnType::Float,
            "double" | "double precision" => ColumnType::Double,
            "decimal" | "numeric" => ColumnType::Decimal(
                parse_len(&args, 0, "DECIMAL")?.unwrap_or(10),
                parse_len(&args, 1, "DECIMAL")?.unwrap_or(0),
            ),
            "char" | "character" => ColumnType::Char(parse_len(&args, 0, "CHAR")?.unwrap_or(1)),
            "varchar" => ColumnType::Varchar(
                parse_len(&args, 0, "VARCHAR")?.unwrap_or(DEFAULT_VARCHAR_LEN),
            ),
            "text" | "string" => ColumnType::Text,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "timestamp" | "datetime" => ColumnType::Timestamp,
            "enum" => ColumnType::Enum(args),
            _ => ColumnType::Other(trimmed.to_string()),
        };
        Ok(ty)
    }
}

impl TryFrom<String> for ColumnType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::SmallInt => write!(f, "SMALLINT"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::Double => write!(f, "DOUBLE"),
            ColumnType::Decimal(p, s) => write!(f, "DECIMAL({}, {})", p, s),
            ColumnType::Char(n) => write!(f, "CHAR({})", n),
            ColumnType::Varchar(n) => write!(f, "VARCHAR({})", n),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Time => write!(f, "TIME"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
            ColumnType::Enum(variants) => {
                let quoted: Vec<String> = variants
                    .iter()
                    .map(|v| format!("'{}'", v.replace('\'', "''")))
                    .collect();
                write!(f, "ENUM({})", quoted.join(", "))
            }
            ColumnType::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("int".parse::<ColumnType>().unwrap(), ColumnType::Integer);
        assert_eq!("BOOL".parse::<ColumnType>().unwrap(), ColumnType::Boolean);
        assert_eq!(
            "datetime".parse::<ColumnType>().unwrap(),
            ColumnType::Timestamp
        );
        assert_eq!(
            "varchar".parse::<ColumnType>().unwrap(),
            ColumnType::Varchar(DEFAULT_VARCHAR_LEN)
        );
        assert_eq!(
            "Varchar(100)".parse::<ColumnType>().unwrap(),
            ColumnType::Varchar(100)
        );
        assert_eq!(
            "numeric(10, 2)".parse::<ColumnType>().unwrap(),
            ColumnType::Decimal(10, 2)
        );
    }

    #[test]
    fn test_parse_enum_and_other() {
        let ty: ColumnType = "enum('open', 'closed')".parse().unwrap();
        assert_eq!(
            ty,
            ColumnType::Enum(vec!["open".to_string(), "closed".to_string()])
        );
        assert_eq!(ty.to_string(), "ENUM('open', 'closed')");

        let ty: ColumnType = "geometry".parse().unwrap();
        assert_eq!(ty, ColumnType::Other("geometry".to_string()));
        assert!("  ".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_enum_quoted_variants() {
        let ty: ColumnType = "enum('in progress, late', 'done')".parse().unwrap();
        assert_eq!(
            ty,
            ColumnType::Enum(vec!["in progress, late".to_string(), "done".to_string()])
        );

        let ty: ColumnType = "ENUM('it''s', \"x\")".parse().unwrap();
        assert_eq!(ty, ColumnType::Enum(vec!["it's".to_string(), "x".to_string()]));

        assert!("enum('open".parse::<ColumnType>().is_err());
        assert!("enum('open' x)".parse::<ColumnType>().is_err());
    }

    #[test]
    fn test_enum_serde_keeps_commas_and_quotes() {
        let ty = ColumnType::Enum(vec![
            "a,b".to_string(),
            "it's".to_string(),
            String::new(),
        ]);
        assert_eq!(ty.to_string(), "ENUM('a,b', 'it''s', '')");

        let json = serde_json::to_string(&ty).unwrap();
        let back: ColumnType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn test_bad_numeric_arguments() {
        let err = "decimal(300, 2)".parse::<ColumnType>().unwrap_err();
        assert_eq!(err, "invalid argument '300' for DECIMAL");
        assert!("varchar(abc)".parse::<ColumnType>().is_err());
        assert!("char(-1)".parse::<ColumnType>().is_err());
        assert_eq!(
            "decimal(12)".parse::<ColumnType>().unwrap(),
            ColumnType::Decimal(12, 0)
        );
    }

    #[test]
    fn test_display_is_reparseable() {
        for ty in [
            ColumnType::Decimal(8, 3),
            ColumnType::Char(4),
            ColumnType::Timestamp,
        ] {
            assert_eq!(ty.to_string().parse::<ColumnType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_type_classes() {
        assert!(ColumnType::BigInt.is_numeric());
        assert!(!ColumnType::BigInt.is_fractional());
        assert!(ColumnType::Decimal(5, 2).is_fractional());
        assert!(ColumnType::Varchar(50).is_string());
        assert!(ColumnType::Date.is_temporal());
        assert!(!ColumnType::Text.is_temporal());
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&ColumnType::Varchar(20)).unwrap();
        assert_eq!(json, "\"VARCHAR(20)\"");
        let back: ColumnType = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(back, ColumnType::Integer);
    }
}
