//! Dialect formatting utilities.
//!
//! The compilers never hard-code how identifiers or values are spelled.
//! They take two small capabilities instead, [`QuoteIdentifier`] and
//! [`FormatLiteral`]. [`PostgresDialect`] implements both; any closure
//! with the right signature does too, so a new dialect is a new pair of
//! functions.

use std::sync::LazyLock;

use regex::Regex;

use crate::literal::Literal;

/// Identifiers that never need quoting: lowercase start, then lowercase,
/// digits, underscores or dollar signs.
static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("Invalid bare identifier regex")
});

/// PostgreSQL reserved key words (including those that may be used as
/// function or type names only).
const RESERVED_WORDS: &[&str] = &[
    "ALL",
    "ANALYSE",
    "ANALYZE",
    "AND",
    "ANY",
    "ARRAY",
    "AS",
    "ASC",
    "ASYMMETRIC",
    "AUTHORIZATION",
    "BINARY",
    "BOTH",
    "CASE",
    "CAST",
    "CHECK",
    "COLLATE",
    "COLLATION",
    "COLUMN",
    "CONCURRENTLY",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT_CATALOG",
    "CURRENT_DATE",
    "CURRENT_ROLE",
    "CURRENT_SCHEMA",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "CURRENT_USER",
    "DEFAULT",
    "DEFERRABLE",
    "DESC",
    "DISTINCT",
    "DO",
    "ELSE",
    "END",
    "EXCEPT",
    "FALSE",
    "FETCH",
    "FOR",
    "FOREIGN",
    "FREEZE",
    "FROM",
    "FULL",
    "GRANT",
    "GROUP",
    "HAVING",
    "ILIKE",
    "IN",
    "INITIALLY",
    "INNER",
    "INTERSECT",
    "INTO",
    "IS",
    "ISNULL",
    "JOIN",
    "LATERAL",
    "LEADING",
    "LEFT",
    "LIKE",
    "LIMIT",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NATURAL",
    "NOT",
    "NOTNULL",
    "NULL",
    "OFFSET",
    "ON",
    "ONLY",
    "OR",
    "ORDER",
    "OUTER",
    "OVERLAPS",
    "PLACING",
    "PRIMARY",
    "REFERENCES",
    "RETURNING",
    "RIGHT",
    "SELECT",
    "SESSION_USER",
    "SIMILAR",
    "SOME",
    "SYMMETRIC",
    "SYSTEM_USER",
    "TABLE",
    "TABLESAMPLE",
    "THEN",
    "TO",
    "TRAILING",
    "TRUE",
    "UNION",
    "UNIQUE",
    "USER",
    "USING",
    "VARIADIC",
    "VERBOSE",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
];

/// A literal has no representation in the target dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct UnsupportedLiteral {
    /// Why the literal was rejected.
    pub reason: String,
}

impl UnsupportedLiteral {
    /// Creates a new rejection with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Capability: turn an identifier into its SQL spelling.
pub trait QuoteIdentifier {
    /// Quotes an identifier (table, column, index name...).
    fn quote_identifier(&self, name: &str) -> String;
}

/// Capability: turn a literal value into SQL text.
pub trait FormatLiteral {
    /// Formats a literal, or rejects it if it has no SQL spelling.
    fn format_literal(&self, literal: &Literal) -> Result<String, UnsupportedLiteral>;
}

impl<F> QuoteIdentifier for F
where
    F: Fn(&str) -> String,
{
    fn quote_identifier(&self, name: &str) -> String {
        self(name)
    }
}

impl<F> FormatLiteral for F
where
    F: Fn(&Literal) -> Result<String, UnsupportedLiteral>,
{
    fn format_literal(&self, literal: &Literal) -> Result<String, UnsupportedLiteral> {
        self(literal)
    }
}

/// PostgreSQL formatting rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the dialect name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "postgresql"
    }
}

impl QuoteIdentifier for PostgresDialect {
    fn quote_identifier(&self, name: &str) -> String {
        split_qualified(name)
            .into_iter()
            .map(quote_segment)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl FormatLiteral for PostgresDialect {
    fn format_literal(&self, literal: &Literal) -> Result<String, UnsupportedLiteral> {
        match literal {
            Literal::Null => Ok(String::from("NULL")),
            Literal::Boolean(b) => Ok(String::from(if *b { "true" } else { "false" })),
            Literal::Integer(n) => Ok(n.to_string()),
            Literal::Float(f) => format_float(*f),
            Literal::Text(s) => {
                if s.contains('\0') {
                    return Err(UnsupportedLiteral::new("text contains a NUL byte"));
                }
                Ok(quote_string(s))
            }
            Literal::Date(d) => Ok(format!("'{}'", d.format("%Y-%m-%d"))),
            Literal::Timestamp(ts) => Ok(format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f"))),
        }
    }
}

/// Wraps a string in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders `ARRAY[v1, v2, ...]`, formatting each element individually.
pub fn array_literal<F>(formatter: &F, values: &[Literal]) -> Result<String, UnsupportedLiteral>
where
    F: FormatLiteral + ?Sized,
{
    let items = values
        .iter()
        .map(|v| formatter.format_literal(v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("ARRAY[{}]", items.join(", ")))
}

/// Returns true when `word` is a PostgreSQL reserved key word.
#[must_use]
pub fn is_reserved_word(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_WORDS.contains(&upper.as_str())
}

fn format_float(value: f64) -> Result<String, UnsupportedLiteral> {
    if !value.is_finite() {
        return Err(UnsupportedLiteral::new(format!(
            "non-finite float {value}"
        )));
    }
    // Display gives the shortest text that parses back to the same f64.
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    Ok(text)
}

/// Splits `schema.table` into segments, keeping dots inside quotes.
fn split_qualified(name: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in name.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                segments.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&name[start..]);
    segments
}

fn is_quoted(segment: &str) -> bool {
    segment.len() >= 2
        && segment.starts_with('"')
        && segment.ends_with('"')
        && !segment[1..segment.len() - 1]
            .replace("\"\"", "")
            .contains('"')
}

fn quote_segment(segment: &str) -> String {
    if is_quoted(segment) {
        return segment.to_string();
    }
    if BARE_IDENTIFIER.is_match(segment) && !is_reserved_word(segment) {
        return segment.to_string();
    }
    format!("\"{}\"", segment.replace('"', "\"\""))
}
