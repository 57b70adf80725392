//! Literal values bound into predicates, defaults and partition bounds.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A literal value that is rendered inline into DDL text.
///
/// Values are never parameterized: DDL has no bind parameters, so every
/// literal goes through a [`FormatLiteral`](crate::dialect::FormatLiteral)
/// implementation that escapes it for the target dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double precision float.
    Float(f64),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
}

impl Literal {
    /// Returns a short name of the value kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Returns true for [`Literal::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Trait for types that can be converted to a [`Literal`].
pub trait ToLiteral {
    /// Converts the value to a `Literal`.
    fn to_literal(self) -> Literal;
}

impl ToLiteral for Literal {
    fn to_literal(self) -> Literal {
        self
    }
}

impl ToLiteral for bool {
    fn to_literal(self) -> Literal {
        Literal::Boolean(self)
    }
}

impl ToLiteral for i64 {
    fn to_literal(self) -> Literal {
        Literal::Integer(self)
    }
}

impl ToLiteral for i32 {
    fn to_literal(self) -> Literal {
        Literal::Integer(i64::from(self))
    }
}

impl ToLiteral for i16 {
    fn to_literal(self) -> Literal {
        Literal::Integer(i64::from(self))
    }
}

impl ToLiteral for u32 {
    fn to_literal(self) -> Literal {
        Literal::Integer(i64::from(self))
    }
}

impl ToLiteral for u16 {
    fn to_literal(self) -> Literal {
        Literal::Integer(i64::from(self))
    }
}

impl ToLiteral for f64 {
    fn to_literal(self) -> Literal {
        Literal::Float(self)
    }
}

impl ToLiteral for f32 {
    fn to_literal(self) -> Literal {
        Literal::Float(f64::from(self))
    }
}

impl ToLiteral for String {
    fn to_literal(self) -> Literal {
        Literal::Text(self)
    }
}

impl ToLiteral for &str {
    fn to_literal(self) -> Literal {
        Literal::Text(String::from(self))
    }
}

impl ToLiteral for NaiveDate {
    fn to_literal(self) -> Literal {
        Literal::Date(self)
    }
}

impl ToLiteral for NaiveDateTime {
    fn to_literal(self) -> Literal {
        Literal::Timestamp(self)
    }
}

impl<T: ToLiteral> ToLiteral for Option<T> {
    fn to_literal(self) -> Literal {
        match self {
            Some(v) => v.to_literal(),
            None => Literal::Null,
        }
    }
}

/// Converts a list of values into literals, preserving order.
pub fn literals<T: ToLiteral>(values: impl IntoIterator<Item = T>) -> Vec<Literal> {
    values.into_iter().map(ToLiteral::to_literal).collect()
}
