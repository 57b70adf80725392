//! Column definitions.

use serde::{Deserialize, Serialize};

use super::command::IndexMethod;
use crate::literal::{Literal, ToLiteral};

/// Column types understood by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    /// Auto-incrementing 32-bit key (`serial`).
    Increments,
    /// Auto-incrementing 64-bit key (`bigserial`).
    BigIncrements,
    /// 16-bit integer.
    SmallInteger,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Variable-length string with a maximum length.
    String {
        /// Maximum length.
        length: u32,
    },
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Timestamp without time zone.
    Timestamp {
        /// Fractional seconds precision.
        #[serde(default)]
        precision: Option<u8>,
    },
    /// Timestamp with time zone.
    TimestampTz {
        /// Fractional seconds precision.
        #[serde(default)]
        precision: Option<u8>,
    },
    /// Exact numeric.
    Decimal {
        /// Total digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// UUID.
    Uuid,
    /// Binary JSON.
    Jsonb,
    /// Range of timestamps without time zone.
    TsRange,
    /// Text search document.
    TsVector,
    /// Any other type, emitted verbatim.
    Custom {
        /// Type name as written in SQL.
        name: String,
    },
}

impl ColumnType {
    /// Returns the PostgreSQL type name.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Increments => "serial".to_string(),
            Self::BigIncrements => "bigserial".to_string(),
            Self::SmallInteger => "smallint".to_string(),
            Self::Integer => "integer".to_string(),
            Self::BigInteger => "bigint".to_string(),
            Self::String { length } => format!("varchar({length})"),
            Self::Text => "text".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Date => "date".to_string(),
            Self::Timestamp { precision } => match precision {
                Some(p) => format!("timestamp({p}) without time zone"),
                None => "timestamp without time zone".to_string(),
            },
            Self::TimestampTz { precision } => match precision {
                Some(p) => format!("timestamp({p}) with time zone"),
                None => "timestamp with time zone".to_string(),
            },
            Self::Decimal { precision, scale } => format!("decimal({precision}, {scale})"),
            Self::Uuid => "uuid".to_string(),
            Self::Jsonb => "jsonb".to_string(),
            Self::TsRange => "tsrange".to_string(),
            Self::TsVector => "tsvector".to_string(),
            Self::Custom { name } => name.clone(),
        }
    }

    /// Returns true for the serial types, which imply a primary key.
    #[must_use]
    pub const fn is_serial(&self) -> bool {
        matches!(self, Self::Increments | Self::BigIncrements)
    }
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// A literal, formatted by the dialect.
    Literal(Literal),
    /// A SQL expression emitted verbatim (e.g. `now()`).
    Expression(String),
}

/// Index declared inline on a column (`->unique()`, `->gist()`...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluentIndex {
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
    /// Index method.
    #[serde(default)]
    pub method: IndexMethod,
    /// Explicit index name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A column to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether NULL is allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the column is the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Default value.
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Column comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Inline index.
    #[serde(default)]
    pub index: Option<FluentIndex>,
}

impl ColumnDefinition {
    /// Creates a NOT NULL column. Serial types become the primary key.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let primary_key = column_type.is_serial();
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key,
            default: None,
            comment: None,
            index: None,
        }
    }

    /// Allows NULL values.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Makes this column the primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    /// Sets a literal default.
    pub fn default<T: ToLiteral>(&mut self, value: T) -> &mut Self {
        self.default = Some(DefaultValue::Literal(value.to_literal()));
        self
    }

    /// Sets a default SQL expression.
    pub fn default_expr(&mut self, expression: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Expression(expression.into()));
        self
    }

    /// Sets the column comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a unique constraint on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.fluent_index(true, IndexMethod::Btree, None)
    }

    /// Adds a named unique constraint on this column.
    pub fn unique_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.fluent_index(true, IndexMethod::Btree, Some(name.into()))
    }

    /// Adds a btree index on this column.
    pub fn index(&mut self) -> &mut Self {
        self.fluent_index(false, IndexMethod::Btree, None)
    }

    /// Adds a named btree index on this column.
    pub fn index_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.fluent_index(false, IndexMethod::Btree, Some(name.into()))
    }

    /// Adds a GiST index on this column.
    pub fn gist(&mut self) -> &mut Self {
        self.fluent_index(false, IndexMethod::Gist, None)
    }

    /// Adds a named GiST index on this column.
    pub fn gist_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.fluent_index(false, IndexMethod::Gist, Some(name.into()))
    }

    /// Adds a GIN index on this column.
    pub fn gin(&mut self) -> &mut Self {
        self.fluent_index(false, IndexMethod::Gin, None)
    }

    /// Adds a named GIN index on this column.
    pub fn gin_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.fluent_index(false, IndexMethod::Gin, Some(name.into()))
    }

    fn fluent_index(&mut self, unique: bool, method: IndexMethod, name: Option<String>) -> &mut Self {
        self.index = Some(FluentIndex {
            unique,
            method,
            name,
        });
        self
    }
}
