//! Boolean filter expressions used as partial index predicates.
//!
//! Expressions are plain trees built through [`column`] and the
//! combinators on [`Expr`]:
//!
//! ```rust
//! use pg_blueprint::expr::{Expr, column};
//!
//! let predicate = column("deleted_at")
//!     .is_null()
//!     .and(column("phone").between(1, 2))
//!     .or(Expr::raw("icq < ?", [10]));
//! assert!(matches!(predicate, Expr::Disjunction { .. }));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::literal::{Literal, ToLiteral, literals};

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `<>`
    #[serde(rename = "<>", alias = "!=")]
    NotEq,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `<=`
    #[serde(rename = "<=")]
    LtEq,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `>=`
    #[serde(rename = ">=")]
    GtEq,
}

impl ComparisonOperator {
    /// Returns the SQL spelling of the operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for ComparisonOperator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            other => Err(ConfigurationError::UnknownOperator(other.to_string())),
        }
    }
}

/// A boolean filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `column <op> literal`
    Comparison {
        /// Column name.
        column: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Right-hand value.
        value: Literal,
    },
    /// `left <op> right`, both columns.
    ColumnComparison {
        /// Left column.
        left: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Right column.
        right: String,
    },
    /// Inclusive range check, or its negation.
    Between {
        /// Column name.
        column: String,
        /// Lower bound.
        low: Literal,
        /// Upper bound.
        high: Literal,
        /// Whether this is NOT BETWEEN.
        #[serde(default)]
        negated: bool,
    },
    /// Membership in a list of values, or its negation.
    SetMembership {
        /// Column name.
        column: String,
        /// Candidate values, in order.
        values: Vec<Literal>,
        /// Whether this is NOT IN.
        #[serde(default)]
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    NullCheck {
        /// Column name.
        column: String,
        /// True for IS NULL, false for IS NOT NULL.
        is_null: bool,
    },
    /// SQL fragment with `?` placeholders bound positionally.
    RawFragment {
        /// Fragment text.
        template: String,
        /// Values substituted for the placeholders.
        #[serde(default)]
        bindings: Vec<Literal>,
    },
    /// `(left) AND (right)`
    Conjunction {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `(left) OR (right)`
    Disjunction {
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

impl Expr {
    /// Creates a raw fragment. `?` placeholders are replaced by `bindings`
    /// in order.
    #[must_use]
    pub fn raw<T: ToLiteral>(
        template: impl Into<String>,
        bindings: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::RawFragment {
            template: template.into(),
            bindings: literals(bindings),
        }
    }

    /// Creates a raw fragment without bindings.
    #[must_use]
    pub fn raw_sql(template: impl Into<String>) -> Self {
        Self::RawFragment {
            template: template.into(),
            bindings: Vec::new(),
        }
    }

    /// Combines two expressions with AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Conjunction {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Combines two expressions with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Disjunction {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Short description of the node, used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Comparison { column, .. } => format!("comparison on '{column}'"),
            Self::ColumnComparison { left, right, .. } => {
                format!("column comparison '{left}' / '{right}'")
            }
            Self::Between { column, .. } => format!("range check on '{column}'"),
            Self::SetMembership { column, .. } => format!("membership test on '{column}'"),
            Self::NullCheck { column, .. } => format!("null check on '{column}'"),
            Self::RawFragment { template, .. } => format!("raw fragment '{template}'"),
            Self::Conjunction { .. } => String::from("conjunction"),
            Self::Disjunction { .. } => String::from("disjunction"),
        }
    }
}

/// Creates a column reference to build comparisons from.
#[must_use]
pub fn column(name: impl Into<String>) -> ColumnRef {
    ColumnRef { name: name.into() }
}

/// A column on the left-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    name: String,
}

impl ColumnRef {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a comparison with an arbitrary operator.
    #[must_use]
    pub fn compare<T: ToLiteral>(self, operator: ComparisonOperator, value: T) -> Expr {
        Expr::Comparison {
            column: self.name,
            operator,
            value: value.to_literal(),
        }
    }

    /// `column = value`
    #[must_use]
    pub fn eq<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::Eq, value)
    }

    /// `column <> value`
    #[must_use]
    pub fn not_eq<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::NotEq, value)
    }

    /// `column < value`
    #[must_use]
    pub fn lt<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::Lt, value)
    }

    /// `column <= value`
    #[must_use]
    pub fn lt_eq<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::LtEq, value)
    }

    /// `column > value`
    #[must_use]
    pub fn gt<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::Gt, value)
    }

    /// `column >= value`
    #[must_use]
    pub fn gt_eq<T: ToLiteral>(self, value: T) -> Expr {
        self.compare(ComparisonOperator::GtEq, value)
    }

    /// Compares against another column.
    #[must_use]
    pub fn compare_column(self, operator: ComparisonOperator, other: impl Into<String>) -> Expr {
        Expr::ColumnComparison {
            left: self.name,
            operator,
            right: other.into(),
        }
    }

    /// `low <= column <= high`
    #[must_use]
    pub fn between<T: ToLiteral, U: ToLiteral>(self, low: T, high: U) -> Expr {
        Expr::Between {
            column: self.name,
            low: low.to_literal(),
            high: high.to_literal(),
            negated: false,
        }
    }

    /// `column < low OR column > high`
    #[must_use]
    pub fn not_between<T: ToLiteral, U: ToLiteral>(self, low: T, high: U) -> Expr {
        Expr::Between {
            column: self.name,
            low: low.to_literal(),
            high: high.to_literal(),
            negated: true,
        }
    }

    /// Membership in `values`.
    #[must_use]
    pub fn in_list<T: ToLiteral>(self, values: impl IntoIterator<Item = T>) -> Expr {
        Expr::SetMembership {
            column: self.name,
            values: literals(values),
            negated: false,
        }
    }

    /// Non-membership in `values`.
    #[must_use]
    pub fn not_in_list<T: ToLiteral>(self, values: impl IntoIterator<Item = T>) -> Expr {
        Expr::SetMembership {
            column: self.name,
            values: literals(values),
            negated: true,
        }
    }

    /// `column IS NULL`
    #[must_use]
    pub fn is_null(self) -> Expr {
        Expr::NullCheck {
            column: self.name,
            is_null: true,
        }
    }

    /// `column IS NOT NULL`
    #[must_use]
    pub fn is_not_null(self) -> Expr {
        Expr::NullCheck {
            column: self.name,
            is_null: false,
        }
    }
}
