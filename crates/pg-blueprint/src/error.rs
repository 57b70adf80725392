//! Error types for blueprint compilation.
//!
//! Two kinds of failure exist: the blueprint itself is structurally
//! invalid ([`ConfigurationError`]), or a predicate/literal cannot be
//! rendered as SQL text ([`CompilationError`]). Neither is ever
//! produced after statement text has been handed back to the caller.

/// The schema object model is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// An index or unique constraint lists no columns.
    #[error("Index '{index}' on table '{table}' has no columns")]
    EmptyIndexColumns {
        /// Table the index belongs to.
        table: String,
        /// Index name (derived when not given explicitly).
        index: String,
    },

    /// A table is created with neither columns nor a LIKE source.
    #[error("Table '{0}' is created without columns or a LIKE source")]
    EmptyTable(String),

    /// A second predicate was attached to the same index command.
    #[error("Index '{0}' already has a predicate attached")]
    PredicateAlreadyAttached(String),

    /// A predicate was attached to an index that is not unique.
    #[error("Predicate attached to non-unique index '{0}'")]
    PredicateOnNonUniqueIndex(String),

    /// A unique index or constraint was requested with a method other than btree.
    #[error("Unique index '{index}' must use btree, not {method}")]
    UniqueRequiresBtree {
        /// Index name.
        index: String,
        /// The rejected method.
        method: String,
    },

    /// A trigger was declared without any firing event.
    #[error("Trigger '{0}' has no events")]
    EmptyTriggerEvents(String),

    /// An UPDATE OF trigger event lists no columns, or an empty column.
    #[error("Trigger '{0}' has an UPDATE OF event without column names")]
    EmptyUpdateColumns(String),

    /// A required identifier is empty.
    #[error("Empty identifier for {0}")]
    EmptyIdentifier(&'static str),

    /// A comparison operator string could not be recognized.
    #[error("Unknown comparison operator '{0}'")]
    UnknownOperator(String),
}

/// An expression or literal cannot be rendered as SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompilationError {
    /// A literal value has no SQL representation.
    #[error("Unsupported literal in {node}: {reason}")]
    UnsupportedLiteral {
        /// Description of the node that carried the literal.
        node: String,
        /// Why the literal was rejected.
        reason: String,
    },

    /// NULL was used where a comparison would always yield NULL.
    #[error("NULL operand in {node}; use a null check instead")]
    NullOperand {
        /// Description of the offending node.
        node: String,
    },

    /// A raw fragment binds a different number of values than it has placeholders.
    #[error("Raw fragment '{template}' has {placeholders} placeholder(s) but {bindings} binding(s)")]
    PlaceholderMismatch {
        /// The raw template.
        template: String,
        /// Number of `?` placeholders found.
        placeholders: usize,
        /// Number of bound values supplied.
        bindings: usize,
    },
}

/// Any error raised while building or compiling a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Structural problem in the blueprint.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Rendering problem in a predicate or literal.
    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

/// Result type for blueprint operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_node() {
        let err = Error::from(ConfigurationError::EmptyIndexColumns {
            table: "test_table".to_string(),
            index: "test_table_index".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Index 'test_table_index' on table 'test_table' has no columns"
        );

        let err = Error::from(CompilationError::PlaceholderMismatch {
            template: "phone = ?".to_string(),
            placeholders: 1,
            bindings: 2,
        });
        assert!(err.to_string().contains("1 placeholder(s) but 2 binding(s)"));
    }
}
