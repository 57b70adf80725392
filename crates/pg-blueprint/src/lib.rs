//! PostgreSQL DDL compiler for schema blueprints.
//!
//! `pg-blueprint` turns a declarative description of schema changes into
//! the ordered list of PostgreSQL statements that performs them, with
//! first-class support for partial unique indexes:
//! - Predicates are typed expression trees, compiled to unambiguous,
//!   fully parenthesized SQL
//! - Identifier quoting and literal formatting are injected capabilities,
//!   so a new dialect is a new pair of functions
//! - Compilation is all-or-nothing per blueprint and never touches a
//!   database
//!
//! # Architecture
//!
//! - **Expressions** ([`expr`]) - comparison, range, membership, null
//!   check and raw fragments, combined with AND/OR
//! - **Predicate compiler** ([`predicate`]) - expression tree to SQL text
//! - **Blueprints** ([`blueprint`]) - a table plus its ordered commands
//! - **Statement compiler** ([`compiler`]) - blueprint to statements
//! - **Dialect** ([`dialect`]) - identifier and literal spelling
//!
//! # Example
//!
//! ```rust
//! use pg_blueprint::prelude::*;
//!
//! let mut table = Blueprint::create("test_table");
//! table.increments("id");
//! table.string("name");
//! table.integer("phone").nullable();
//! table.ts_range("code").nullable().gist();
//! table
//!     .unique_partial(&["name"])
//!     .where_(column("phone").eq(1234));
//!
//! let statements = compile_blueprint(&table).unwrap();
//! assert_eq!(
//!     statements[1],
//!     "CREATE UNIQUE INDEX test_table_name_unique ON test_table USING btree (name) \
//!      WHERE (phone = 1234)"
//! );
//! assert_eq!(
//!     statements[2],
//!     "CREATE INDEX test_table_code_gist ON test_table USING gist (code)"
//! );
//! ```

pub mod blueprint;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod literal;
pub mod predicate;

pub use blueprint::{Blueprint, Command};
pub use compiler::{StatementCompiler, compile_blueprint};
pub use dialect::{FormatLiteral, PostgresDialect, QuoteIdentifier};
pub use error::{CompilationError, ConfigurationError, Error, Result};
pub use expr::{ComparisonOperator, Expr, column};
pub use literal::{Literal, ToLiteral};
pub use predicate::compile_predicate;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::blueprint::{
        Blueprint, ColumnType, Command, CreateIndex, IndexMethod, LikeFeature, PartialUnique,
        PartitionBounds, TriggerEvent, TriggerTiming,
    };
    pub use crate::compiler::{StatementCompiler, compile_blueprint};
    pub use crate::dialect::{FormatLiteral, PostgresDialect, QuoteIdentifier};
    pub use crate::error::{CompilationError, ConfigurationError, Error, Result};
    pub use crate::expr::{ComparisonOperator, Expr, column};
    pub use crate::literal::{Literal, ToLiteral};
    pub use crate::predicate::compile_predicate;
}
