//! Command-line front end for `pg-blueprint`.
//!
//! Loads blueprints from JSON files, compiles them with the core
//! compiler, and prints or executes the resulting statements.
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the DDL for one or more blueprint files
//! pg-blueprint compile schema/users.json schema/orders.json
//!
//! # Execute it against a database
//! DATABASE_URL=postgres://localhost/app pg-blueprint apply schema/*.json
//!
//! # Show what apply would run
//! pg-blueprint apply --dry-run schema/*.json
//!
//! # Show the catalog definition of an index
//! pg-blueprint show-index test_table_name_unique
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod loader;

pub use catalog::Catalog;
pub use error::{CliError, Result};
pub use executor::PgExecutor;
pub use loader::{CompiledBlueprint, compile_files, load_file, render_script};
