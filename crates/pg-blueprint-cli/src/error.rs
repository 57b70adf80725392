//! Error types for the command-line tool.

use std::path::PathBuf;

/// Errors raised while loading, compiling or applying blueprints.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A blueprint file could not be read.
    #[error("Failed to read blueprint file '{path}': {source}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A blueprint file is not valid blueprint JSON.
    #[error("Failed to parse blueprint file '{path}': {source}")]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A blueprint failed to compile.
    #[error("Blueprint '{table}' in '{path}' does not compile: {source}")]
    Compile {
        /// File the blueprint came from.
        path: PathBuf,
        /// Blueprint table name.
        table: String,
        /// Compiler error.
        source: pg_blueprint::Error,
    },

    /// A command needs a database but none was configured.
    #[error("No database configured; pass --database-url or set DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database error while executing statements.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
