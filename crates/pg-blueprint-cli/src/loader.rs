//! Blueprint files.
//!
//! A file holds either one blueprint object or an array of them. Every
//! file is loaded and compiled before anything is returned, so a single
//! bad blueprint stops the whole batch.

use std::fs;
use std::path::{Path, PathBuf};

use pg_blueprint::{Blueprint, compile_blueprint};
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum BlueprintDocument {
    One(Blueprint),
    Many(Vec<Blueprint>),
}

/// Statements compiled from one blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBlueprint {
    /// File the blueprint was loaded from.
    pub source: PathBuf,
    /// Blueprint table name.
    pub table: String,
    /// Statements, in execution order.
    pub statements: Vec<String>,
}

/// Loads every blueprint in `path`, in file order.
pub fn load_file(path: &Path) -> Result<Vec<Blueprint>> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let blueprints = match document {
        BlueprintDocument::One(blueprint) => vec![blueprint],
        BlueprintDocument::Many(blueprints) => blueprints,
    };
    debug!(path = %path.display(), count = blueprints.len(), "Loaded blueprints");
    Ok(blueprints)
}

/// Loads and compiles every blueprint of every file, in order.
pub fn compile_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<CompiledBlueprint>> {
    let mut compiled = Vec::new();
    for path in paths {
        let path = path.as_ref();
        for blueprint in load_file(path)? {
            let statements = compile_blueprint(&blueprint).map_err(|source| CliError::Compile {
                path: path.to_path_buf(),
                table: blueprint.name().to_string(),
                source,
            })?;
            compiled.push(CompiledBlueprint {
                source: path.to_path_buf(),
                table: blueprint.name().to_string(),
                statements,
            });
        }
    }
    Ok(compiled)
}

/// Renders compiled blueprints as a SQL script, one statement per line.
#[must_use]
pub fn render_script(compiled: &[CompiledBlueprint]) -> String {
    compiled
        .iter()
        .flat_map(|c| &c.statements)
        .map(|sql| format!("{sql};\n"))
        .collect()
}
