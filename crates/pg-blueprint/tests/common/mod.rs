#![allow(dead_code)]

use pg_blueprint::blueprint::Blueprint;
use pg_blueprint::{Error, compile_blueprint};

pub fn compile(blueprint: &Blueprint) -> Vec<String> {
    compile_blueprint(blueprint)
        .unwrap_or_else(|e| panic!("Failed to compile {}: {e}", blueprint.name()))
}

pub fn compile_err(blueprint: &Blueprint) -> Error {
    match compile_blueprint(blueprint) {
        Ok(statements) => panic!("Expected compile error, got {statements:?}"),
        Err(e) => e,
    }
}

/// The table every partial index scenario is built on.
pub fn partial_test_table() -> Blueprint {
    let mut table = Blueprint::create("test_table");
    table.increments("id");
    table.string("name");
    table.string("code");
    table.integer("phone");
    table.boolean("enabled");
    table.integer("icq");
    table.soft_deletes();
    table
}

/// Returns the single statement that mentions `index`.
pub fn statement_for(statements: &[String], index: &str) -> String {
    let matching: Vec<_> = statements.iter().filter(|s| s.contains(index)).collect();
    match matching.as_slice() {
        [one] => (*one).clone(),
        other => panic!("Expected exactly one statement for {index}, got {other:?}"),
    }
}
