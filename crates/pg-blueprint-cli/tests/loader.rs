//! Loading and compiling blueprint files.

use std::io::Write;

use pg_blueprint_cli::{CliError, compile_files, load_file, render_script};
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

const GIST_TABLE: &str = r#"{
    "table": "test_table",
    "commands": [
        {
            "command": "create_table",
            "columns": [
                {"name": "code", "type": {"type": "ts_range"}, "index": {"method": "gist"}}
            ]
        }
    ]
}"#;

const VIEWS: &str = r#"[
    {"table": "v1", "commands": [{"command": "create_view", "name": "v1", "select": "SELECT 1"}]},
    {"table": "v2", "commands": [{"command": "drop_view", "name": "v2", "materialized": true}]}
]"#;

fn blueprint_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_single_blueprint() {
    let file = blueprint_file(GIST_TABLE);
    let blueprints = assert_ok!(load_file(file.path()));
    assert_eq!(blueprints.len(), 1);
    assert_eq!(blueprints[0].name(), "test_table");
}

#[test]
fn test_load_blueprint_array() {
    let file = blueprint_file(VIEWS);
    let blueprints = assert_ok!(load_file(file.path()));
    let names: Vec<_> = blueprints.iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["v1", "v2"]);
}

#[test]
fn test_compile_files_in_order() {
    let first = blueprint_file(GIST_TABLE);
    let second = blueprint_file(VIEWS);
    let compiled = assert_ok!(compile_files(&[first.path(), second.path()]));

    assert_eq!(compiled.len(), 3);
    assert_eq!(compiled[0].source, first.path());
    assert_eq!(
        render_script(&compiled),
        "CREATE TABLE test_table (code tsrange NOT NULL);\n\
         CREATE INDEX test_table_code_gist ON test_table USING gist (code);\n\
         CREATE VIEW v1 AS SELECT 1;\n\
         DROP MATERIALIZED VIEW v2;\n"
    );
}

#[test]
fn test_one_bad_blueprint_fails_the_batch() {
    let good = blueprint_file(GIST_TABLE);
    let bad = blueprint_file(
        r#"{"table": "test_table", "commands": [{"command": "create_index", "columns": []}]}"#,
    );

    let err = assert_err!(compile_files(&[good.path(), bad.path()]));
    match err {
        CliError::Compile { path, table, .. } => {
            assert_eq!(path, bad.path());
            assert_eq!(table, "test_table");
        }
        other => panic!("Expected compile error, got {other:?}"),
    }
}

#[test]
fn test_invalid_json() {
    let file = blueprint_file("{ not json");
    match assert_err!(load_file(file.path())) {
        CliError::Parse { path, .. } => assert_eq!(path, file.path()),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    match assert_err!(load_file(&path)) {
        CliError::Read { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("Expected read error, got {other:?}"),
    }
}
