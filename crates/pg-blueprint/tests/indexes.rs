//! Index naming and method scenarios.

mod common;

use common::{compile, compile_err, statement_for};
use pg_blueprint::blueprint::{Blueprint, IndexMethod};
use pg_blueprint::{ConfigurationError, Error};

#[test]
fn test_create_gist_index() {
    let mut table = Blueprint::create("test_table");
    table.ts_range("code").gist();

    let statements = compile(&table);
    assert_eq!(
        statement_for(&statements, "test_table_code_gist"),
        "CREATE INDEX test_table_code_gist ON test_table USING gist (code)"
    );

    let mut table = Blueprint::table("test_table");
    table.ts_range("some_id");
    table.ts_range("some_key");
    table.gist("some_key").named("specify_gist_key");
    table.gist("some_id");

    let statements = compile(&table);
    assert_eq!(
        statement_for(&statements, "specify_gist_key"),
        "CREATE INDEX specify_gist_key ON test_table USING gist (some_key)"
    );
    assert_eq!(
        statement_for(&statements, "test_table_some_id_gist"),
        "CREATE INDEX test_table_some_id_gist ON test_table USING gist (some_id)"
    );
}

#[test]
fn test_create_gin_index() {
    let mut table = Blueprint::create("test_table");
    table.ts_vector("id").gin();

    assert_eq!(
        statement_for(&compile(&table), "test_table_id_gin"),
        "CREATE INDEX test_table_id_gin ON test_table USING gin (id)"
    );
}

#[test]
fn test_create_specify_index() {
    let mut table = Blueprint::create("test_table");
    table.string("name").index_named("specify_index_name");

    assert_eq!(
        statement_for(&compile(&table), "specify_index_name"),
        "CREATE INDEX specify_index_name ON test_table USING btree (name)"
    );
}

#[test]
fn test_create_index_if_missing() {
    let mut table = Blueprint::create("test_table");
    table.increments("id");
    table.string("name");
    if !table.has_index(&["name"], true) {
        table.unique(&["name"]);
    }
    if !table.has_index(&["name"], true) {
        table.unique(&["name"]);
    }

    let statements = compile(&table);
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[1],
        "ALTER TABLE test_table ADD CONSTRAINT test_table_name_unique UNIQUE (name)"
    );
}

#[test]
fn test_has_index_sees_inline_indexes() {
    let mut table = Blueprint::create("test_table");
    table.string("name").unique();
    table.integer("phone").index();

    assert!(table.has_index(&["name"], true));
    assert!(table.has_index(&["phone"], false));
    assert!(!table.has_index(&["phone"], true));
    assert!(!table.has_index(&["name", "phone"], false));
}

#[test]
fn test_composite_and_method_names() {
    let mut table = Blueprint::table("Events.Log");
    table.index(&["created-at", "kind"]).using(IndexMethod::Brin);
    table.index(&["kind"]).using(IndexMethod::Hash);

    assert_eq!(
        compile(&table),
        vec![
            "CREATE INDEX events_log_created_at_kind_brin ON \"Events\".\"Log\" \
             USING brin (\"created-at\", kind)",
            "CREATE INDEX events_log_kind_hash ON \"Events\".\"Log\" USING hash (kind)",
        ]
    );
}

#[test]
fn test_zero_column_index_emits_nothing() {
    let mut table = Blueprint::create("test_table");
    table.increments("id");
    table.gist("");

    assert_eq!(
        compile_err(&table),
        Error::Configuration(ConfigurationError::EmptyIndexColumns {
            table: "test_table".to_string(),
            index: "test_table__gist".to_string(),
        })
    );
}

#[test]
fn test_unique_gin_is_rejected() {
    let mut table = Blueprint::create("test_table");
    table.jsonb("doc").unique();
    table.unique(&["doc"]).using(IndexMethod::Gin).named("doc_unique");

    assert_eq!(
        compile_err(&table),
        Error::Configuration(ConfigurationError::UniqueRequiresBtree {
            index: "doc_unique".to_string(),
            method: "gin".to_string(),
        })
    );
}

#[test]
fn test_drop_index_and_constraint() {
    let mut table = Blueprint::table("test_table");
    table.drop_index("specify_gist_key");
    table.drop_unique("test_table_name_unique");

    assert_eq!(
        compile(&table),
        vec![
            "DROP INDEX specify_gist_key",
            "ALTER TABLE test_table DROP CONSTRAINT test_table_name_unique",
        ]
    );
}

#[test]
fn test_empty_index_name_is_rejected() {
    let mut table = Blueprint::table("test_table");
    table.gist("code").named("");

    assert_eq!(
        compile_err(&table),
        Error::Configuration(ConfigurationError::EmptyIdentifier("index"))
    );
}
