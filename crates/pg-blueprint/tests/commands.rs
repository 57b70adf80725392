//! Views, triggers and partitions, built fluently and from JSON.

mod common;

use common::{compile, compile_err};
use pg_blueprint::blueprint::{Blueprint, PartitionBounds, TriggerEvent, TriggerTiming};
use pg_blueprint::{ConfigurationError, Error, Literal};

#[test]
fn test_views() {
    let mut view = Blueprint::new("test_view");
    view.create_view("SELECT id, name FROM test_table", false);

    assert_eq!(
        compile(&view),
        vec!["CREATE VIEW test_view AS SELECT id, name FROM test_table"]
    );

    let mut view = Blueprint::new("test_view");
    view.drop_view();
    assert_eq!(compile(&view), vec!["DROP VIEW test_view"]);
}

#[test]
fn test_trigger_with_procedure_and_arguments() {
    let mut table = Blueprint::table("accounts");
    table
        .create_trigger(
            "accounts_touch",
            TriggerTiming::Before,
            TriggerEvent::Update,
            "touch",
        )
        .execute_procedure("util.touch", [1, 2]);

    assert_eq!(
        compile(&table),
        vec![
            "CREATE TRIGGER accounts_touch BEFORE UPDATE ON accounts \
             FOR EACH ROW EXECUTE PROCEDURE util.touch(1, 2)"
        ]
    );
}

#[test]
fn test_trigger_without_events_is_rejected() {
    let mut table = Blueprint::table("accounts");
    table
        .create_trigger(
            "accounts_touch",
            TriggerTiming::Before,
            TriggerEvent::Update,
            "touch",
        )
        .events
        .clear();

    assert_eq!(
        compile_err(&table),
        Error::Configuration(ConfigurationError::EmptyTriggerEvents(
            "accounts_touch".to_string()
        ))
    );
}

#[test]
fn test_update_of_without_columns_is_rejected() {
    for columns in [vec![], vec!["status".to_string(), String::new()]] {
        let mut table = Blueprint::table("orders");
        table.create_trigger(
            "orders_audit",
            TriggerTiming::After,
            TriggerEvent::UpdateOf(columns),
            "audit_row",
        );

        assert_eq!(
            compile_err(&table),
            Error::Configuration(ConfigurationError::EmptyUpdateColumns(
                "orders_audit".to_string()
            ))
        );
    }
}

#[test]
fn test_partition_bounds() {
    let mut table = Blueprint::table("measurements");
    table.attach_partition(
        "measurements_y2024",
        PartitionBounds::Range {
            from: vec![Literal::Integer(2024), Literal::Integer(1)],
            to: vec![Literal::Integer(2025), Literal::Integer(1)],
        },
    );
    table.attach_partition(
        "measurements_raw",
        PartitionBounds::Raw("FOR VALUES FROM (MINVALUE) TO (0)".to_string()),
    );
    table.detach_partition("measurements_y2024");

    assert_eq!(
        compile(&table),
        vec![
            "ALTER TABLE measurements ATTACH PARTITION measurements_y2024 \
             FOR VALUES FROM (2024, 1) TO (2025, 1)",
            "ALTER TABLE measurements ATTACH PARTITION measurements_raw \
             FOR VALUES FROM (MINVALUE) TO (0)",
            "ALTER TABLE measurements DETACH PARTITION measurements_y2024",
        ]
    );
}

#[test]
fn test_blueprint_from_json() {
    let json = r#"{
        "table": "test_table",
        "commands": [
            {
                "command": "create_table",
                "columns": [
                    {"name": "id", "type": {"type": "increments"}, "primary_key": true},
                    {"name": "name", "type": {"type": "string", "length": 255}},
                    {"name": "phone", "type": {"type": "integer"}}
                ]
            },
            {
                "command": "create_index",
                "columns": ["name"],
                "unique": true,
                "predicate": {
                    "kind": "comparison",
                    "column": "phone",
                    "operator": "=",
                    "value": {"type": "integer", "value": 1234}
                }
            },
            {
                "command": "attach_partition",
                "partition": "test_table_default",
                "bounds": "default"
            }
        ]
    }"#;

    let blueprint: Blueprint = serde_json::from_str(json).unwrap();
    assert_eq!(
        compile(&blueprint),
        vec![
            "CREATE TABLE test_table (id serial PRIMARY KEY, name varchar(255) NOT NULL, \
             phone integer NOT NULL)",
            "CREATE UNIQUE INDEX test_table_name_unique ON test_table USING btree (name) \
             WHERE (phone = 1234)",
            "ALTER TABLE test_table ATTACH PARTITION test_table_default DEFAULT",
        ]
    );
}
