//! Schema object model.
//!
//! A [`Blueprint`] names one table (or view) and owns an ordered list of
//! [`Command`]s. Commands are appended only through the fluent methods
//! below; compilation borrows the blueprint immutably.
//!
//! # Example
//!
//! ```rust
//! use pg_blueprint::blueprint::Blueprint;
//!
//! let mut table = Blueprint::create("test_table");
//! table.increments("id");
//! table.string("name");
//! table.soft_deletes();
//! table.unique_partial(&["name"]).where_null("deleted_at");
//!
//! assert_eq!(table.commands().len(), 2);
//! ```

mod column;
mod command;

pub use column::{ColumnDefinition, ColumnType, DefaultValue, FluentIndex};
pub use command::{
    AddColumns, AttachPartition, Command, CreateIndex, CreateTable, CreateTrigger, CreateView,
    DetachPartition, DropIndex, DropTable, DropTrigger, DropUnique, DropView, IndexMethod,
    LikeClause, LikeFeature, LikeOption, LikeOptions, PartitionBounds, RoutineKind, TriggerEvent,
    TriggerLevel, TriggerTiming, index_name,
};

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::expr::{ComparisonOperator, Expr, column};
use crate::literal::ToLiteral;

/// A named unit of schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    table: String,
    #[serde(default)]
    commands: Vec<Command>,
}

impl Blueprint {
    /// Creates an empty blueprint for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            commands: Vec::new(),
        }
    }

    /// Creates a blueprint that creates `table`.
    #[must_use]
    pub fn create(table: impl Into<String>) -> Self {
        let mut blueprint = Self::new(table);
        blueprint
            .commands
            .push(Command::CreateTable(CreateTable::default()));
        blueprint
    }

    /// Creates a blueprint that alters the existing `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self::new(table)
    }

    /// Table (or view) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table
    }

    /// Explicit commands, in order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Commands as compiled: the explicit commands followed by one
    /// `CreateIndex` per inline column index, in column order.
    #[must_use]
    pub fn resolved_commands(&self) -> Vec<Cow<'_, Command>> {
        let fluent = self
            .commands
            .iter()
            .flat_map(Command::columns)
            .filter_map(|col| {
                col.index.as_ref().map(|index| {
                    Command::CreateIndex(CreateIndex {
                        name: index.name.clone(),
                        columns: vec![col.name.clone()],
                        method: index.method,
                        unique: index.unique,
                        predicate: None,
                    })
                })
            })
            .map(Cow::Owned);

        self.commands.iter().map(Cow::Borrowed).chain(fluent).collect()
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Adds a column. On a created table it joins the CREATE TABLE column
    /// list; otherwise it goes into an implied ADD COLUMN command that
    /// runs before everything else.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> &mut ColumnDefinition {
        let columns = self.column_target();
        columns.push(ColumnDefinition::new(name, column_type));
        let last = columns.len() - 1;
        &mut columns[last]
    }

    fn column_target(&mut self) -> &mut Vec<ColumnDefinition> {
        let position = self
            .commands
            .iter()
            .position(|c| matches!(c, Command::CreateTable(_) | Command::AddColumns(_)));
        let index = position.unwrap_or_else(|| {
            self.commands
                .insert(0, Command::AddColumns(AddColumns::default()));
            0
        });
        match &mut self.commands[index] {
            Command::CreateTable(op) => &mut op.columns,
            Command::AddColumns(op) => &mut op.columns,
            _ => unreachable!("column target is always a column-carrying command"),
        }
    }

    /// Auto-incrementing integer primary key.
    pub fn increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Increments)
    }

    /// Auto-incrementing bigint primary key.
    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigIncrements)
    }

    /// `smallint` column.
    pub fn small_integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::SmallInteger)
    }

    /// `integer` column.
    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Integer)
    }

    /// `bigint` column.
    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::BigInteger)
    }

    /// `varchar(255)` column.
    pub fn string(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.varchar(name, 255)
    }

    /// `varchar(length)` column.
    pub fn varchar(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::String { length })
    }

    /// `text` column.
    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Text)
    }

    /// `boolean` column.
    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Boolean)
    }

    /// `date` column.
    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Date)
    }

    /// `timestamp(0) without time zone` column.
    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Timestamp { precision: Some(0) })
    }

    /// `timestamp(0) with time zone` column.
    pub fn timestamp_tz(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TimestampTz { precision: Some(0) })
    }

    /// `decimal(precision, scale)` column.
    pub fn decimal(
        &mut self,
        name: impl Into<String>,
        precision: u8,
        scale: u8,
    ) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Decimal { precision, scale })
    }

    /// `uuid` column.
    pub fn uuid(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Uuid)
    }

    /// `jsonb` column.
    pub fn jsonb(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::Jsonb)
    }

    /// `tsrange` column.
    pub fn ts_range(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TsRange)
    }

    /// `tsvector` column.
    pub fn ts_vector(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.add_column(name, ColumnType::TsVector)
    }

    /// Nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> &mut ColumnDefinition {
        self.timestamp("deleted_at").nullable()
    }

    /// Column of any other type, emitted verbatim.
    pub fn custom(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> &mut ColumnDefinition {
        self.add_column(
            name,
            ColumnType::Custom {
                name: type_name.into(),
            },
        )
    }

    // -------------------------------------------------------------------------
    // Table
    // -------------------------------------------------------------------------

    /// Finds the CREATE TABLE command, promoting the implied ADD COLUMN
    /// command (and its columns) when there is one.
    fn create_command(&mut self) -> &mut CreateTable {
        let position = self
            .commands
            .iter()
            .position(|c| matches!(c, Command::CreateTable(_) | Command::AddColumns(_)));
        let index = match position {
            Some(index) => {
                if let Command::AddColumns(op) = &mut self.commands[index] {
                    let columns = std::mem::take(&mut op.columns);
                    self.commands[index] = Command::CreateTable(CreateTable {
                        columns,
                        ..CreateTable::default()
                    });
                }
                index
            }
            None => {
                self.commands
                    .insert(0, Command::CreateTable(CreateTable::default()));
                0
            }
        };
        match &mut self.commands[index] {
            Command::CreateTable(op) => op,
            _ => unreachable!("create command position always holds CreateTable"),
        }
    }

    /// Uses CREATE TABLE IF NOT EXISTS.
    pub fn if_not_exists(&mut self) -> &mut Self {
        self.create_command().if_not_exists = true;
        self
    }

    /// Copies the structure of `source` (`LIKE source`).
    pub fn like(&mut self, source: impl Into<String>) -> &mut LikeClause {
        self.create_command()
            .like
            .insert(LikeClause::new(source))
    }

    /// Drops the table.
    pub fn drop_table(&mut self) -> &mut Self {
        self.push(Command::DropTable(DropTable { if_exists: false }))
    }

    /// Drops the table if it exists.
    pub fn drop_table_if_exists(&mut self) -> &mut Self {
        self.push(Command::DropTable(DropTable { if_exists: true }))
    }

    // -------------------------------------------------------------------------
    // Indexes
    // -------------------------------------------------------------------------

    fn push_index(&mut self, index: CreateIndex) -> &mut CreateIndex {
        self.commands.push(Command::CreateIndex(index));
        match self.commands.last_mut() {
            Some(Command::CreateIndex(index)) => index,
            _ => unreachable!("an index command was just pushed"),
        }
    }

    /// Adds a btree index.
    pub fn index(&mut self, columns: &[&str]) -> &mut CreateIndex {
        self.push_index(CreateIndex::new(columns))
    }

    /// Adds a unique constraint.
    pub fn unique(&mut self, columns: &[&str]) -> &mut CreateIndex {
        self.push_index(CreateIndex {
            unique: true,
            ..CreateIndex::new(columns)
        })
    }

    /// Adds a GiST index on one column.
    pub fn gist(&mut self, column: &str) -> &mut CreateIndex {
        self.push_index(CreateIndex {
            method: IndexMethod::Gist,
            ..CreateIndex::new(&[column])
        })
    }

    /// Adds a GIN index on one column.
    pub fn gin(&mut self, column: &str) -> &mut CreateIndex {
        self.push_index(CreateIndex {
            method: IndexMethod::Gin,
            ..CreateIndex::new(&[column])
        })
    }

    /// Adds a unique index whose predicate is built from the returned
    /// handle. Without any `where_*` call it compiles to a plain unique
    /// constraint.
    pub fn unique_partial(&mut self, columns: &[&str]) -> PartialUnique<'_> {
        let index = self.unique(columns);
        PartialUnique { index }
    }

    /// Returns true if an index over exactly `columns` is already declared,
    /// inline or explicit. With `unique`, only unique indexes count.
    #[must_use]
    pub fn has_index(&self, columns: &[&str], unique: bool) -> bool {
        self.resolved_commands()
            .iter()
            .any(|command| match command.as_ref() {
                Command::CreateIndex(index) => {
                    (!unique || index.unique)
                        && index.columns.iter().map(String::as_str).eq(columns.iter().copied())
                }
                _ => false,
            })
    }

    /// Drops an index by name.
    pub fn drop_index(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(Command::DropIndex(DropIndex { name: name.into() }))
    }

    /// Drops a unique constraint by name.
    pub fn drop_unique(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(Command::DropUnique(DropUnique { name: name.into() }))
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// Creates a view named after the blueprint.
    pub fn create_view(&mut self, select: impl Into<String>, materialize: bool) -> &mut Self {
        let name = self.table.clone();
        self.push(Command::CreateView(CreateView {
            name,
            select: select.into(),
            materialize,
        }))
    }

    /// Drops the view named after the blueprint.
    pub fn drop_view(&mut self) -> &mut Self {
        let name = self.table.clone();
        self.push(Command::DropView(DropView {
            name,
            materialized: false,
        }))
    }

    /// Drops the materialized view named after the blueprint.
    pub fn drop_materialized_view(&mut self) -> &mut Self {
        let name = self.table.clone();
        self.push(Command::DropView(DropView {
            name,
            materialized: true,
        }))
    }

    // -------------------------------------------------------------------------
    // Triggers
    // -------------------------------------------------------------------------

    /// Creates a row-level trigger on the blueprint's table executing
    /// `function()`. Arguments, more events and the routine kind are set
    /// on the returned command.
    pub fn create_trigger(
        &mut self,
        name: impl Into<String>,
        timing: TriggerTiming,
        event: TriggerEvent,
        function: impl Into<String>,
    ) -> &mut CreateTrigger {
        let trigger = CreateTrigger {
            name: name.into(),
            timing,
            events: vec![event],
            table: self.table.clone(),
            level: TriggerLevel::Row,
            routine: RoutineKind::Function,
            function: function.into(),
            arguments: Vec::new(),
        };
        self.commands.push(Command::CreateTrigger(trigger));
        match self.commands.last_mut() {
            Some(Command::CreateTrigger(trigger)) => trigger,
            _ => unreachable!("a trigger command was just pushed"),
        }
    }

    /// Drops a trigger on the blueprint's table.
    pub fn drop_trigger(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(Command::DropTrigger(DropTrigger { name: name.into() }))
    }

    // -------------------------------------------------------------------------
    // Partitions
    // -------------------------------------------------------------------------

    /// Attaches `partition` with the given bounds.
    pub fn attach_partition(
        &mut self,
        partition: impl Into<String>,
        bounds: PartitionBounds,
    ) -> &mut Self {
        self.push(Command::AttachPartition(AttachPartition {
            partition: partition.into(),
            bounds,
        }))
    }

    /// Detaches `partition`.
    pub fn detach_partition(&mut self, partition: impl Into<String>) -> &mut Self {
        self.push(Command::DetachPartition(DetachPartition {
            partition: partition.into(),
        }))
    }
}

/// Predicate builder for a partial unique index.
///
/// Each `where_*` call is AND-ed onto the predicate built so far and
/// each `or_where` is OR-ed, left to right.
#[derive(Debug)]
pub struct PartialUnique<'a> {
    index: &'a mut CreateIndex,
}

impl PartialUnique<'_> {
    /// Sets an explicit index name.
    pub fn named(self, name: impl Into<String>) -> Self {
        self.index.name = Some(name.into());
        self
    }

    /// ANDs an arbitrary expression.
    pub fn where_(self, expr: Expr) -> Self {
        self.compose(expr, false)
    }

    /// ORs an arbitrary expression.
    pub fn or_where(self, expr: Expr) -> Self {
        self.compose(expr, true)
    }

    /// `column <op> value`
    pub fn where_compare<T: ToLiteral>(
        self,
        column_name: &str,
        operator: ComparisonOperator,
        value: T,
    ) -> Self {
        self.where_(column(column_name).compare(operator, value))
    }

    /// `left <op> right`
    pub fn where_column(self, left: &str, operator: ComparisonOperator, right: &str) -> Self {
        self.where_(column(left).compare_column(operator, right))
    }

    /// `column IS NULL`
    pub fn where_null(self, column_name: &str) -> Self {
        self.where_(column(column_name).is_null())
    }

    /// `column IS NOT NULL`
    pub fn where_not_null(self, column_name: &str) -> Self {
        self.where_(column(column_name).is_not_null())
    }

    /// Inclusive range.
    pub fn where_between<T: ToLiteral, U: ToLiteral>(
        self,
        column_name: &str,
        low: T,
        high: U,
    ) -> Self {
        self.where_(column(column_name).between(low, high))
    }

    /// Outside an inclusive range.
    pub fn where_not_between<T: ToLiteral, U: ToLiteral>(
        self,
        column_name: &str,
        low: T,
        high: U,
    ) -> Self {
        self.where_(column(column_name).not_between(low, high))
    }

    /// Membership in `values`.
    pub fn where_in<T: ToLiteral>(
        self,
        column_name: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        self.where_(column(column_name).in_list(values))
    }

    /// Non-membership in `values`.
    pub fn where_not_in<T: ToLiteral>(
        self,
        column_name: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        self.where_(column(column_name).not_in_list(values))
    }

    /// Raw fragment with `?` placeholders.
    pub fn where_raw<T: ToLiteral>(
        self,
        template: &str,
        bindings: impl IntoIterator<Item = T>,
    ) -> Self {
        self.where_(Expr::raw(template, bindings))
    }

    fn compose(self, expr: Expr, disjunction: bool) -> Self {
        self.index.predicate = Some(match self.index.predicate.take() {
            None => expr,
            Some(existing) if disjunction => existing.or(expr),
            Some(existing) => existing.and(expr),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;

    #[test]
    fn test_columns_join_create_command() {
        let mut table = Blueprint::create("test_table");
        table.increments("id");
        table.string("name");

        assert_eq!(table.commands().len(), 1);
        let columns = table.commands()[0].columns();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].column_type, ColumnType::Increments);
        assert_eq!(columns[1].column_type, ColumnType::String { length: 255 });
    }

    #[test]
    fn test_columns_on_existing_table_go_first() {
        let mut table = Blueprint::table("test_table");
        table.gist("some_key");
        table.ts_range("some_key");

        assert!(matches!(table.commands()[0], Command::AddColumns(_)));
        assert!(matches!(table.commands()[1], Command::CreateIndex(_)));
    }

    #[test]
    fn test_table_options_promote_added_columns() {
        let mut table = Blueprint::new("test_table");
        table.string("name");
        table.gist("name");
        table.if_not_exists();

        assert_eq!(table.commands().len(), 2);
        let Command::CreateTable(create) = &table.commands()[0] else {
            panic!("Expected CreateTable, got {:?}", table.commands()[0]);
        };
        assert!(create.if_not_exists);
        assert_eq!(create.columns.len(), 1);
        assert_eq!(create.columns[0].name, "name");
        assert!(matches!(table.commands()[1], Command::CreateIndex(_)));
    }

    #[test]
    fn test_fluent_indexes_follow_explicit_commands() {
        let mut table = Blueprint::create("test_table");
        table.ts_range("code").gist();
        table.string("name").unique_named("name_key");
        table.index(&["name", "code"]);

        let resolved = table.resolved_commands();
        assert_eq!(resolved.len(), 4);
        match (&*resolved[2], &*resolved[3]) {
            (Command::CreateIndex(gist), Command::CreateIndex(unique)) => {
                assert_eq!(gist.method, IndexMethod::Gist);
                assert_eq!(gist.columns, vec!["code"]);
                assert!(unique.unique);
                assert_eq!(unique.name.as_deref(), Some("name_key"));
            }
            other => panic!("Expected two CreateIndex commands, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_unique_composes_left_to_right() {
        let mut table = Blueprint::create("test_table");
        table
            .unique_partial(&["name"])
            .where_null("deleted_at")
            .where_compare("phone", ComparisonOperator::Eq, 1234)
            .or_where(column("enabled").eq(true));

        let Command::CreateIndex(index) = &table.commands()[1] else {
            panic!("Expected CreateIndex");
        };
        assert!(index.unique);
        let expected = column("deleted_at")
            .is_null()
            .and(column("phone").eq(1234))
            .or(column("enabled").eq(true));
        assert_eq!(index.predicate, Some(expected));
    }

    #[test]
    fn test_like_and_if_not_exists() {
        let mut table = Blueprint::new("test_table2");
        table.like("test_table").including_all();
        table.if_not_exists();

        let Command::CreateTable(create) = &table.commands()[0] else {
            panic!("Expected CreateTable");
        };
        assert!(create.if_not_exists);
        assert_eq!(create.like.as_ref().unwrap().options, LikeOptions::IncludingAll);
        assert_eq!(table.commands().len(), 1);
    }

    #[test]
    fn test_trigger_builder() {
        let mut table = Blueprint::table("orders");
        table
            .create_trigger(
                "orders_audit",
                TriggerTiming::After,
                TriggerEvent::Insert,
                "audit_row",
            )
            .on(TriggerEvent::Delete)
            .execute_procedure("audit_row", ["orders"]);

        let Command::CreateTrigger(trigger) = &table.commands()[0] else {
            panic!("Expected CreateTrigger");
        };
        assert_eq!(trigger.table, "orders");
        assert_eq!(trigger.events, vec![TriggerEvent::Insert, TriggerEvent::Delete]);
        assert_eq!(trigger.routine, RoutineKind::Procedure);
        assert_eq!(trigger.arguments, vec![Literal::Text("orders".to_string())]);
    }

    #[test]
    fn test_blueprint_deserializes() {
        let json = r#"{
            "table": "test_table",
            "commands": [
                {"command": "create_table", "columns": [
                    {"name": "id", "type": {"type": "increments"}, "primary_key": true},
                    {"name": "code", "type": {"type": "ts_range"}, "index": {"method": "gist"}}
                ]},
                {"command": "detach_partition", "partition": "test_table_2024"}
            ]
        }"#;
        let blueprint: Blueprint = serde_json::from_str(json).unwrap();
        assert_eq!(blueprint.name(), "test_table");
        assert_eq!(blueprint.resolved_commands().len(), 3);
    }
}
