//! Statement compiler: turns a [`Blueprint`] into ordered DDL text.
//!
//! Compilation runs in two passes. The first validates every command and
//! fails with a [`ConfigurationError`] on the first structural problem;
//! the second renders statements into a local buffer. Nothing is handed
//! back unless both passes succeed for the whole blueprint.

use std::borrow::Cow;

use tracing::debug;

use crate::blueprint::{
    AddColumns, AttachPartition, Blueprint, ColumnDefinition, Command, CreateIndex, CreateTable,
    CreateTrigger, CreateView, DefaultValue, DropTable, DropView, IndexMethod, LikeClause,
    LikeOptions, PartitionBounds, RoutineKind, TriggerEvent, TriggerLevel,
};
use crate::dialect::{FormatLiteral, PostgresDialect, QuoteIdentifier};
use crate::error::{CompilationError, ConfigurationError, Result};
use crate::expr::Expr;
use crate::literal::Literal;
use crate::predicate::compile_predicate;

/// Compiles a blueprint with the PostgreSQL dialect.
///
/// # Errors
///
/// Returns a [`ConfigurationError`](crate::ConfigurationError) for a
/// structurally invalid blueprint, or a
/// [`CompilationError`](crate::CompilationError) when a predicate or
/// literal cannot be rendered.
pub fn compile_blueprint(blueprint: &Blueprint) -> Result<Vec<String>> {
    StatementCompiler::new(PostgresDialect::new()).compile(blueprint)
}

/// Compiles blueprints with an injected dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementCompiler<D = PostgresDialect> {
    dialect: D,
}

impl<D> StatementCompiler<D>
where
    D: QuoteIdentifier + FormatLiteral,
{
    /// Creates a compiler for `dialect`.
    #[must_use]
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Compiles every command of `blueprint`, in order.
    ///
    /// # Errors
    ///
    /// See [`compile_blueprint`].
    pub fn compile(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let table = blueprint.name();
        if table.is_empty() {
            return Err(ConfigurationError::EmptyIdentifier("table").into());
        }

        let commands = blueprint.resolved_commands();
        for command in &commands {
            validate(table, command)?;
        }

        let mut statements = Vec::new();
        for command in commands.iter().map(Cow::as_ref) {
            let start = statements.len();
            self.compile_command(table, command, &mut statements)?;
            for sql in &statements[start..] {
                debug!(table = %table, command = command.kind(), sql = %sql, "Compiled statement");
            }
        }
        Ok(statements)
    }

    fn compile_command(&self, table: &str, command: &Command, out: &mut Vec<String>) -> Result<()> {
        match command {
            Command::CreateTable(op) => {
                out.push(self.create_table(table, op)?);
                out.extend(self.column_comments(table, &op.columns)?);
            }
            Command::AddColumns(op) => {
                if let Some(sql) = self.add_columns(table, op)? {
                    out.push(sql);
                }
                out.extend(self.column_comments(table, &op.columns)?);
            }
            Command::DropTable(op) => out.push(self.drop_table(table, op)),
            Command::CreateIndex(op) => out.push(self.create_index(table, op)?),
            Command::DropIndex(op) => {
                out.push(format!("DROP INDEX {}", self.ident(&op.name)));
            }
            Command::DropUnique(op) => out.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                self.ident(table),
                self.ident(&op.name)
            )),
            Command::CreateView(op) => out.push(self.create_view(op)),
            Command::DropView(op) => out.push(self.drop_view(op)),
            Command::CreateTrigger(op) => out.push(self.create_trigger(op)?),
            Command::DropTrigger(op) => out.push(format!(
                "DROP TRIGGER {} ON {}",
                self.ident(&op.name),
                self.ident(table)
            )),
            Command::AttachPartition(op) => out.push(self.attach_partition(table, op)?),
            Command::DetachPartition(op) => out.push(format!(
                "ALTER TABLE {} DETACH PARTITION {}",
                self.ident(table),
                self.ident(&op.partition)
            )),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tables and columns
    // -------------------------------------------------------------------------

    fn create_table(&self, table: &str, op: &CreateTable) -> Result<String> {
        let mut sql = String::from("CREATE TABLE ");
        if op.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.ident(table));

        let mut elements = Vec::with_capacity(op.columns.len() + 1);
        if let Some(like) = &op.like {
            elements.push(self.like_clause(like));
        }
        for col in &op.columns {
            elements.push(self.column_definition(col)?);
        }

        sql.push_str(" (");
        sql.push_str(&elements.join(", "));
        sql.push(')');
        Ok(sql)
    }

    fn like_clause(&self, like: &LikeClause) -> String {
        let mut sql = format!("LIKE {}", self.ident(&like.source));
        match &like.options {
            LikeOptions::Plain => {}
            LikeOptions::IncludingAll => sql.push_str(" INCLUDING ALL"),
            LikeOptions::Selected(options) => {
                for option in options {
                    sql.push_str(if option.including {
                        " INCLUDING "
                    } else {
                        " EXCLUDING "
                    });
                    sql.push_str(option.feature.as_sql());
                }
            }
        }
        sql
    }

    fn add_columns(&self, table: &str, op: &AddColumns) -> Result<Option<String>> {
        if op.columns.is_empty() {
            return Ok(None);
        }
        let clauses = op
            .columns
            .iter()
            .map(|col| -> Result<String> {
                Ok(format!("ADD COLUMN {}", self.column_definition(col)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(format!(
            "ALTER TABLE {} {}",
            self.ident(table),
            clauses.join(", ")
        )))
    }

    fn column_definition(&self, col: &ColumnDefinition) -> Result<String> {
        let mut sql = format!("{} {}", self.ident(&col.name), col.column_type.to_sql());

        if col.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !col.nullable {
            sql.push_str(" NOT NULL");
        }

        match &col.default {
            Some(DefaultValue::Literal(value)) => {
                let node = format!("default of column '{}'", col.name);
                sql.push_str(" DEFAULT ");
                sql.push_str(&self.literal(value, &node)?);
            }
            Some(DefaultValue::Expression(expr)) => {
                sql.push_str(" DEFAULT ");
                sql.push_str(expr);
            }
            None => {}
        }

        Ok(sql)
    }

    fn column_comments(&self, table: &str, columns: &[ColumnDefinition]) -> Result<Vec<String>> {
        columns
            .iter()
            .filter_map(|col| col.comment.as_ref().map(|comment| (col, comment)))
            .map(|(col, comment)| -> Result<String> {
                let node = format!("comment on column '{}'", col.name);
                let text = self.literal(&Literal::Text(comment.clone()), &node)?;
                Ok(format!(
                    "COMMENT ON COLUMN {}.{} IS {text}",
                    self.ident(table),
                    self.ident(&col.name)
                ))
            })
            .collect()
    }

    fn drop_table(&self, table: &str, op: &DropTable) -> String {
        let mut sql = String::from("DROP TABLE ");
        if op.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.ident(table));
        sql
    }

    // -------------------------------------------------------------------------
    // Indexes
    // -------------------------------------------------------------------------

    fn create_index(&self, table: &str, op: &CreateIndex) -> Result<String> {
        let name = self.ident(&op.resolved_name(table));
        let columns = self.ident_list(&op.columns);

        if op.unique && op.predicate.is_none() {
            return Ok(format!(
                "ALTER TABLE {} ADD CONSTRAINT {name} UNIQUE ({columns})",
                self.ident(table)
            ));
        }

        let mut sql = String::from("CREATE ");
        if op.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str(&format!(
            "INDEX {name} ON {} USING {} ({columns})",
            self.ident(table),
            op.method.as_sql()
        ));

        if let Some(predicate) = &op.predicate {
            let predicate = compile_predicate(predicate, &self.dialect, &self.dialect)?;
            sql.push_str(&format!(" WHERE ({predicate})"));
        }

        Ok(sql)
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    fn create_view(&self, op: &CreateView) -> String {
        let kind = if op.materialize {
            "MATERIALIZED VIEW"
        } else {
            "VIEW"
        };
        format!("CREATE {kind} {} AS {}", self.ident(&op.name), op.select)
    }

    fn drop_view(&self, op: &DropView) -> String {
        let kind = if op.materialized {
            "MATERIALIZED VIEW"
        } else {
            "VIEW"
        };
        format!("DROP {kind} {}", self.ident(&op.name))
    }

    // -------------------------------------------------------------------------
    // Triggers
    // -------------------------------------------------------------------------

    fn create_trigger(&self, op: &CreateTrigger) -> Result<String> {
        let events = op
            .events
            .iter()
            .map(|event| self.trigger_event(event))
            .collect::<Vec<_>>()
            .join(" OR ");
        let level = match op.level {
            TriggerLevel::Row => "ROW",
            TriggerLevel::Statement => "STATEMENT",
        };
        let routine = match op.routine {
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Procedure => "PROCEDURE",
        };
        let node = format!("arguments of trigger '{}'", op.name);
        let arguments = self.literal_list(&op.arguments, &node)?;

        Ok(format!(
            "CREATE TRIGGER {} {} {events} ON {} FOR EACH {level} EXECUTE {routine} {}({arguments})",
            self.ident(&op.name),
            op.timing.as_sql(),
            self.ident(&op.table),
            self.ident(&op.function),
        ))
    }

    fn trigger_event(&self, event: &TriggerEvent) -> String {
        match event {
            TriggerEvent::Insert => String::from("INSERT"),
            TriggerEvent::Update => String::from("UPDATE"),
            TriggerEvent::UpdateOf(columns) => format!("UPDATE OF {}", self.ident_list(columns)),
            TriggerEvent::Delete => String::from("DELETE"),
            TriggerEvent::Truncate => String::from("TRUNCATE"),
        }
    }

    // -------------------------------------------------------------------------
    // Partitions
    // -------------------------------------------------------------------------

    fn attach_partition(&self, table: &str, op: &AttachPartition) -> Result<String> {
        let node = format!("bounds of partition '{}'", op.partition);
        let bounds = match &op.bounds {
            PartitionBounds::Range { from, to } => format!(
                "FOR VALUES FROM ({}) TO ({})",
                self.literal_list(from, &node)?,
                self.literal_list(to, &node)?
            ),
            PartitionBounds::List(values) => {
                format!("FOR VALUES IN ({})", self.literal_list(values, &node)?)
            }
            PartitionBounds::Hash { modulus, remainder } => {
                format!("FOR VALUES WITH (MODULUS {modulus}, REMAINDER {remainder})")
            }
            PartitionBounds::Default => String::from("DEFAULT"),
            PartitionBounds::Raw(clause) => clause.clone(),
        };
        Ok(format!(
            "ALTER TABLE {} ATTACH PARTITION {} {bounds}",
            self.ident(table),
            self.ident(&op.partition)
        ))
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn ident(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    fn ident_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.ident(name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn literal(
        &self,
        value: &Literal,
        node: &str,
    ) -> std::result::Result<String, CompilationError> {
        self.dialect
            .format_literal(value)
            .map_err(|e| CompilationError::UnsupportedLiteral {
                node: node.to_string(),
                reason: e.reason,
            })
    }

    fn literal_list(
        &self,
        values: &[Literal],
        node: &str,
    ) -> std::result::Result<String, CompilationError> {
        let items = values
            .iter()
            .map(|value| self.literal(value, node))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items.join(", "))
    }
}

/// Structural checks, run over every command before any text is built.
fn validate(table: &str, command: &Command) -> std::result::Result<(), ConfigurationError> {
    for col in command.columns() {
        if col.name.is_empty() {
            return Err(ConfigurationError::EmptyIdentifier("column"));
        }
    }

    match command {
        Command::CreateTable(op) => {
            if op.columns.is_empty() && op.like.is_none() {
                return Err(ConfigurationError::EmptyTable(table.to_string()));
            }
            if op.like.as_ref().is_some_and(|like| like.source.is_empty()) {
                return Err(ConfigurationError::EmptyIdentifier("LIKE source"));
            }
        }
        Command::CreateIndex(op) => {
            if let Some(name) = &op.name {
                require("index", name)?;
            }
            let name = op.resolved_name(table);
            if op.columns.is_empty() || op.columns.iter().any(String::is_empty) {
                return Err(ConfigurationError::EmptyIndexColumns {
                    table: table.to_string(),
                    index: name,
                });
            }
            if op.unique && op.method != IndexMethod::Btree {
                return Err(ConfigurationError::UniqueRequiresBtree {
                    index: name,
                    method: op.method.as_sql().to_string(),
                });
            }
            if op.predicate.is_some() && !op.unique {
                return Err(ConfigurationError::PredicateOnNonUniqueIndex(name));
            }
            if let Some(predicate) = &op.predicate {
                validate_predicate(predicate)?;
            }
        }
        Command::DropIndex(op) => require("index", &op.name)?,
        Command::DropUnique(op) => require("constraint", &op.name)?,
        Command::CreateView(op) => {
            require("view", &op.name)?;
            require("view query", &op.select)?;
        }
        Command::DropView(op) => require("view", &op.name)?,
        Command::CreateTrigger(op) => {
            require("trigger", &op.name)?;
            require("trigger table", &op.table)?;
            require("trigger function", &op.function)?;
            if op.events.is_empty() {
                return Err(ConfigurationError::EmptyTriggerEvents(op.name.clone()));
            }
            for event in &op.events {
                if let TriggerEvent::UpdateOf(columns) = event {
                    if columns.is_empty() || columns.iter().any(String::is_empty) {
                        return Err(ConfigurationError::EmptyUpdateColumns(op.name.clone()));
                    }
                }
            }
        }
        Command::DropTrigger(op) => require("trigger", &op.name)?,
        Command::AttachPartition(op) => require("partition", &op.partition)?,
        Command::DetachPartition(op) => require("partition", &op.partition)?,
        Command::AddColumns(_) | Command::DropTable(_) => {}
    }
    Ok(())
}

fn validate_predicate(expr: &Expr) -> std::result::Result<(), ConfigurationError> {
    match expr {
        Expr::Comparison { column, .. }
        | Expr::Between { column, .. }
        | Expr::SetMembership { column, .. }
        | Expr::NullCheck { column, .. } => require("predicate column", column),
        Expr::ColumnComparison { left, right, .. } => {
            require("predicate column", left)?;
            require("predicate column", right)
        }
        Expr::RawFragment { .. } => Ok(()),
        Expr::Conjunction { left, right } | Expr::Disjunction { left, right } => {
            validate_predicate(left)?;
            validate_predicate(right)
        }
    }
}

fn require(what: &'static str, value: &str) -> std::result::Result<(), ConfigurationError> {
    if value.is_empty() {
        return Err(ConfigurationError::EmptyIdentifier(what));
    }
    Ok(())
}
