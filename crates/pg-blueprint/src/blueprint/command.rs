//! Commands attached to a blueprint.
//!
//! Each variant carries only the fields relevant to its kind, so the
//! statement compiler can dispatch exhaustively.

use serde::{Deserialize, Serialize};

use super::column::ColumnDefinition;
use crate::error::ConfigurationError;
use crate::expr::Expr;
use crate::literal::{Literal, ToLiteral, literals};

/// One schema change operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Create the blueprint's table.
    CreateTable(CreateTable),
    /// Add columns to an existing table.
    AddColumns(AddColumns),
    /// Drop the blueprint's table.
    DropTable(DropTable),
    /// Create an index or unique constraint.
    CreateIndex(CreateIndex),
    /// Drop an index.
    DropIndex(DropIndex),
    /// Drop a unique constraint.
    DropUnique(DropUnique),
    /// Create a view.
    CreateView(CreateView),
    /// Drop a view.
    DropView(DropView),
    /// Create a trigger.
    CreateTrigger(CreateTrigger),
    /// Drop a trigger.
    DropTrigger(DropTrigger),
    /// Attach a partition to the blueprint's table.
    AttachPartition(AttachPartition),
    /// Detach a partition from the blueprint's table.
    DetachPartition(DetachPartition),
}

impl Command {
    /// Returns the command kind, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "create_table",
            Self::AddColumns(_) => "add_columns",
            Self::DropTable(_) => "drop_table",
            Self::CreateIndex(_) => "create_index",
            Self::DropIndex(_) => "drop_index",
            Self::DropUnique(_) => "drop_unique",
            Self::CreateView(_) => "create_view",
            Self::DropView(_) => "drop_view",
            Self::CreateTrigger(_) => "create_trigger",
            Self::DropTrigger(_) => "drop_trigger",
            Self::AttachPartition(_) => "attach_partition",
            Self::DetachPartition(_) => "detach_partition",
        }
    }

    /// Columns created by this command, if it creates any.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        match self {
            Self::CreateTable(op) => &op.columns,
            Self::AddColumns(op) => &op.columns,
            _ => &[],
        }
    }
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateTable {
    /// Column definitions.
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    /// Whether to use IF NOT EXISTS.
    #[serde(default)]
    pub if_not_exists: bool,
    /// Copy the structure of another table.
    #[serde(default)]
    pub like: Option<LikeClause>,
}

/// `LIKE source [options]` inside a CREATE TABLE column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeClause {
    /// Table to copy.
    pub source: String,
    /// What to copy besides column names and types.
    #[serde(default)]
    pub options: LikeOptions,
}

impl LikeClause {
    /// Creates a plain LIKE clause.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            options: LikeOptions::Plain,
        }
    }

    /// Copies everything (`INCLUDING ALL`).
    pub fn including_all(&mut self) -> &mut Self {
        self.options = LikeOptions::IncludingAll;
        self
    }

    /// Adds `INCLUDING <feature>`.
    pub fn including(&mut self, feature: LikeFeature) -> &mut Self {
        self.select(LikeOption {
            including: true,
            feature,
        })
    }

    /// Adds `EXCLUDING <feature>`.
    pub fn excluding(&mut self, feature: LikeFeature) -> &mut Self {
        self.select(LikeOption {
            including: false,
            feature,
        })
    }

    fn select(&mut self, option: LikeOption) -> &mut Self {
        match &mut self.options {
            LikeOptions::Selected(options) => options.push(option),
            other => *other = LikeOptions::Selected(vec![option]),
        }
        self
    }
}

/// Options of a LIKE clause.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeOptions {
    /// Column names, types and NOT NULL only.
    #[default]
    Plain,
    /// `INCLUDING ALL`
    IncludingAll,
    /// Explicit list of INCLUDING/EXCLUDING clauses, in order.
    Selected(Vec<LikeOption>),
}

/// One `INCLUDING|EXCLUDING <feature>` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOption {
    /// INCLUDING when true, EXCLUDING otherwise.
    pub including: bool,
    /// Copied feature.
    pub feature: LikeFeature,
}

/// Table features a LIKE clause can copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeFeature {
    /// Column and constraint comments.
    Comments,
    /// Column compression methods.
    Compression,
    /// CHECK constraints.
    Constraints,
    /// Column defaults.
    Defaults,
    /// Generated column expressions.
    Generated,
    /// Identity specifications.
    Identity,
    /// Indexes, primary keys and unique constraints.
    Indexes,
    /// Extended statistics.
    Statistics,
    /// Storage settings.
    Storage,
}

impl LikeFeature {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Comments => "COMMENTS",
            Self::Compression => "COMPRESSION",
            Self::Constraints => "CONSTRAINTS",
            Self::Defaults => "DEFAULTS",
            Self::Generated => "GENERATED",
            Self::Identity => "IDENTITY",
            Self::Indexes => "INDEXES",
            Self::Statistics => "STATISTICS",
            Self::Storage => "STORAGE",
        }
    }
}

/// Add columns to an existing table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddColumns {
    /// Columns to add.
    pub columns: Vec<ColumnDefinition>,
}

/// Drop table operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropTable {
    /// Whether to use IF EXISTS.
    #[serde(default)]
    pub if_exists: bool,
}

/// Index access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMethod {
    /// B-tree (default).
    #[default]
    Btree,
    /// Hash.
    Hash,
    /// GiST.
    Gist,
    /// SP-GiST.
    Spgist,
    /// GIN.
    Gin,
    /// BRIN.
    Brin,
}

impl IndexMethod {
    /// Returns the method name as written after USING.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Btree => "btree",
            Self::Hash => "hash",
            Self::Gist => "gist",
            Self::Spgist => "spgist",
            Self::Gin => "gin",
            Self::Brin => "brin",
        }
    }
}

/// Create index operation.
///
/// A unique index without a predicate compiles to a unique constraint;
/// with a predicate it becomes a partial unique index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateIndex {
    /// Index name; derived from the table and columns when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Access method.
    #[serde(default)]
    pub method: IndexMethod,
    /// Whether the index is unique.
    #[serde(default)]
    pub unique: bool,
    /// Partial index predicate.
    #[serde(default)]
    pub predicate: Option<Expr>,
}

impl CreateIndex {
    /// Creates a plain btree index over `columns`.
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|&c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Sets the access method.
    pub fn using(&mut self, method: IndexMethod) -> &mut Self {
        self.method = method;
        self
    }

    /// Sets an explicit name.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches the partial predicate.
    ///
    /// # Errors
    ///
    /// Fails if the index is not unique or already has a predicate.
    pub fn attach_predicate(&mut self, predicate: Expr) -> Result<&mut Self, ConfigurationError> {
        if !self.unique {
            return Err(ConfigurationError::PredicateOnNonUniqueIndex(self.label()));
        }
        if self.predicate.is_some() {
            return Err(ConfigurationError::PredicateAlreadyAttached(self.label()));
        }
        self.predicate = Some(predicate);
        Ok(self)
    }

    /// Returns the explicit name, or the conventional
    /// `<table>_<columns>_<suffix>` name.
    #[must_use]
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => index_name(table, &self.columns, self.suffix()),
        }
    }

    fn suffix(&self) -> &'static str {
        match (self.unique, self.method) {
            (true, _) => "unique",
            (false, IndexMethod::Btree) => "index",
            (false, method) => method.as_sql(),
        }
    }

    fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("({})", self.columns.join(", ")),
        }
    }
}

/// Builds a conventional index name: lowercased, with `-` and `.`
/// replaced by `_`.
#[must_use]
pub fn index_name(table: &str, columns: &[String], suffix: &str) -> String {
    format!("{table}_{}_{suffix}", columns.join("_"))
        .to_lowercase()
        .replace(['-', '.'], "_")
}

/// Drop index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndex {
    /// Index name.
    pub name: String,
}

/// Drop unique constraint operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropUnique {
    /// Constraint name.
    pub name: String,
}

/// Create view operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateView {
    /// View name.
    pub name: String,
    /// SELECT statement text, emitted verbatim.
    pub select: String,
    /// Whether to create a materialized view.
    #[serde(default)]
    pub materialize: bool,
}

/// Drop view operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropView {
    /// View name.
    pub name: String,
    /// Whether the view is materialized.
    #[serde(default)]
    pub materialized: bool,
}

/// When a trigger fires relative to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    /// BEFORE
    Before,
    /// AFTER
    After,
    /// INSTEAD OF (views only)
    InsteadOf,
}

impl TriggerTiming {
    /// Returns the SQL keyword(s).
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::InsteadOf => "INSTEAD OF",
        }
    }
}

/// Event that fires a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// INSERT
    Insert,
    /// UPDATE on any column.
    Update,
    /// UPDATE OF the listed columns.
    UpdateOf(Vec<String>),
    /// DELETE
    Delete,
    /// TRUNCATE
    Truncate,
}

/// Whether a trigger fires per row or per statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerLevel {
    /// FOR EACH ROW
    #[default]
    Row,
    /// FOR EACH STATEMENT
    Statement,
}

/// What a trigger executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    /// EXECUTE FUNCTION
    #[default]
    Function,
    /// EXECUTE PROCEDURE
    Procedure,
}

/// Create trigger operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrigger {
    /// Trigger name.
    pub name: String,
    /// BEFORE / AFTER / INSTEAD OF.
    pub timing: TriggerTiming,
    /// Firing events, joined with OR.
    pub events: Vec<TriggerEvent>,
    /// Table the trigger is attached to.
    pub table: String,
    /// Row or statement level.
    #[serde(default)]
    pub level: TriggerLevel,
    /// Function or procedure.
    #[serde(default)]
    pub routine: RoutineKind,
    /// Routine name.
    pub function: String,
    /// Literal arguments passed to the routine.
    #[serde(default)]
    pub arguments: Vec<Literal>,
}

impl CreateTrigger {
    /// Adds a firing event.
    pub fn on(&mut self, event: TriggerEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Fires once per statement instead of once per row.
    pub fn for_each_statement(&mut self) -> &mut Self {
        self.level = TriggerLevel::Statement;
        self
    }

    /// Executes `name` as a function with the given arguments.
    pub fn execute_function<T: ToLiteral>(
        &mut self,
        name: impl Into<String>,
        arguments: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.routine = RoutineKind::Function;
        self.function = name.into();
        self.arguments = literals(arguments);
        self
    }

    /// Executes `name` as a procedure with the given arguments.
    pub fn execute_procedure<T: ToLiteral>(
        &mut self,
        name: impl Into<String>,
        arguments: impl IntoIterator<Item = T>,
    ) -> &mut Self {
        self.routine = RoutineKind::Procedure;
        self.function = name.into();
        self.arguments = literals(arguments);
        self
    }
}

/// Drop trigger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTrigger {
    /// Trigger name.
    pub name: String,
}

/// Partition bound specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionBounds {
    /// `FOR VALUES FROM (..) TO (..)`
    Range {
        /// Inclusive lower bound, one value per partition key column.
        from: Vec<Literal>,
        /// Exclusive upper bound.
        to: Vec<Literal>,
    },
    /// `FOR VALUES IN (..)`
    List(Vec<Literal>),
    /// `FOR VALUES WITH (MODULUS m, REMAINDER r)`
    Hash {
        /// Modulus.
        modulus: u32,
        /// Remainder.
        remainder: u32,
    },
    /// `DEFAULT`
    Default,
    /// Bounds clause emitted verbatim.
    Raw(String),
}

impl PartitionBounds {
    /// Single-column range bounds.
    #[must_use]
    pub fn range<T: ToLiteral, U: ToLiteral>(from: T, to: U) -> Self {
        Self::Range {
            from: vec![from.to_literal()],
            to: vec![to.to_literal()],
        }
    }

    /// List bounds.
    #[must_use]
    pub fn list<T: ToLiteral>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(literals(values))
    }
}

/// Attach partition operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachPartition {
    /// Partition table name.
    pub partition: String,
    /// Bounds of the partition.
    pub bounds: PartitionBounds,
}

/// Detach partition operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachPartition {
    /// Partition table name.
    pub partition: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::column;

    #[test]
    fn test_index_name_derivation() {
        let index = CreateIndex {
            method: IndexMethod::Gist,
            ..CreateIndex::new(&["code"])
        };
        assert_eq!(index.resolved_name("test_table"), "test_table_code_gist");

        let index = CreateIndex::new(&["some-id"]);
        assert_eq!(index.resolved_name("public.Test"), "public_test_some_id_index");

        let mut index = CreateIndex::new(&["name"]);
        index.unique = true;
        assert_eq!(index.resolved_name("test_table"), "test_table_name_unique");

        index.named("specify_index_name");
        assert_eq!(index.resolved_name("test_table"), "specify_index_name");
    }

    #[test]
    fn test_attach_predicate_once() {
        let mut index = CreateIndex::new(&["name"]);
        index.unique = true;
        index.attach_predicate(column("deleted_at").is_null()).unwrap();

        let err = index
            .attach_predicate(column("phone").eq(1))
            .unwrap_err();
        assert_eq!(err, ConfigurationError::PredicateAlreadyAttached("(name)".to_string()));
    }

    #[test]
    fn test_attach_predicate_requires_unique() {
        let mut index = CreateIndex::new(&["name"]);
        index.named("name_idx");
        let err = index
            .attach_predicate(column("deleted_at").is_null())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::PredicateOnNonUniqueIndex("name_idx".to_string())
        );
        assert!(index.predicate.is_none());
    }

    #[test]
    fn test_like_options_accumulate() {
        let mut like = LikeClause::new("test_table");
        like.including(LikeFeature::Defaults)
            .excluding(LikeFeature::Indexes);
        assert_eq!(
            like.options,
            LikeOptions::Selected(vec![
                LikeOption {
                    including: true,
                    feature: LikeFeature::Defaults
                },
                LikeOption {
                    including: false,
                    feature: LikeFeature::Indexes
                },
            ])
        );
        like.including_all();
        assert_eq!(like.options, LikeOptions::IncludingAll);
    }

    #[test]
    fn test_command_serde_tag() {
        let json = r#"{"command":"create_index","columns":["code"],"method":"gist"}"#;
        let command: Command = serde_json::from_str(json).unwrap();
        match command {
            Command::CreateIndex(index) => {
                assert_eq!(index.method, IndexMethod::Gist);
                assert!(index.name.is_none());
                assert!(!index.unique);
            }
            other => panic!("Expected CreateIndex, got {other:?}"),
        }
    }
}
