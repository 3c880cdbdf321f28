//! Schema model: tables, columns and the foreign-key references between them.
//!
//! `Schema` is the single source of truth. It is changed through
//! [`SchemaCommand`]s; every successful command recomputes the derived
//! relationship set before returning, so readers never see a stale one.

use crate::relationship::{Relationship, derive_relationships};
use crate::types::ColumnType;
use crate::validate::{FkTypeError, validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Table name must not be empty")]
    EmptyTableName,
    #[error("Column name must not be empty")]
    EmptyColumnName,
    #[error("Table '{0}' already exists")]
    DuplicateTable(String),
    #[error("Column '{column}' already exists in table '{table}'")]
    DuplicateColumn { table: String, column: String },
    #[error("Table '{0}' not found")]
    TableNotFound(String),
    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },
    #[error("Column '{table}.{column}' is not a primary key")]
    NotPrimaryKey { table: String, column: String },
    #[error("Column '{table}.{column}' cannot reference itself")]
    SelfReference { table: String, column: String },
    #[error("Cannot create foreign key: {0}")]
    IncompatibleTypes(#[from] FkTypeError),
}

/// Opaque table identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub String);

impl TableId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque column identity, stable across renames. Never part of the DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub String);

impl ColumnId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Canvas position. Layout only, never part of the DDL.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Slot `index` of a four-wide grid.
    pub fn grid(index: usize) -> Self {
        Self {
            x: 100.0 + (index % 4) as f64 * 320.0,
            y: 100.0 + (index / 4) as f64 * 280.0,
        }
    }
}

/// Weak reference to a column of another table, resolved by name at use time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

impl ForeignKeyRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Identifier comparison. Unquoted SQL names are case-insensitive.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Columns compare by content; `id` is canvas identity only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ColumnRecord", into = "ColumnRecord")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub typ: ColumnType,
    /// Raw size specifier: `255`, or `10,2` for DECIMAL.
    pub size: Option<String>,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    pub auto_increment: bool,
    /// Raw SQL text, emitted verbatim.
    pub default_value: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.typ == other.typ
            && self.size == other.size
            && self.primary_key == other.primary_key
            && self.nullable == other.nullable
            && self.unique == other.unique
            && self.auto_increment == other.auto_increment
            && self.default_value == other.default_value
            && self.foreign_key == other.foreign_key
    }
}

impl Column {
    pub fn new(name: impl Into<String>, typ: impl Into<ColumnType>) -> Self {
        Self {
            id: ColumnId::generate(),
            name: name.into(),
            typ: typ.into(),
            size: None,
            primary_key: false,
            nullable: true,
            unique: false,
            auto_increment: false,
            default_value: None,
            foreign_key: None,
        }
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Marks the column as primary key, which also makes it NOT NULL and UNIQUE.
    pub fn primary_key(mut self) -> Self {
        self.mark_primary_key();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyRef::new(table, column));
        self
    }

    pub(crate) fn mark_primary_key(&mut self) {
        self.primary_key = true;
        self.nullable = false;
        self.unique = true;
    }

    /// `TYPE` or `TYPE(size)`.
    pub fn type_label(&self) -> String {
        match self.size.as_deref() {
            Some(size) if !size.is_empty() => format!("{}({})", self.typ, size),
            _ => self.typ.to_string(),
        }
    }

    fn references_column(&self, table: &str, column: &str) -> bool {
        self.foreign_key
            .as_ref()
            .is_some_and(|fk| names_match(&fk.table, table) && names_match(&fk.column, column))
    }
}

/// Wire shape of a column in project files.
///
/// Also reads the older table shape, where `foreignKey` is a `{table, column}`
/// object and nullability is stored as `notNull`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnRecord {
    #[serde(default)]
    id: Option<WireId>,
    name: String,
    #[serde(rename = "type", default)]
    typ: ColumnType,
    #[serde(default)]
    length: Option<String>,
    #[serde(default)]
    nullable: Option<bool>,
    #[serde(default, skip_serializing)]
    not_null: Option<bool>,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    foreign_key: Option<WireForeignKey>,
    #[serde(default)]
    referenced_table: Option<String>,
    #[serde(default)]
    referenced_field: Option<String>,
    #[serde(default)]
    default_value: Option<String>,
}

/// Column ids are strings here; older files use numbers.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireForeignKey {
    Flag(bool),
    Target { table: String, column: String },
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ColumnRecord> for Column {
    fn from(r: ColumnRecord) -> Self {
        let id = match r.id {
            Some(WireId::Text(id)) if !id.trim().is_empty() => ColumnId(id),
            Some(WireId::Number(n)) => ColumnId(n.to_string()),
            _ => ColumnId::generate(),
        };
        let foreign_key = match r.foreign_key {
            Some(WireForeignKey::Target { table, column }) => {
                match (non_empty(Some(table)), non_empty(Some(column))) {
                    (Some(table), Some(column)) => Some(ForeignKeyRef { table, column }),
                    _ => None,
                }
            }
            Some(WireForeignKey::Flag(true)) => {
                match (non_empty(r.referenced_table), non_empty(r.referenced_field)) {
                    (Some(table), Some(column)) => Some(ForeignKeyRef { table, column }),
                    _ => None,
                }
            }
            Some(WireForeignKey::Flag(false)) | None => None,
        };
        let nullable = match (r.nullable, r.not_null) {
            (Some(nullable), _) => nullable,
            (None, Some(not_null)) => !not_null,
            (None, None) => true,
        };
        Self {
            id,
            name: r.name,
            typ: r.typ,
            size: non_empty(r.length),
            primary_key: r.primary_key,
            nullable,
            unique: r.unique,
            auto_increment: r.auto_increment,
            default_value: non_empty(r.default_value),
            foreign_key,
        }
    }
}

impl From<Column> for ColumnRecord {
    fn from(c: Column) -> Self {
        let (referenced_table, referenced_field) = match &c.foreign_key {
            Some(fk) => (Some(fk.table.clone()), Some(fk.column.clone())),
            None => (None, None),
        };
        Self {
            id: Some(WireId::Text(c.id.0)),
            name: c.name,
            typ: c.typ,
            length: Some(c.size.unwrap_or_default()),
            nullable: Some(c.nullable),
            not_null: None,
            primary_key: c.primary_key,
            unique: c.unique,
            auto_increment: c.auto_increment,
            foreign_key: Some(WireForeignKey::Flag(c.foreign_key.is_some())),
            referenced_table,
            referenced_field,
            default_value: Some(c.default_value.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default = "TableId::generate")]
    pub id: TableId,
    #[serde(rename = "tableName", alias = "name")]
    pub name: String,
    #[serde(rename = "fields", alias = "columns", default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub position: Position,
}

impl Table {
    /// New table with a fresh id at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TableId::generate(),
            name: name.into(),
            columns: Vec::new(),
            comment: None,
            position: Position::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = TableId(id.into());
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| names_match(&c.name, name))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| names_match(&c.name, name))
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn has_foreign_keys(&self) -> bool {
        self.columns.iter().any(|c| c.foreign_key.is_some())
    }

    /// Columns carrying a reference, in declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Column, &ForeignKeyRef)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| (c, fk)))
    }

    /// Make `name` the only primary key of the table. Returns false when the
    /// column does not exist.
    pub fn set_primary_key(&mut self, name: &str) -> bool {
        let Some(index) = self.columns.iter().position(|c| names_match(&c.name, name)) else {
            return false;
        };
        for (i, column) in self.columns.iter_mut().enumerate() {
            if i == index {
                column.mark_primary_key();
            } else {
                column.primary_key = false;
            }
        }
        true
    }
}

/// Why a foreign-key reference no longer holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    MissingTable,
    MissingColumn,
    NotPrimaryKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleReference {
    pub table: String,
    pub column: String,
    pub reference: ForeignKeyRef,
    pub reason: StaleReason,
}

impl fmt::Display for StaleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            StaleReason::MissingTable => "table does not exist",
            StaleReason::MissingColumn => "column does not exist",
            StaleReason::NotPrimaryKey => "column is no longer a primary key",
        };
        write!(
            f,
            "{}.{} -> {}.{}: {}",
            self.table, self.column, self.reference.table, self.reference.column, reason
        )
    }
}

/// A single mutation of the schema, as issued by a host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SchemaCommand {
    AddTable {
        name: String,
    },
    RenameTable {
        table: TableId,
        name: String,
    },
    DeleteTable {
        table: TableId,
    },
    MoveTable {
        table: TableId,
        position: Position,
    },
    SetComment {
        table: TableId,
        comment: Option<String>,
    },
    AddColumn {
        table: TableId,
        column: Column,
    },
    UpdateColumn {
        table: TableId,
        column: String,
        replacement: Column,
    },
    RemoveColumn {
        table: TableId,
        column: String,
    },
    SetPrimaryKey {
        table: TableId,
        column: String,
    },
    /// Reference chosen from a column's property form.
    SetForeignKey {
        table: TableId,
        column: String,
        target_table: TableId,
        target_column: String,
    },
    /// Reference drawn as a connection between two columns on the canvas.
    Connect {
        table: TableId,
        column: String,
        target_table: TableId,
        target_column: String,
    },
    ClearForeignKey {
        table: TableId,
        column: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: Vec<Table>,
    relationships: Vec<Relationship>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: Vec<Table>) -> Self {
        let relationships = derive_relationships(&tables);
        Self {
            tables,
            relationships,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }

    pub fn table(&self, id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|t| &t.id == id)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| names_match(&t.name, name))
    }

    /// Apply a command to a copy of this schema and return the copy.
    pub fn apply(&self, command: SchemaCommand) -> Result<Schema, SchemaError> {
        let mut next = self.clone();
        next.run(command)?;
        next.relationships = derive_relationships(&next.tables);
        Ok(next)
    }

    /// Apply a command in place. On error the schema is left untouched.
    pub fn execute(&mut self, command: SchemaCommand) -> Result<(), SchemaError> {
        *self = self.apply(command)?;
        Ok(())
    }

    pub fn add_table(&mut self, name: &str) -> Result<TableId, SchemaError> {
        self.execute(SchemaCommand::AddTable {
            name: name.to_string(),
        })?;
        self.tables
            .last()
            .map(|t| t.id.clone())
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))
    }

    pub fn rename_table(&mut self, table: &TableId, name: &str) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::RenameTable {
            table: table.clone(),
            name: name.to_string(),
        })
    }

    pub fn delete_table(&mut self, table: &TableId) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::DeleteTable {
            table: table.clone(),
        })
    }

    pub fn add_column(&mut self, table: &TableId, column: Column) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::AddColumn {
            table: table.clone(),
            column,
        })
    }

    pub fn update_column(
        &mut self,
        table: &TableId,
        column: &str,
        replacement: Column,
    ) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::UpdateColumn {
            table: table.clone(),
            column: column.to_string(),
            replacement,
        })
    }

    pub fn remove_column(&mut self, table: &TableId, column: &str) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::RemoveColumn {
            table: table.clone(),
            column: column.to_string(),
        })
    }

    pub fn set_primary_key(&mut self, table: &TableId, column: &str) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::SetPrimaryKey {
            table: table.clone(),
            column: column.to_string(),
        })
    }

    pub fn set_foreign_key(
        &mut self,
        table: &TableId,
        column: &str,
        target_table: &TableId,
        target_column: &str,
    ) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::SetForeignKey {
            table: table.clone(),
            column: column.to_string(),
            target_table: target_table.clone(),
            target_column: target_column.to_string(),
        })
    }

    pub fn clear_foreign_key(&mut self, table: &TableId, column: &str) -> Result<(), SchemaError> {
        self.execute(SchemaCommand::ClearForeignKey {
            table: table.clone(),
            column: column.to_string(),
        })
    }

    /// References whose target is gone or no longer a primary key.
    /// These are never cleaned up automatically.
    pub fn stale_foreign_keys(&self) -> Vec<StaleReference> {
        let mut stale = Vec::new();
        for table in &self.tables {
            for (column, fk) in table.foreign_keys() {
                let reason = match self.table_by_name(&fk.table) {
                    None => Some(StaleReason::MissingTable),
                    Some(target) => match target.column(&fk.column) {
                        None => Some(StaleReason::MissingColumn),
                        Some(c) if !c.primary_key => Some(StaleReason::NotPrimaryKey),
                        Some(_) => None,
                    },
                };
                if let Some(reason) = reason {
                    stale.push(StaleReference {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        reference: fk.clone(),
                        reason,
                    });
                }
            }
        }
        stale
    }

    fn run(&mut self, command: SchemaCommand) -> Result<(), SchemaError> {
        match command {
            SchemaCommand::AddTable { name } => {
                let name = self.check_table_name(&name, None)?;
                let mut table = Table::new(name);
                table.position = Position::grid(self.tables.len());
                self.tables.push(table);
            }
            SchemaCommand::RenameTable { table, name } => {
                let name = self.check_table_name(&name, Some(&table))?;
                let index = self.table_index(&table)?;
                let old = self.tables[index].name.clone();

                // Dangling references that the new name brings back to life
                let (new_name, old_name) = (name.as_str(), old.as_str());
                let revived: Vec<(usize, usize)> = self
                    .tables
                    .iter()
                    .enumerate()
                    .flat_map(|(ti, t)| {
                        t.columns.iter().enumerate().filter_map(move |(ci, c)| {
                            let fk = c.foreign_key.as_ref()?;
                            (names_match(&fk.table, new_name) && !names_match(&fk.table, old_name))
                                .then_some((ti, ci))
                        })
                    })
                    .collect();

                self.tables[index].name = name.clone();
                for t in &mut self.tables {
                    for c in &mut t.columns {
                        if let Some(fk) = c.foreign_key.as_mut() {
                            if names_match(&fk.table, &old) {
                                fk.table = name.clone();
                            }
                        }
                    }
                }

                for (ti, ci) in revived {
                    let column = &self.tables[ti].columns[ci];
                    let Some(fk) = column.foreign_key.as_ref() else {
                        continue;
                    };
                    if let Err(err) = self.check_reference(ti, column, fk) {
                        tracing::debug!(
                            table = %self.tables[ti].name,
                            column = %column.name,
                            %err,
                            "clearing reference revived by rename"
                        );
                        self.tables[ti].columns[ci].foreign_key = None;
                    }
                }
            }
            SchemaCommand::DeleteTable { table } => {
                let index = self.table_index(&table)?;
                let removed = self.tables.remove(index);
                for t in &mut self.tables {
                    for c in &mut t.columns {
                        let dangling = c
                            .foreign_key
                            .as_ref()
                            .is_some_and(|fk| names_match(&fk.table, &removed.name));
                        if dangling {
                            c.foreign_key = None;
                        }
                    }
                }
            }
            SchemaCommand::MoveTable { table, position } => {
                let index = self.table_index(&table)?;
                self.tables[index].position = position;
            }
            SchemaCommand::SetComment { table, comment } => {
                let index = self.table_index(&table)?;
                self.tables[index].comment = comment.filter(|c| !c.trim().is_empty());
            }
            SchemaCommand::AddColumn { table, column } => {
                let index = self.table_index(&table)?;
                let mut column = column;
                column.name = column.name.trim().to_string();
                if column.name.is_empty() {
                    return Err(SchemaError::EmptyColumnName);
                }
                let owner = &self.tables[index];
                if owner.column(&column.name).is_some() {
                    return Err(SchemaError::DuplicateColumn {
                        table: owner.name.clone(),
                        column: column.name,
                    });
                }
                if let Some(fk) = &column.foreign_key {
                    self.check_reference(index, &column, fk)?;
                }
                let owner = &mut self.tables[index];
                if column.primary_key {
                    for other in &mut owner.columns {
                        other.primary_key = false;
                    }
                    column.mark_primary_key();
                }
                owner.columns.push(column);
            }
            SchemaCommand::UpdateColumn {
                table,
                column,
                replacement,
            } => {
                let index = self.table_index(&table)?;
                let position = self.column_index(index, &column)?;
                let mut replacement = replacement;
                replacement.name = replacement.name.trim().to_string();
                if replacement.name.is_empty() {
                    return Err(SchemaError::EmptyColumnName);
                }
                let owner = &self.tables[index];
                let current = &owner.columns[position];
                let renamed = !names_match(&current.name, &replacement.name);
                if renamed && owner.column(&replacement.name).is_some() {
                    return Err(SchemaError::DuplicateColumn {
                        table: owner.name.clone(),
                        column: replacement.name,
                    });
                }
                let reference_changed = replacement.foreign_key != current.foreign_key
                    || (replacement.foreign_key.is_some()
                        && (replacement.typ != current.typ || replacement.size != current.size));
                if reference_changed {
                    if let Some(fk) = &replacement.foreign_key {
                        self.check_reference(index, &replacement, fk)?;
                    }
                }
                replacement.id = current.id.clone();
                let newly_primary = replacement.primary_key && !current.primary_key;
                let old_name = current.name.clone();
                let table_name = owner.name.clone();

                let owner = &mut self.tables[index];
                if newly_primary {
                    for other in &mut owner.columns {
                        other.primary_key = false;
                    }
                    replacement.mark_primary_key();
                }
                let new_name = replacement.name.clone();
                owner.columns[position] = replacement;

                if renamed {
                    for t in &mut self.tables {
                        for c in &mut t.columns {
                            if c.references_column(&table_name, &old_name) {
                                if let Some(fk) = c.foreign_key.as_mut() {
                                    fk.column = new_name.clone();
                                }
                            }
                        }
                    }
                }
            }
            SchemaCommand::RemoveColumn { table, column } => {
                let index = self.table_index(&table)?;
                let position = self.column_index(index, &column)?;
                let removed = self.tables[index].columns.remove(position);
                let table_name = self.tables[index].name.clone();
                for t in &mut self.tables {
                    for c in &mut t.columns {
                        if c.references_column(&table_name, &removed.name) {
                            c.foreign_key = None;
                        }
                    }
                }
            }
            SchemaCommand::SetPrimaryKey { table, column } => {
                let index = self.table_index(&table)?;
                self.column_index(index, &column)?;
                self.tables[index].set_primary_key(&column);
            }
            SchemaCommand::SetForeignKey {
                table,
                column,
                target_table,
                target_column,
            }
            | SchemaCommand::Connect {
                table,
                column,
                target_table,
                target_column,
            } => {
                let index = self.table_index(&table)?;
                let position = self.column_index(index, &column)?;
                let target_index = self.table_index(&target_table)?;
                let target = &self.tables[target_index];
                let reference = match target.column(&target_column) {
                    Some(c) => ForeignKeyRef::new(&target.name, &c.name),
                    None => {
                        return Err(SchemaError::ColumnNotFound {
                            table: target.name.clone(),
                            column: target_column,
                        });
                    }
                };
                let source = &self.tables[index].columns[position];
                self.check_reference(index, source, &reference)?;
                self.tables[index].columns[position].foreign_key = Some(reference);
            }
            SchemaCommand::ClearForeignKey { table, column } => {
                let index = self.table_index(&table)?;
                let position = self.column_index(index, &column)?;
                self.tables[index].columns[position].foreign_key = None;
            }
        }
        Ok(())
    }

    fn table_index(&self, id: &TableId) -> Result<usize, SchemaError> {
        self.tables
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| SchemaError::TableNotFound(id.to_string()))
    }

    fn column_index(&self, table: usize, column: &str) -> Result<usize, SchemaError> {
        let t = &self.tables[table];
        t.columns
            .iter()
            .position(|c| names_match(&c.name, column))
            .ok_or_else(|| SchemaError::ColumnNotFound {
                table: t.name.clone(),
                column: column.to_string(),
            })
    }

    fn check_table_name(
        &self,
        name: &str,
        renaming: Option<&TableId>,
    ) -> Result<String, SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyTableName);
        }
        let taken = self
            .tables
            .iter()
            .any(|t| names_match(&t.name, name) && Some(&t.id) != renaming);
        if taken {
            return Err(SchemaError::DuplicateTable(name.to_string()));
        }
        Ok(name.to_string())
    }

    /// Gate shared by every path that creates or alters a reference.
    fn check_reference(
        &self,
        owner: usize,
        source: &Column,
        reference: &ForeignKeyRef,
    ) -> Result<(), SchemaError> {
        let target = self
            .table_by_name(&reference.table)
            .ok_or_else(|| SchemaError::TableNotFound(reference.table.clone()))?;
        let target_column =
            target
                .column(&reference.column)
                .ok_or_else(|| SchemaError::ColumnNotFound {
                    table: target.name.clone(),
                    column: reference.column.clone(),
                })?;
        let owner_name = &self.tables[owner].name;
        if names_match(&target.name, owner_name) && names_match(&target_column.name, &source.name) {
            return Err(SchemaError::SelfReference {
                table: owner_name.clone(),
                column: source.name.clone(),
            });
        }
        if !target_column.primary_key {
            return Err(SchemaError::NotPrimaryKey {
                table: target.name.clone(),
                column: target_column.name.clone(),
            });
        }
        validate(source, target_column)?;
        Ok(())
    }
}
