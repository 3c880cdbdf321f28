//! Persisted project files (`.sf` / `.json`).
//!
//! A project stores the tables twice, once as canvas nodes and once keyed by
//! table id, plus the edges the canvas drew. Only the tables are read back:
//! edges are rebuilt from the foreign keys on every load.

use crate::relationship::Relationship;
use crate::schema::{Position, Schema, Table, TableId, names_match};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FORMAT_VERSION: &str = "1.0";
pub const NODE_TYPE: &str = "tableNode";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported project file {}: expected .sf or .json", .0.display())]
    UnsupportedExtension(PathBuf),
}

/// A table placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: TableId,
    #[serde(rename = "type", default = "node_type")]
    pub kind: String,
    #[serde(default)]
    pub position: Position,
    pub data: Table,
}

/// A relationship as drawn between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: TableId,
    pub target: TableId,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(flatten)]
    pub relationship: Relationship,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, skip_deserializing)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub schema: BTreeMap<String, Table>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "format_version")]
    pub version: String,
}

fn node_type() -> String {
    NODE_TYPE.to_string()
}

fn format_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Project {
    /// Snapshot `schema` under `name`, stamped with the current time.
    pub fn from_schema(name: impl Into<String>, schema: &Schema) -> Self {
        let nodes = schema
            .tables()
            .iter()
            .map(|table| Node {
                id: table.id.clone(),
                kind: node_type(),
                position: table.position,
                data: table.clone(),
            })
            .collect();

        let by_id = schema
            .tables()
            .iter()
            .map(|table| (table.id.to_string(), table.clone()))
            .collect();

        Self {
            project_name: name.into(),
            nodes,
            edges: edges(schema),
            schema: by_id,
            timestamp: Utc::now(),
            version: format_version(),
        }
    }

    /// Rebuild the schema: nodes when present, otherwise the id-keyed map.
    pub fn to_schema(&self) -> Schema {
        let tables: Vec<Table> = if self.nodes.is_empty() {
            self.schema.values().cloned().collect()
        } else {
            self.nodes
                .iter()
                .map(|node| {
                    let mut table = node.data.clone();
                    table.id = node.id.clone();
                    table.position = node.position;
                    table
                })
                .collect()
        };
        Schema::from_tables(resolve_id_references(tables))
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let mut project: Project = serde_json::from_str(json)?;
        if project.version != FORMAT_VERSION {
            tracing::warn!(
                version = %project.version,
                "reading project written by another format version"
            );
        }
        project.edges = edges(&project.to_schema());
        Ok(project)
    }

    pub fn to_json_pretty(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        check_extension(path)?;
        let json = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let project = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), name = %project.project_name, "loaded project");
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        check_extension(path)?;
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Whether `path` carries a project file extension.
pub fn is_project_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sf") || e.eq_ignore_ascii_case("json"))
}

fn check_extension(path: &Path) -> Result<(), ProjectError> {
    if is_project_file(path) {
        Ok(())
    } else {
        Err(ProjectError::UnsupportedExtension(path.to_path_buf()))
    }
}

/// Older files point references at a node id and a column id instead of
/// names. Names win when both could apply.
fn resolve_id_references(mut tables: Vec<Table>) -> Vec<Table> {
    let targets: Vec<(TableId, String, Vec<(String, String)>)> = tables
        .iter()
        .map(|t| {
            let columns = t
                .columns
                .iter()
                .map(|c| (c.id.to_string(), c.name.clone()))
                .collect();
            (t.id.clone(), t.name.clone(), columns)
        })
        .collect();

    for table in &mut tables {
        for column in &mut table.columns {
            let Some(fk) = column.foreign_key.as_mut() else {
                continue;
            };
            let target = targets
                .iter()
                .find(|(_, name, _)| names_match(name, &fk.table))
                .or_else(|| targets.iter().find(|(id, _, _)| id.as_str() == fk.table));
            let Some((_, target_name, target_columns)) = target else {
                continue;
            };
            if !names_match(&fk.table, target_name) {
                tracing::debug!(id = %fk.table, table = %target_name, "resolved table id");
                fk.table = target_name.clone();
            }
            let by_name = target_columns.iter().any(|(_, name)| names_match(name, &fk.column));
            if !by_name {
                if let Some((_, name)) = target_columns.iter().find(|(id, _)| *id == fk.column) {
                    tracing::debug!(id = %fk.column, column = %name, "resolved column id");
                    fk.column = name.clone();
                }
            }
        }
    }
    tables
}

fn edges(schema: &Schema) -> Vec<Edge> {
    schema
        .relationships()
        .iter()
        .filter_map(|rel| {
            let source = schema.table_by_name(&rel.source_table)?;
            let target = schema.table_by_name(&rel.target_table)?;
            Some(Edge {
                id: format!("rel-{}-{}", source.id, rel.source_column),
                source: source.id.clone(),
                target: target.id.clone(),
                source_handle: format!("{}-source", rel.source_column),
                target_handle: format!("{}-target", rel.target_column),
                relationship: rel.clone(),
            })
        })
        .collect()
}
