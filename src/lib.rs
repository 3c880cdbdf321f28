pub mod describe;
pub mod project;
pub mod relationship;
pub mod schema;
pub mod sql;
pub mod types;
pub mod validate;

use wasm_bindgen::prelude::*;

use relationship::derive_relationships;
use schema::{Column, Schema, SchemaCommand, Table};
use sql::{Dialect, generate, import_sql};
use validate::{Validation, validate};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a JSON array of tables as a DDL script
#[wasm_bindgen(js_name = "generateSql")]
pub fn generate_sql(tables_json: &str, dialect: &str) -> Result<String, String> {
    generate_sql_json(tables_json, dialect)
}

/// Parse a DDL script into a JSON array of tables
#[wasm_bindgen(js_name = "parseSql")]
pub fn parse_sql(sql: &str) -> Result<String, String> {
    parse_sql_json(sql)
}

/// Check whether `source` may reference `target`; returns `{ valid, reason }`
#[wasm_bindgen(js_name = "validateForeignKey")]
pub fn validate_foreign_key(source_json: &str, target_json: &str) -> Result<JsValue, String> {
    let validation = validate_columns_json(source_json, target_json)?;

    let object = js_sys::Object::new();
    js_sys::Reflect::set(&object, &"valid".into(), &validation.valid.into())
        .map_err(|e| format!("{:?}", e))?;
    js_sys::Reflect::set(&object, &"reason".into(), &validation.reason.as_str().into())
        .map_err(|e| format!("{:?}", e))?;

    Ok(object.into())
}

/// Relationships implied by the foreign keys of a JSON array of tables
#[wasm_bindgen(js_name = "deriveRelationships")]
pub fn derive_relationships_js(tables_json: &str) -> Result<String, String> {
    derive_relationships_json(tables_json)
}

/// Apply one schema command to a JSON array of tables
#[wasm_bindgen(js_name = "applyCommand")]
pub fn apply_command(tables_json: &str, command_json: &str) -> Result<String, String> {
    apply_command_json(tables_json, command_json)
}

fn read_tables(tables_json: &str) -> Result<Vec<Table>, String> {
    serde_json::from_str(tables_json).map_err(|e| e.to_string())
}

fn generate_sql_json(tables_json: &str, dialect: &str) -> Result<String, String> {
    let tables = read_tables(tables_json)?;
    let dialect: Dialect = dialect.parse().map_err(|e: sql::UnknownDialect| e.to_string())?;
    Ok(generate(&tables, dialect))
}

fn parse_sql_json(sql: &str) -> Result<String, String> {
    let tables = import_sql(sql).map_err(|e| e.to_string())?;
    serde_json::to_string(&tables).map_err(|e| e.to_string())
}

fn validate_columns_json(source_json: &str, target_json: &str) -> Result<Validation, String> {
    let source: Column = serde_json::from_str(source_json).map_err(|e| e.to_string())?;
    let target: Column = serde_json::from_str(target_json).map_err(|e| e.to_string())?;
    Ok(validate(&source, &target).into())
}

fn derive_relationships_json(tables_json: &str) -> Result<String, String> {
    let tables = read_tables(tables_json)?;
    serde_json::to_string(&derive_relationships(&tables)).map_err(|e| e.to_string())
}

fn apply_command_json(tables_json: &str, command_json: &str) -> Result<String, String> {
    let schema = Schema::from_tables(read_tables(tables_json)?);
    let command: SchemaCommand = serde_json::from_str(command_json).map_err(|e| e.to_string())?;
    let next = schema.apply(command).map_err(|e| e.to_string())?;
    serde_json::to_string(next.tables()).map_err(|e| e.to_string())
}
