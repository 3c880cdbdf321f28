//! DDL generation: schema model to `CREATE TABLE` script.

use super::Dialect;
use crate::schema::{Column, ForeignKeyRef, Table};
use chrono::{DateTime, SecondsFormat, Utc};

/// Output formatting knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Emit the leading comment block with dialect and timestamp.
    pub header: bool,
    /// Prefix of every column and constraint line.
    pub indent: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            header: true,
            indent: "  ".to_string(),
        }
    }
}

/// Render `tables` as a DDL script, stamped with the current time.
pub fn generate(tables: &[Table], dialect: Dialect) -> String {
    generate_with(tables, dialect, &GeneratorOptions::default(), Utc::now())
}

/// Render `tables` as a DDL script. Output depends only on the arguments.
///
/// Never fails: anything the model holds, including unknown types, is
/// rendered literally.
pub fn generate_with(
    tables: &[Table],
    dialect: Dialect,
    options: &GeneratorOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    if options.header {
        output.push_str("-- SchemaForge DDL export\n");
        output.push_str(&format!("-- Dialect: {}\n", dialect.display_name()));
        output.push_str(&format!(
            "-- Generated at: {}\n\n",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }

    for (i, table) in order_tables(tables).into_iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        write_table(&mut output, table, dialect, options);
    }

    output
}

/// Tables without references first, then the rest, each group keeping its
/// original order. Chains of references inside the second group are not
/// sorted further.
fn order_tables(tables: &[Table]) -> Vec<&Table> {
    let (independent, dependent): (Vec<&Table>, Vec<&Table>) =
        tables.iter().partition(|t| !t.has_foreign_keys());
    independent.into_iter().chain(dependent).collect()
}

fn write_table(
    output: &mut String,
    table: &Table,
    dialect: Dialect,
    options: &GeneratorOptions,
) {
    tracing::debug!(
        table = %table.name,
        columns = table.columns.len(),
        %dialect,
        "generating CREATE TABLE"
    );

    if let Some(comment) = table.comment.as_deref().filter(|c| !c.trim().is_empty()) {
        for line in comment.lines() {
            output.push_str(&format!("-- {}\n", line.trim_end()));
        }
    }

    output.push_str(&format!(
        "CREATE TABLE {} (\n",
        dialect.quote_identifier(&table.name)
    ));

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| column_definition(c, dialect))
        .collect();

    for (column, fk) in table.foreign_keys() {
        lines.push(foreign_key_clause(column, fk, dialect));
    }

    let body: Vec<String> = lines
        .into_iter()
        .map(|l| format!("{}{}", options.indent, l))
        .collect();
    output.push_str(&body.join(",\n"));
    output.push_str("\n);\n");

    if dialect.indexes_foreign_keys() {
        for (column, _) in table.foreign_keys() {
            output.push_str(&create_index(table, column, dialect));
            output.push('\n');
        }
    }
}

/// `<name> <type>[(<size>)]` followed by, in order: PRIMARY KEY, NOT NULL,
/// UNIQUE, auto increment, DEFAULT.
fn column_definition(column: &Column, dialect: Dialect) -> String {
    let serial = dialect.serial_substitution(column);

    let mut def = format!("{} ", dialect.quote_identifier(&column.name));
    match serial {
        Some(serial_type) => def.push_str(serial_type),
        None => def.push_str(&column.type_label()),
    }

    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    if !column.nullable && !column.primary_key {
        def.push_str(" NOT NULL");
    }
    if column.unique && !column.primary_key {
        def.push_str(" UNIQUE");
    }
    if column.auto_increment && serial.is_none() && column.typ.is_integer() {
        if let Some(keyword) = dialect.auto_increment_keyword() {
            def.push(' ');
            def.push_str(keyword);
        }
    }
    if let Some(default) = column.default_value.as_deref().filter(|d| !d.is_empty()) {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }

    def
}

fn foreign_key_clause(column: &Column, fk: &ForeignKeyRef, dialect: Dialect) -> String {
    format!(
        "FOREIGN KEY ({}) REFERENCES {}({})",
        dialect.quote_identifier(&column.name),
        dialect.quote_identifier(&fk.table),
        dialect.quote_identifier(&fk.column)
    )
}

fn create_index(table: &Table, column: &Column, dialect: Dialect) -> String {
    let name = format!("idx_{}_{}", table.name, column.name);
    tracing::debug!(table = %table.name, index = %name, "generating CREATE INDEX");
    format!(
        "CREATE INDEX {} ON {}({});",
        dialect.quote_identifier(&name),
        dialect.quote_identifier(&table.name),
        dialect.quote_identifier(&column.name)
    )
}
