//! Plain-text schema summary for terminals.

use crate::schema::{Column, Schema, Table};
use unicode_width::UnicodeWidthStr;

const GAP: usize = 2;

/// Aligned column listing per table, then relationships and stale references.
pub fn describe(schema: &Schema) -> String {
    let mut output = String::new();

    for (i, table) in schema.tables().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        write_table(&mut output, table);
    }

    if !schema.relationships().is_empty() {
        output.push_str("\nRelationships:\n");
        for rel in schema.relationships() {
            let cardinality = if rel.optional { "optional" } else { "required" };
            output.push_str(&format!(
                "  {}.{} -> {}.{} ({})\n",
                rel.source_table,
                rel.source_column,
                rel.target_table,
                rel.target_column,
                cardinality
            ));
        }
    }

    let stale = schema.stale_foreign_keys();
    if !stale.is_empty() {
        output.push_str("\nWarnings:\n");
        for reference in stale {
            output.push_str(&format!("  {}\n", reference));
        }
    }

    output
}

fn write_table(output: &mut String, table: &Table) {
    output.push_str(&table.name);
    if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
        output.push_str("  -- ");
        output.push_str(comment);
    }
    output.push('\n');

    if table.columns.is_empty() {
        output.push_str("  (no columns)\n");
        return;
    }

    let rows: Vec<(String, String, String)> = table
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.type_label(), flags(c)))
        .collect();

    let name_width = rows.iter().map(|(name, _, _)| name.width()).max().unwrap_or(0);
    let type_width = rows.iter().map(|(_, typ, _)| typ.width()).max().unwrap_or(0);

    for (name, typ, flags) in rows {
        let line = format!(
            "  {}{}{}{}{}",
            name,
            padding(&name, name_width),
            typ,
            padding(&typ, type_width),
            flags
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }
}

/// Spaces after `text` so the next cell starts at `width + GAP`.
fn padding(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(text.width()) + GAP)
}

fn flags(column: &Column) -> String {
    let mut flags = Vec::new();
    if column.primary_key {
        flags.push("PK".to_string());
    }
    if !column.nullable {
        flags.push("NN".to_string());
    }
    if column.unique {
        flags.push("UQ".to_string());
    }
    if column.auto_increment {
        flags.push("AI".to_string());
    }
    if let Some(fk) = &column.foreign_key {
        flags.push(format!("FK->{}.{}", fk.table, fk.column));
    }
    if let Some(default) = column.default_value.as_deref().filter(|d| !d.is_empty()) {
        flags.push(format!("DEFAULT {}", default));
    }
    flags.join(" ")
}
