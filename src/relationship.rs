//! Relationships derived from foreign-key columns.

use crate::schema::{Table, names_match};
use serde::{Deserialize, Serialize};

/// One foreign-key column, summarized as an edge between two tables.
/// Never authoritative: always rebuilt from the columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// The source column is nullable, so a row may have no parent.
    pub optional: bool,
}

/// Full recompute over every column of every table.
///
/// References to a table that does not exist are skipped; the reference stays
/// on its column until cleared explicitly.
pub fn derive_relationships(tables: &[Table]) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for table in tables {
        for (column, fk) in table.foreign_keys() {
            let Some(target) = tables.iter().find(|t| names_match(&t.name, &fk.table)) else {
                tracing::trace!(
                    table = %table.name,
                    column = %column.name,
                    target = %fk.table,
                    "reference to missing table"
                );
                continue;
            };

            relationships.push(Relationship {
                source_table: table.name.clone(),
                source_column: column.name.clone(),
                target_table: target.name.clone(),
                target_column: fk.column.clone(),
                optional: column.nullable,
            });
        }
    }

    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::types::ColumnType;

    fn tables() -> Vec<Table> {
        vec![
            Table::new("users").with_column(Column::new("id", ColumnType::Int).primary_key()),
            Table::new("orders")
                .with_column(Column::new("id", ColumnType::Int).primary_key())
                .with_column(Column::new("user_id", ColumnType::Int).references("users", "id"))
                .with_column(
                    Column::new("coupon_id", ColumnType::Int)
                        .not_null()
                        .references("coupons", "id"),
                ),
        ]
    }

    #[test]
    fn test_derive_from_foreign_keys() {
        let rels = derive_relationships(&tables());
        assert_eq!(
            rels,
            vec![Relationship {
                source_table: "orders".to_string(),
                source_column: "user_id".to_string(),
                target_table: "users".to_string(),
                target_column: "id".to_string(),
                optional: true,
            }]
        );
    }

    #[test]
    fn test_missing_target_is_skipped_silently() {
        let rels = derive_relationships(&tables());
        assert!(rels.iter().all(|r| r.target_table != "coupons"));
    }

    #[test]
    fn test_recompute_is_idempotent_and_order_independent() {
        let mut ts = tables();
        let first = derive_relationships(&ts);
        let second = derive_relationships(&ts);
        assert_eq!(first, second);

        ts.reverse();
        let mut reversed = derive_relationships(&ts);
        reversed.sort_by(|a, b| a.source_column.cmp(&b.source_column));
        assert_eq!(first, reversed);
    }

    #[test]
    fn test_not_null_reference_is_mandatory() {
        let mut ts = tables();
        let coupons = Table::new("coupons")
            .with_column(Column::new("id", ColumnType::Int).primary_key());
        ts.push(coupons);
        let rels = derive_relationships(&ts);
        let coupon = rels.iter().find(|r| r.target_table == "coupons").unwrap();
        assert!(!coupon.optional);
    }
}
