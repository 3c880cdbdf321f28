//! DDL round trip: schema model to `CREATE TABLE` script and back.

mod dialect;
mod generator;
mod lexer;
mod parser;

pub use dialect::{Dialect, UnknownDialect};
pub use generator::{GeneratorOptions, generate, generate_with};
pub use parser::{ImportError, import_sql, parse_sql};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKeyRef, Table};
    use crate::types::ColumnType;
    use chrono::{TimeZone, Utc};

    fn model() -> Vec<Table> {
        vec![
            Table::new("orders")
                .with_column(Column::new("id", ColumnType::Int).primary_key().auto_increment())
                .with_column(
                    Column::new("user_id", ColumnType::Int)
                        .not_null()
                        .references("users", "id"),
                )
                .with_column(
                    Column::new("total", ColumnType::Decimal)
                        .size("10,2")
                        .default_value("0.00"),
                )
                .with_column(
                    Column::new("status", ColumnType::Varchar)
                        .size("20")
                        .default_value("'new'"),
                )
                .with_column(Column::new("gift", ColumnType::Bit).size("1").default_value("b'1'")),
            Table::new("users")
                .with_comment("Registered accounts")
                .with_column(Column::new("id", ColumnType::Int).primary_key().auto_increment())
                .with_column(
                    Column::new("email", ColumnType::Varchar)
                        .size("255")
                        .not_null()
                        .unique(),
                )
                .with_column(Column::new("bio", ColumnType::Text))
                .with_column(Column::new("born", ColumnType::Date)),
        ]
    }

    fn generate_fixed(tables: &[Table], dialect: Dialect) -> String {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        generate_with(tables, dialect, &GeneratorOptions::default(), at)
    }

    /// Everything the DDL carries, ignoring ids, positions and comments.
    fn assert_same_model(expected: &[Table], actual: &[Table]) {
        assert_eq!(expected.len(), actual.len());
        for table in expected {
            let parsed = actual
                .iter()
                .find(|t| t.name == table.name)
                .unwrap_or_else(|| panic!("missing table {}", table.name));
            assert_eq!(table.columns.len(), parsed.columns.len(), "columns of {}", table.name);
            for (want, got) in table.columns.iter().zip(&parsed.columns) {
                assert_eq!(want, got, "{}.{}", table.name, want.name);
            }
        }
    }

    #[test]
    fn test_round_trip_standard() {
        let tables = model();
        let sql = generate_fixed(&tables, Dialect::Standard);
        let parsed = parse_sql(&sql);
        assert_same_model(&tables, &parsed);
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let once = parse_sql(&generate_fixed(&model(), Dialect::Standard));
        let first = generate_fixed(&once, Dialect::Standard);
        let twice = parse_sql(&first);
        let second = generate_fixed(&twice, Dialect::Standard);
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_postgres_and_mssql() {
        let dialects = [
            Dialect::PostgreSQL,
            Dialect::MsSql,
            Dialect::SQLite,
            Dialect::CockroachDB,
        ];
        for dialect in dialects {
            let parsed = parse_sql(&generate_fixed(&model(), dialect));
            assert_same_model(&model(), &parsed);
        }
    }

    #[test]
    fn test_mysql_users_orders() {
        let sql = r#"
            CREATE TABLE users (
                id INT AUTO_INCREMENT PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE
            );
            CREATE TABLE orders (
                id INT PRIMARY KEY,
                user_id INT,
                FOREIGN KEY (user_id) REFERENCES users(id)
            );
        "#;

        let tables = import_sql(sql).unwrap();
        assert_eq!(tables.len(), 2);

        let id = tables[0].column("id").unwrap();
        assert!(id.primary_key && id.auto_increment && !id.nullable);
        let email = tables[0].column("email").unwrap();
        assert_eq!(email.type_label(), "VARCHAR(255)");
        assert!(!email.nullable && email.unique);

        let user_id = tables[1].column("user_id").unwrap();
        assert_eq!(user_id.foreign_key, Some(ForeignKeyRef::new("users", "id")));

        let regenerated = generate_fixed(&tables, Dialect::MySQL);
        assert!(regenerated.contains("FOREIGN KEY (user_id) REFERENCES users(id)"));
        assert!(regenerated.contains("CREATE INDEX idx_orders_user_id ON orders(user_id);"));
    }
}
