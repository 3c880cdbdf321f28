//! SQL dialect formatting rules.

use crate::schema::Column;
use crate::types::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown dialect: {0}")]
pub struct UnknownDialect(pub String);

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Standard SQL with MySQL-style auto increment
    #[default]
    Standard,
    PostgreSQL,
    MySQL,
    CockroachDB,
    SQLite,
    /// SQL Server
    MsSql,
    Oracle,
}

impl Dialect {
    pub const ALL: [Dialect; 7] = [
        Self::Standard,
        Self::PostgreSQL,
        Self::MySQL,
        Self::CockroachDB,
        Self::SQLite,
        Self::MsSql,
        Self::Oracle,
    ];

    /// Identifier used on the command line and in JSON.
    pub fn id(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::CockroachDB => "cockroachdb",
            Self::SQLite => "sqlite",
            Self::MsSql => "mssql",
            Self::Oracle => "oracle",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard SQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::CockroachDB => "CockroachDB",
            Self::SQLite => "SQLite",
            Self::MsSql => "SQL Server",
            Self::Oracle => "Oracle",
        }
    }

    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Self::PostgreSQL | Self::CockroachDB | Self::Oracle => {
                format!("\"{}\"", name.replace('"', "\"\""))
            }
            Self::MsSql => format!("[{}]", name.replace(']', "]]")),
            Self::Standard | Self::MySQL | Self::SQLite => name.to_string(),
        }
    }

    /// Keyword appended to an auto-increment column. `None` for PostgreSQL
    /// and CockroachDB, which use serial types instead, and for Oracle, where
    /// sequences are not generated.
    pub fn auto_increment_keyword(self) -> Option<&'static str> {
        match self {
            Self::Standard | Self::MySQL => Some("AUTO_INCREMENT"),
            Self::SQLite => Some("AUTOINCREMENT"),
            Self::MsSql => Some("IDENTITY(1,1)"),
            Self::PostgreSQL | Self::CockroachDB | Self::Oracle => None,
        }
    }

    /// Serial type replacing the declared type of an auto-increment primary key.
    pub fn serial_substitution(self, column: &Column) -> Option<&'static str> {
        if !matches!(self, Self::PostgreSQL | Self::CockroachDB) {
            return None;
        }
        if !(column.primary_key && column.auto_increment) {
            return None;
        }
        match column.typ {
            ColumnType::Int => Some("SERIAL"),
            ColumnType::BigInt => Some("BIGSERIAL"),
            _ => None,
        }
    }

    /// Whether foreign-key columns get a `CREATE INDEX` of their own.
    pub fn indexes_foreign_keys(self) -> bool {
        matches!(self, Self::PostgreSQL | Self::MySQL)
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "generic" | "sql" => Ok(Self::Standard),
            "postgres" | "postgresql" | "pg" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "cockroach" | "cockroachdb" => Ok(Self::CockroachDB),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            "mssql" | "sqlserver" | "tsql" => Ok(Self::MsSql),
            "oracle" => Ok(Self::Oracle),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySQL);
        assert_eq!("sqlserver".parse::<Dialect>().unwrap(), Dialect::MsSql);
        assert!("db2".parse::<Dialect>().is_err());
        for dialect in Dialect::ALL {
            assert_eq!(dialect.id().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::PostgreSQL.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::CockroachDB.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::Oracle.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::MsSql.quote_identifier("users"), "[users]");
        assert_eq!(Dialect::MySQL.quote_identifier("users"), "users");
        assert_eq!(Dialect::SQLite.quote_identifier("users"), "users");
        assert_eq!(Dialect::Standard.quote_identifier("users"), "users");
    }

    #[test]
    fn test_auto_increment_keyword() {
        assert_eq!(Dialect::MySQL.auto_increment_keyword(), Some("AUTO_INCREMENT"));
        assert_eq!(Dialect::Standard.auto_increment_keyword(), Some("AUTO_INCREMENT"));
        assert_eq!(Dialect::SQLite.auto_increment_keyword(), Some("AUTOINCREMENT"));
        assert_eq!(Dialect::MsSql.auto_increment_keyword(), Some("IDENTITY(1,1)"));
        assert_eq!(Dialect::Oracle.auto_increment_keyword(), None);
        assert_eq!(Dialect::PostgreSQL.auto_increment_keyword(), None);
    }

    #[test]
    fn test_serial_substitution() {
        let id = Column::new("id", ColumnType::Int).primary_key().auto_increment();
        let big = Column::new("id", ColumnType::BigInt).primary_key().auto_increment();
        let plain = Column::new("n", ColumnType::Int).auto_increment();

        assert_eq!(Dialect::PostgreSQL.serial_substitution(&id), Some("SERIAL"));
        assert_eq!(Dialect::CockroachDB.serial_substitution(&big), Some("BIGSERIAL"));
        assert_eq!(Dialect::PostgreSQL.serial_substitution(&plain), None);
        assert_eq!(Dialect::MySQL.serial_substitution(&id), None);
    }

    #[test]
    fn test_serde_ids() {
        assert_eq!(serde_json::to_string(&Dialect::MsSql).unwrap(), "\"mssql\"");
        assert_eq!(
            serde_json::from_str::<Dialect>("\"cockroachdb\"").unwrap(),
            Dialect::CockroachDB
        );
    }
}
