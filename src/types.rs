//! Column base types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping of base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Numeric,
    String,
    Temporal,
    Json,
    Spatial,
    Other,
}

/// Base type of a column.
///
/// Anything outside the known set is kept verbatim in `Other` so that it can
/// still be rendered and round-tripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    // Numeric
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Decimal,
    Float,
    Double,
    Bit,

    // String
    Char,
    #[default]
    Varchar,
    Binary,
    VarBinary,
    TinyText,
    Text,
    MediumText,
    LongText,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,

    // Date/time
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,

    Json,

    // Spatial
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,

    Other(String),
}

impl ColumnType {
    /// Parse a type name. Matching is case-insensitive; unknown names are
    /// uppercased and kept as `Other`.
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "TINYINT" => Self::TinyInt,
            "SMALLINT" => Self::SmallInt,
            "MEDIUMINT" => Self::MediumInt,
            "INT" | "INTEGER" => Self::Int,
            "BIGINT" => Self::BigInt,
            "DECIMAL" => Self::Decimal,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "BIT" => Self::Bit,
            "CHAR" => Self::Char,
            "VARCHAR" => Self::Varchar,
            "BINARY" => Self::Binary,
            "VARBINARY" => Self::VarBinary,
            "TINYTEXT" => Self::TinyText,
            "TEXT" => Self::Text,
            "MEDIUMTEXT" => Self::MediumText,
            "LONGTEXT" => Self::LongText,
            "TINYBLOB" => Self::TinyBlob,
            "BLOB" => Self::Blob,
            "MEDIUMBLOB" => Self::MediumBlob,
            "LONGBLOB" => Self::LongBlob,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "YEAR" => Self::Year,
            "JSON" => Self::Json,
            "GEOMETRY" => Self::Geometry,
            "POINT" => Self::Point,
            "LINESTRING" => Self::LineString,
            "POLYGON" => Self::Polygon,
            "MULTIPOINT" => Self::MultiPoint,
            "MULTILINESTRING" => Self::MultiLineString,
            "MULTIPOLYGON" => Self::MultiPolygon,
            "GEOMETRYCOLLECTION" => Self::GeometryCollection,
            _ => Self::Other(upper),
        }
    }

    /// Integer type behind a PostgreSQL serial pseudo-type.
    pub fn from_serial(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SERIAL" | "SERIAL4" => Some(Self::Int),
            "BIGSERIAL" | "SERIAL8" => Some(Self::BigInt),
            "SMALLSERIAL" | "SERIAL2" => Some(Self::SmallInt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Bit => "BIT",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::TinyText => "TINYTEXT",
            Self::Text => "TEXT",
            Self::MediumText => "MEDIUMTEXT",
            Self::LongText => "LONGTEXT",
            Self::TinyBlob => "TINYBLOB",
            Self::Blob => "BLOB",
            Self::MediumBlob => "MEDIUMBLOB",
            Self::LongBlob => "LONGBLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Year => "YEAR",
            Self::Json => "JSON",
            Self::Geometry => "GEOMETRY",
            Self::Point => "POINT",
            Self::LineString => "LINESTRING",
            Self::Polygon => "POLYGON",
            Self::MultiPoint => "MULTIPOINT",
            Self::MultiLineString => "MULTILINESTRING",
            Self::MultiPolygon => "MULTIPOLYGON",
            Self::GeometryCollection => "GEOMETRYCOLLECTION",
            Self::Other(name) => name,
        }
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            Self::TinyInt
            | Self::SmallInt
            | Self::MediumInt
            | Self::Int
            | Self::BigInt
            | Self::Decimal
            | Self::Float
            | Self::Double
            | Self::Bit => TypeFamily::Numeric,
            Self::Char
            | Self::Varchar
            | Self::Binary
            | Self::VarBinary
            | Self::TinyText
            | Self::Text
            | Self::MediumText
            | Self::LongText
            | Self::TinyBlob
            | Self::Blob
            | Self::MediumBlob
            | Self::LongBlob => TypeFamily::String,
            Self::Date | Self::Time | Self::DateTime | Self::Timestamp | Self::Year => {
                TypeFamily::Temporal
            }
            Self::Json => TypeFamily::Json,
            Self::Geometry
            | Self::Point
            | Self::LineString
            | Self::Polygon
            | Self::MultiPoint
            | Self::MultiLineString
            | Self::MultiPolygon
            | Self::GeometryCollection => TypeFamily::Spatial,
            Self::Other(_) => TypeFamily::Other,
        }
    }

    /// TINYINT through BIGINT: the only types auto-increment applies to.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::MediumInt | Self::Int | Self::BigInt
        )
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(ColumnType::parse("varchar"), ColumnType::Varchar);
        assert_eq!(ColumnType::parse("INTEGER"), ColumnType::Int);
        assert_eq!(ColumnType::parse("MultiPolygon"), ColumnType::MultiPolygon);
    }

    #[test]
    fn test_unknown_type_is_kept_uppercased() {
        let t = ColumnType::parse("uuid");
        assert_eq!(t, ColumnType::Other("UUID".to_string()));
        assert_eq!(t.to_string(), "UUID");
        assert_eq!(t.family(), TypeFamily::Other);
    }

    #[test]
    fn test_serial_types() {
        assert_eq!(ColumnType::from_serial("serial"), Some(ColumnType::Int));
        assert_eq!(ColumnType::from_serial("BIGSERIAL"), Some(ColumnType::BigInt));
        assert_eq!(ColumnType::from_serial("INT"), None);
    }

    #[test]
    fn test_integer_family() {
        assert!(ColumnType::TinyInt.is_integer());
        assert!(ColumnType::BigInt.is_integer());
        assert!(!ColumnType::Decimal.is_integer());
        assert!(!ColumnType::Varchar.is_integer());
        assert_eq!(ColumnType::Decimal.family(), TypeFamily::Numeric);
        assert_eq!(ColumnType::Year.family(), TypeFamily::Temporal);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ColumnType::BigInt).unwrap();
        assert_eq!(json, "\"BIGINT\"");
        let back: ColumnType = serde_json::from_str("\"decimal\"").unwrap();
        assert_eq!(back, ColumnType::Decimal);
    }
}
