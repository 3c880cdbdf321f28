//! Foreign-key type compatibility.
//!
//! Decides whether a source column may reference a target column. Pure; the
//! caller must block the mutation when this returns an error.

use crate::schema::Column;
use crate::types::ColumnType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Assumed length of a CHAR/VARCHAR without a usable size.
pub const DEFAULT_STRING_LENGTH: u32 = 255;
/// Assumed precision and scale of a DECIMAL without a size.
pub const DEFAULT_DECIMAL_SIZE: &str = "10,2";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FkTypeError {
    #[error("Type mismatch: {source_type} cannot reference {target_type}")]
    TypeMismatch {
        source_type: ColumnType,
        target_type: ColumnType,
    },
    #[error(
        "Length mismatch: {typ}({source_length}) does not fit into {typ}({target_length})"
    )]
    LengthExceeds {
        typ: ColumnType,
        source_length: u32,
        target_length: u32,
    },
    #[error("Precision mismatch: DECIMAL({source_size}) cannot reference DECIMAL({target_size})")]
    DecimalMismatch {
        source_size: String,
        target_size: String,
    },
}

/// Check that `source` may hold references to `target`. Not symmetric: a
/// shorter string column may reference a longer one, not the reverse.
pub fn validate(source: &Column, target: &Column) -> Result<(), FkTypeError> {
    if source.typ != target.typ {
        return Err(FkTypeError::TypeMismatch {
            source_type: source.typ.clone(),
            target_type: target.typ.clone(),
        });
    }

    match source.typ {
        ColumnType::Varchar | ColumnType::Char => {
            let source_length = string_length(source);
            let target_length = string_length(target);
            if source_length > target_length {
                return Err(FkTypeError::LengthExceeds {
                    typ: source.typ.clone(),
                    source_length,
                    target_length,
                });
            }
        }
        ColumnType::Decimal => {
            let source_size = decimal_size(source);
            let target_size = decimal_size(target);
            if source_size != target_size {
                return Err(FkTypeError::DecimalMismatch {
                    source_size: source_size.to_string(),
                    target_size: target_size.to_string(),
                });
            }
        }
        _ => {}
    }

    Ok(())
}

fn string_length(column: &Column) -> u32 {
    column
        .size
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_STRING_LENGTH)
}

fn decimal_size(column: &Column) -> &str {
    match column.size.as_deref() {
        Some(size) if !size.is_empty() => size,
        _ => DEFAULT_DECIMAL_SIZE,
    }
}

/// `{valid, reason}` shape handed to host UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub reason: String,
}

impl From<Result<(), FkTypeError>> for Validation {
    fn from(result: Result<(), FkTypeError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                reason: "Types are compatible".to_string(),
            },
            Err(e) => Self {
                valid: false,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch() {
        let source = Column::new("a", ColumnType::Int);
        let target = Column::new("b", ColumnType::BigInt);
        let err = validate(&source, &target).unwrap_err();
        assert_eq!(err.to_string(), "Type mismatch: INT cannot reference BIGINT");
    }

    #[test]
    fn test_varchar_is_not_symmetric() {
        let short = Column::new("a", ColumnType::Varchar).size("50");
        let wide = Column::new("b", ColumnType::Varchar).size("255");

        assert!(validate(&short, &wide).is_ok());

        let err = validate(&wide, &short).unwrap_err();
        assert_eq!(
            err,
            FkTypeError::LengthExceeds {
                typ: ColumnType::Varchar,
                source_length: 255,
                target_length: 50,
            }
        );
        assert!(err.to_string().contains("255"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_char_length_defaults_to_255() {
        let unsized_char = Column::new("a", ColumnType::Char);
        let garbage = Column::new("b", ColumnType::Char).size("abc");
        let narrow = Column::new("c", ColumnType::Char).size("36");

        assert!(validate(&unsized_char, &garbage).is_ok());
        assert!(validate(&narrow, &unsized_char).is_ok());
        assert!(validate(&unsized_char, &narrow).is_err());
    }

    #[test]
    fn test_decimal_must_match_exactly() {
        let a = Column::new("a", ColumnType::Decimal).size("10,2");
        let b = Column::new("b", ColumnType::Decimal).size("12,4");
        let c = Column::new("c", ColumnType::Decimal).size("10,2");
        let unsized_decimal = Column::new("d", ColumnType::Decimal);

        assert!(matches!(
            validate(&a, &b),
            Err(FkTypeError::DecimalMismatch { .. })
        ));
        assert!(validate(&a, &c).is_ok());
        assert!(validate(&unsized_decimal, &a).is_ok());
    }

    #[test]
    fn test_other_types_only_compare_base_type() {
        let a = Column::new("a", ColumnType::Int).size("11");
        let b = Column::new("b", ColumnType::Int);
        assert!(validate(&a, &b).is_ok());
    }

    #[test]
    fn test_validation_shape() {
        let a = Column::new("a", ColumnType::Decimal).size("10,2");
        let b = Column::new("b", ColumnType::Decimal).size("12,4");

        let rejected = Validation::from(validate(&a, &b));
        assert!(!rejected.valid);
        assert!(rejected.reason.contains("12,4"));

        let accepted = Validation::from(validate(&a, &a));
        assert!(accepted.valid);
    }
}
