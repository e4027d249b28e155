//! Table validation against schemas

use super::schema::{FieldType, Schema};
use super::table::Table;
use super::value::Value;
use thiserror::Error;

/// Validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Type mismatch in a cell
    #[error("Type mismatch for column '{column}' at row {row}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: String,
        actual: String,
    },

    /// Null in a non-nullable column
    #[error("Null value in non-nullable column '{column}' at row {row}")]
    UnexpectedNull { column: String, row: usize },

    /// Required column missing
    #[error("Required column missing: {column}")]
    RequiredColumnMissing { column: String },
}

/// Validator for tables against schemas
pub struct Validator {
    /// Stop checking a column after its first bad cell
    first_error_per_column: bool,
}

impl Validator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            first_error_per_column: true,
        }
    }

    /// Report every bad cell rather than the first per column
    pub fn report_all_cells(mut self) -> Self {
        self.first_error_per_column = false;
        self
    }

    /// Validate a table against a schema.
    ///
    /// Columns are checked in name order so the error list is stable.
    pub fn validate(&self, table: &Table, schema: &Schema) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut names: Vec<&String> = schema.fields.keys().collect();
        names.sort();

        for name in names {
            let field = &schema.fields[name];
            let column = match table.column(name) {
                Ok(column) => column,
                Err(_) => {
                    if field.required {
                        errors.push(ValidationError::RequiredColumnMissing {
                            column: name.clone(),
                        });
                    }
                    continue;
                }
            };

            for (row, value) in column.values.iter().enumerate() {
                if let Err(err) = self.validate_cell(name, row, value, field.field_type, field.nullable) {
                    errors.push(err);
                    if self.first_error_per_column {
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a single cell
    pub fn validate_cell(
        &self,
        column: &str,
        row: usize,
        value: &Value,
        field_type: FieldType,
        nullable: bool,
    ) -> Result<(), ValidationError> {
        if value.is_null() {
            return if nullable {
                Ok(())
            } else {
                Err(ValidationError::UnexpectedNull {
                    column: column.to_string(),
                    row,
                })
            };
        }

        let matches = match field_type {
            FieldType::Any => true,
            FieldType::Boolean => matches!(value, Value::Bool(_)),
            FieldType::Integer => matches!(value, Value::Integer(_)),
            FieldType::Number => value.is_numeric(),
            FieldType::String => matches!(value, Value::String(_)),
            FieldType::Timestamp => matches!(value, Value::Timestamp(_)),
        };

        if matches {
            Ok(())
        } else {
            Err(ValidationError::TypeMismatch {
                column: column.to_string(),
                row,
                expected: field_type.type_name().to_string(),
                actual: value.type_name().to_string(),
            })
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
