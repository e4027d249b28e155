//! Schema definitions for table validation
//!
//! Schemas name the columns a computation requires and the semantic type
//! each of them must carry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column names of the transaction input boundary
pub mod columns {
    pub const TX_DATETIME: &str = "tx_datetime";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const TERMINAL_ID: &str = "terminal_id";
    pub const TX_AMOUNT: &str = "tx_amount";
    pub const TX_FRAUD: &str = "tx_fraud";
}

/// A schema defines the required columns of a table and their types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name
    pub name: String,

    /// Schema description
    pub description: Option<String>,

    /// Fields in the schema
    pub fields: HashMap<String, SchemaField>,
}

/// A field in a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name
    pub name: String,

    /// Field type
    pub field_type: FieldType,

    /// Whether this field is required
    #[serde(default)]
    pub required: bool,

    /// Whether null cells are accepted
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Optional description
    pub description: Option<String>,
}

fn default_nullable() -> bool {
    true
}

/// Semantic column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Boolean flag
    Boolean,

    /// Integer (identifiers, labels)
    Integer,

    /// Any numeric value; integers and booleans are accepted as well
    Number,

    /// Free text
    String,

    /// Point in time
    Timestamp,

    /// Any type (no validation)
    Any,
}

impl Schema {
    /// Create a new schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: HashMap::new(),
        }
    }

    /// Schema of the raw transaction table consumed by the feature engine
    pub fn transactions() -> Self {
        Schema::new("transactions")
            .with_description("Raw card transactions, one row per transaction")
            .add_field(
                SchemaField::new(columns::TX_DATETIME, FieldType::Timestamp)
                    .required()
                    .not_null(),
            )
            .add_field(
                SchemaField::new(columns::CUSTOMER_ID, FieldType::Any)
                    .required()
                    .not_null(),
            )
            .add_field(
                SchemaField::new(columns::TERMINAL_ID, FieldType::Any)
                    .required()
                    .not_null(),
            )
            .add_field(SchemaField::new(columns::TX_AMOUNT, FieldType::Number).required())
            .add_field(SchemaField::new(columns::TX_FRAUD, FieldType::Number).required())
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field
    pub fn add_field(mut self, field: SchemaField) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.get(name)
    }

    /// Check if a field is required
    pub fn is_required(&self, name: &str) -> bool {
        self.fields.get(name).map(|f| f.required).unwrap_or(false)
    }
}

impl SchemaField {
    /// Create a new optional, nullable field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            nullable: true,
            description: None,
        }
    }

    /// Mark field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Reject null cells
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl FieldType {
    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Timestamp => "timestamp",
            FieldType::Any => "any",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = Schema::new("Customers")
            .with_description("Customer table")
            .add_field(SchemaField::new("customer_id", FieldType::Integer).required())
            .add_field(SchemaField::new("mean_amount", FieldType::Number));

        assert_eq!(schema.name, "Customers");
        assert_eq!(schema.description, Some("Customer table".to_string()));
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.is_required("customer_id"));
        assert!(!schema.is_required("mean_amount"));
        assert!(!schema.is_required("missing"));
    }

    #[test]
    fn test_schema_field_defaults() {
        let field = SchemaField::new("tx_datetime", FieldType::Timestamp)
            .required()
            .not_null()
            .with_description("Transaction time");

        assert!(field.required);
        assert!(!field.nullable);
        assert_eq!(field.description, Some("Transaction time".to_string()));
    }

    #[test]
    fn test_transactions_schema() {
        let schema = Schema::transactions();
        for name in [
            columns::TX_DATETIME,
            columns::CUSTOMER_ID,
            columns::TERMINAL_ID,
            columns::TX_AMOUNT,
            columns::TX_FRAUD,
        ] {
            assert!(schema.is_required(name), "{} should be required", name);
        }
        assert_eq!(
            schema.get_field(columns::TX_DATETIME).unwrap().field_type,
            FieldType::Timestamp
        );
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::Number.type_name(), "number");
        assert_eq!(FieldType::Timestamp.type_name(), "timestamp");
        assert_eq!(FieldType::Any.type_name(), "any");
    }

    #[test]
    fn test_schema_serde() {
        let schema = Schema::new("Events")
            .add_field(SchemaField::new("id", FieldType::Integer).required())
            .add_field(SchemaField::new("amount", FieldType::Number));

        let json = serde_json::to_string_pretty(&schema).unwrap();
        assert!(json.contains("Events"));
        assert!(json.contains("\"number\""));

        let deserialized: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, schema);
    }
}
