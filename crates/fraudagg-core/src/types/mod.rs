//! Type system for FRAUDAGG
//!
//! This module contains the table model:
//! - Cell values
//! - Columnar tables with a row index
//! - Schema definitions and table validators

pub mod schema;
pub mod table;
pub mod validator;
pub mod value;

pub use schema::{columns, FieldType, Schema, SchemaField};
pub use table::{Column, Table, DEFAULT_INDEX_NAME};
pub use validator::{ValidationError, Validator};
pub use value::Value;
