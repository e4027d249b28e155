//! Columnar transaction table
//!
//! A `Table` is the unit of exchange between the feature engine and its
//! callers: one row per transaction, named columns of equal length, and an
//! integer row index (the transaction identifier).

use super::value::Value;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default name of the row index
pub const DEFAULT_INDEX_NAME: &str = "transaction_id";

/// A named column of cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// One value per row
    pub values: Vec<Value>,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of values in the column
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Columnar table with an integer row index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Name of the index (e.g. "transaction_id")
    pub index_name: String,

    /// Row identifiers, one per row
    pub index: Vec<u64>,

    /// Columns in insertion order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create an empty table with the given index name
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Build a table from columns, assigning a dense 0..N-1 index.
    ///
    /// All columns must have the same length.
    pub fn from_columns(index_name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);
        for column in &columns {
            if column.len() != num_rows {
                return Err(CoreError::LengthMismatch {
                    column: column.name.clone(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CoreError::InvalidValue(format!(
                    "Duplicate column name: {}",
                    column.name
                )));
            }
        }

        Ok(Self {
            index_name: index_name.into(),
            index: (0..num_rows as u64).collect(),
            columns,
        })
    }

    /// Build a table from row maps, assigning a dense 0..N-1 index.
    ///
    /// `column_names` fixes the column order; a key missing from a row is
    /// stored as `Value::Null`.
    pub fn from_rows(
        index_name: impl Into<String>,
        column_names: &[&str],
        rows: Vec<HashMap<String, Value>>,
    ) -> Result<Self> {
        let mut columns: Vec<Column> = column_names
            .iter()
            .map(|name| Column::new(*name, Vec::with_capacity(rows.len())))
            .collect();

        for mut row in rows {
            for column in columns.iter_mut() {
                let value = row.remove(&column.name).unwrap_or(Value::Null);
                column.values.push(value);
            }
        }

        Self::from_columns(index_name, columns)
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::FieldNotFound(name.to_string()))
    }

    /// Get a single cell
    pub fn value(&self, column: &str, row: usize) -> Result<&Value> {
        let col = self.column(column)?;
        col.values.get(row).ok_or_else(|| {
            CoreError::InvalidValue(format!(
                "Row {} out of bounds for table with {} rows",
                row,
                self.num_rows()
            ))
        })
    }

    /// Get a row as a map of column name to value
    pub fn row(&self, row: usize) -> Option<HashMap<String, Value>> {
        if row >= self.num_rows() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.values[row].clone()))
                .collect(),
        )
    }

    /// Append a column, or replace an existing column of the same name in
    /// place so that repeated computations keep a stable schema.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if column.len() != self.num_rows() {
            return Err(CoreError::LengthMismatch {
                expected: self.num_rows(),
                actual: column.len(),
                column: column.name,
            });
        }

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Gather rows by position, producing a new table.
    ///
    /// The index values of the selected rows are carried over unchanged.
    pub fn take(&self, rows: &[usize]) -> Result<Self> {
        let num_rows = self.num_rows();
        if let Some(bad) = rows.iter().find(|&&r| r >= num_rows) {
            return Err(CoreError::InvalidValue(format!(
                "Row {} out of bounds for table with {} rows",
                bad, num_rows
            )));
        }

        Ok(Self {
            index_name: self.index_name.clone(),
            index: rows.iter().map(|&r| self.index[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r].clone()).collect()))
                .collect(),
        })
    }

    /// Concatenate tables vertically.
    ///
    /// Every table must have the same column names in the same order. The
    /// index values are carried over unchanged; call `reindex_dense` to
    /// assign fresh identifiers.
    pub fn concat(index_name: impl Into<String>, tables: Vec<Table>) -> Result<Self> {
        let mut iter = tables.into_iter();
        let mut result = match iter.next() {
            Some(first) => first,
            None => return Ok(Self::new(index_name)),
        };
        result.index_name = index_name.into();

        for table in iter {
            let expected = result.column_names();
            let actual = table.column_names();
            if expected != actual {
                return Err(CoreError::InvalidValue(format!(
                    "Cannot concatenate tables with different columns: {:?} vs {:?}",
                    expected, actual
                )));
            }

            result.index.extend(table.index);
            for (target, source) in result.columns.iter_mut().zip(table.columns) {
                target.values.extend(source.values);
            }
        }

        Ok(result)
    }

    /// Replace the index with a dense 0..N-1 sequence in current row order.
    ///
    /// Previous identifiers are discarded.
    pub fn reindex_dense(&mut self) {
        self.index = (0..self.num_rows() as u64).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::from_columns(
            DEFAULT_INDEX_NAME,
            vec![
                Column::new(
                    "customer_id",
                    vec![Value::Integer(1), Value::Integer(2), Value::Integer(1)],
                ),
                Column::new(
                    "tx_amount",
                    vec![Value::Number(10.0), Value::Number(20.0), Value::Number(30.0)],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_columns_assigns_dense_index() {
        let table = sample_table();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.index, vec![0, 1, 2]);
        assert_eq!(table.column_names(), vec!["customer_id", "tx_amount"]);
    }

    #[test]
    fn test_from_columns_length_mismatch() {
        let result = Table::from_columns(
            DEFAULT_INDEX_NAME,
            vec![
                Column::new("a", vec![Value::Integer(1)]),
                Column::new("b", vec![Value::Integer(1), Value::Integer(2)]),
            ],
        );

        assert!(matches!(result, Err(CoreError::LengthMismatch { .. })));
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let result = Table::from_columns(
            DEFAULT_INDEX_NAME,
            vec![
                Column::new("a", vec![Value::Integer(1)]),
                Column::new("a", vec![Value::Integer(2)]),
            ],
        );
        assert!(matches!(result, Err(CoreError::InvalidValue(_))));
    }

    #[test]
    fn test_from_rows_fills_missing_with_null() {
        let mut row1 = HashMap::new();
        row1.insert("customer_id".to_string(), Value::Integer(1));
        row1.insert("tx_amount".to_string(), Value::Number(5.0));
        let mut row2 = HashMap::new();
        row2.insert("customer_id".to_string(), Value::Integer(2));

        let table =
            Table::from_rows(DEFAULT_INDEX_NAME, &["customer_id", "tx_amount"], vec![row1, row2])
                .unwrap();

        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.value("tx_amount", 1).unwrap(), &Value::Null);
    }

    #[test]
    fn test_column_lookup() {
        let table = sample_table();
        assert!(table.has_column("tx_amount"));
        assert!(!table.has_column("tx_fraud"));
        assert!(matches!(
            table.column("tx_fraud"),
            Err(CoreError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_push_column_replaces_in_place() {
        let mut table = sample_table();
        table
            .push_column(Column::new("score", vec![Value::Null; 3]))
            .unwrap();
        table
            .push_column(Column::new(
                "customer_id",
                vec![Value::Integer(9), Value::Integer(9), Value::Integer(9)],
            ))
            .unwrap();

        assert_eq!(table.column_names(), vec!["customer_id", "tx_amount", "score"]);
        assert_eq!(table.value("customer_id", 0).unwrap(), &Value::Integer(9));

        let err = table.push_column(Column::new("short", vec![Value::Null]));
        assert!(err.is_err());
    }

    #[test]
    fn test_take_keeps_index_values() {
        let table = sample_table();
        let taken = table.take(&[2, 0]).unwrap();

        assert_eq!(taken.index, vec![2, 0]);
        assert_eq!(taken.value("tx_amount", 0).unwrap(), &Value::Number(30.0));
        assert!(table.take(&[5]).is_err());
    }

    #[test]
    fn test_concat_and_reindex() {
        let table = sample_table();
        let a = table.take(&[1]).unwrap();
        let b = table.take(&[0, 2]).unwrap();

        let mut merged = Table::concat(DEFAULT_INDEX_NAME, vec![a, b]).unwrap();
        assert_eq!(merged.index, vec![1, 0, 2]);

        merged.reindex_dense();
        assert_eq!(merged.index, vec![0, 1, 2]);
        assert_eq!(merged.value("customer_id", 0).unwrap(), &Value::Integer(2));
    }

    #[test]
    fn test_concat_empty() {
        let merged = Table::concat(DEFAULT_INDEX_NAME, vec![]).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.index_name, DEFAULT_INDEX_NAME);
    }

    #[test]
    fn test_concat_column_mismatch() {
        let table = sample_table();
        let mut other = table.clone();
        other.columns.pop();
        assert!(Table::concat(DEFAULT_INDEX_NAME, vec![table, other]).is_err());
    }

    #[test]
    fn test_row_view() {
        let table = sample_table();
        let row = table.row(1).unwrap();
        assert_eq!(row.get("customer_id"), Some(&Value::Integer(2)));
        assert!(table.row(3).is_none());
    }
}
