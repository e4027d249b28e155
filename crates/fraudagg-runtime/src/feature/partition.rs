//! Grouping-key partitioning
//!
//! A `GroupPartition` is the time-sorted slice of the input that shares one
//! grouping-key value. Partitions are owned by a single aggregation call and
//! dropped once their results are merged back.

use super::orderer::TimeOrderer;
use crate::error::{Result, RuntimeError};
use fraudagg_core::{Table, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Totally ordered grouping-key value
///
/// Partitions are emitted in ascending `GroupKey` order, which fixes the row
/// order of every merged result. Integral floats share the key of the equal
/// integer, and integer and float keys interleave in numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Bool(bool),
    Int(i64),
    /// Non-integral f64 mapped to an integer with the same total order
    Float(i64),
    Text(String),
    /// Microseconds since the Unix epoch
    Time(i64),
}

impl GroupKey {
    /// Key for a cell; `None` for `Value::Null`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(GroupKey::Bool(*b)),
            Value::Integer(i) => Some(GroupKey::Int(*i)),
            Value::Number(n) if is_integral(*n) => Some(GroupKey::Int(*n as i64)),
            Value::Number(n) => Some(GroupKey::Float(float_order_key(*n))),
            Value::String(s) => Some(GroupKey::Text(s.clone())),
            Value::Timestamp(ts) => Some(GroupKey::Time(ts.timestamp_micros())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Bool(_) => 0,
            GroupKey::Int(_) | GroupKey::Float(_) => 1,
            GroupKey::Text(_) => 2,
            GroupKey::Time(_) => 3,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Int(a), GroupKey::Float(b)) => (*a as f64)
                .total_cmp(&float_from_order_key(*b))
                .then(Ordering::Less),
            (GroupKey::Float(a), GroupKey::Int(b)) => float_from_order_key(*a)
                .total_cmp(&(*b as f64))
                .then(Ordering::Greater),
            (GroupKey::Bool(a), GroupKey::Bool(b)) => a.cmp(b),
            (GroupKey::Int(a), GroupKey::Int(b)) => a.cmp(b),
            (GroupKey::Float(a), GroupKey::Float(b)) => a.cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            (GroupKey::Time(a), GroupKey::Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Int(i) => write!(f, "{}", i),
            GroupKey::Float(bits) => write!(f, "{}", float_from_order_key(*bits)),
            GroupKey::Text(s) => write!(f, "{}", s),
            GroupKey::Time(micros) => write!(f, "{}us", micros),
        }
    }
}

// Whole numbers inside the i64 range; 2^63 itself is out of range
fn is_integral(value: f64) -> bool {
    value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

// Flips the magnitude bits of negative floats so that signed integer order
// matches f64::total_cmp. Both zeros map to the key of +0.0.
fn float_order_key(value: f64) -> i64 {
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits() as i64;
    bits ^ (((bits >> 63) as u64) >> 1) as i64
}

fn float_from_order_key(key: i64) -> f64 {
    let bits = key ^ (((key >> 63) as u64) >> 1) as i64;
    f64::from_bits(bits as u64)
}

/// All rows sharing one grouping-key value, sorted by time
#[derive(Debug, Clone)]
pub struct GroupPartition {
    /// Grouping-key value shared by every row
    pub key: GroupKey,

    /// The rows, ascending by timestamp, ties in input order
    pub table: Table,

    /// Row timestamps in microseconds, aligned with `table`
    pub timestamps: Vec<i64>,
}

impl GroupPartition {
    /// Number of rows in the partition
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the partition holds no rows
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Split a table by `grouping_key` into time-sorted partitions, in ascending
/// key order.
///
/// A null grouping key is a schema error. A partition with zero rows cannot be
/// produced by grouping; if one appears it is reported as
/// `EmptyPartitionError` rather than silently skipped.
pub fn partition_by(
    table: &Table,
    grouping_key: &str,
    datetime_col: &str,
) -> Result<Vec<GroupPartition>> {
    let keys = table.column(grouping_key)?;
    let timestamps = TimeOrderer::timestamps(table, datetime_col)?;

    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (row, value) in keys.values.iter().enumerate() {
        let key = GroupKey::from_value(value).ok_or_else(|| {
            RuntimeError::SchemaError(format!(
                "Grouping column '{}' contains null at row {}",
                grouping_key, row
            ))
        })?;
        groups.entry(key).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(key, rows)| {
            if rows.is_empty() {
                return Err(RuntimeError::EmptyPartitionError(format!(
                    "{}={}",
                    grouping_key, key
                )));
            }

            let local: Vec<i64> = rows.iter().map(|&r| timestamps[r]).collect();
            let order: Vec<usize> = TimeOrderer::sort_order(&local)
                .into_iter()
                .map(|i| rows[i])
                .collect();

            Ok(GroupPartition {
                key,
                timestamps: order.iter().map(|&r| timestamps[r]).collect(),
                table: table.take(&order)?,
            })
        })
        .collect()
}
