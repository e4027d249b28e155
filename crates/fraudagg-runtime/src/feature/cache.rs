//! Feature result memoization
//!
//! Computed tables are stored under a content hash of the input table and the
//! call parameters, so identical calls are answered without recomputation.
//!
//! The store never evicts: every distinct input stays resident until `clear`
//! is called.

use crate::error::{Result, RuntimeError};
use fraudagg_core::{Table, Value};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Cache hit/miss statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the store
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Hashed form of a table; untagged cells carry their type so that a text
/// cell never collides with a timestamp rendering the same string
#[derive(Serialize)]
struct TypedTable<'a> {
    index_name: &'a str,
    index: &'a [u64],
    columns: Vec<(&'a str, Vec<(&'static str, &'a Value)>)>,
}

impl<'a> TypedTable<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            index_name: &table.index_name,
            index: &table.index,
            columns: table
                .columns
                .iter()
                .map(|c| {
                    let cells = c.values.iter().map(|v| (v.type_name(), v)).collect();
                    (c.name.as_str(), cells)
                })
                .collect(),
        }
    }
}

/// Write-through cache of computed feature tables
#[derive(Debug, Default)]
pub struct FeatureCache {
    store: RwLock<HashMap<String, Table>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FeatureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: hex SHA-256 over the serialized table (cell types
    /// included), the operation name and the serialized call parameters.
    pub fn key<P>(table: &Table, operation: &str, params: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let table_json = serde_json::to_vec(&TypedTable::new(table)).map_err(|e| {
            RuntimeError::SchemaError(format!("Table cannot be serialized for hashing: {}", e))
        })?;
        let params_json = serde_json::to_vec(params).map_err(|e| {
            RuntimeError::ConfigError(format!("Parameters cannot be serialized for hashing: {}", e))
        })?;

        let mut hasher = Sha256::new();
        hasher.update(b"table:");
        hasher.update(&table_json);
        hasher.update(b";operation:");
        hasher.update(operation.as_bytes());
        hasher.update(b";params:");
        hasher.update(&params_json);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Look up a stored table, counting the hit or miss
    pub fn get(&self, key: &str) -> Option<Table> {
        let found = self
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Store a table under `key`
    pub fn insert(&self, key: impl Into<String>, table: Table) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), table);
    }

    /// Return the stored table for `key`, or compute, store and return it.
    ///
    /// A failed computation stores nothing.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Table>
    where
        F: FnOnce() -> Result<Table>,
    {
        if let Some(table) = self.get(key) {
            debug!(key, "Feature cache hit");
            return Ok(table);
        }

        debug!(key, "Feature cache miss");
        let table = compute()?;
        self.insert(key, table.clone());
        Ok(table)
    }

    /// Number of stored tables
    pub fn len(&self) -> usize {
        self.store.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Drop every stored table and reset the statistics
    pub fn clear(&self) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Log the current statistics
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            entries = stats.entries,
            hit_rate = stats.hit_rate(),
            "Feature cache statistics"
        );
    }
}
