//! Time-limited memo for calendar conversions
//!
//! Lets several pair comparisons over overlapping history share the work of
//! converting the same Gregorian keys. The cache is an explicit value owned
//! by the caller; nothing is kept between calls unless the caller keeps it.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A converted value with the time it was produced
#[derive(Clone, Debug, PartialEq)]
pub struct CachedConversion {
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl CachedConversion {
    pub fn new(value: String, created_at: DateTime<Utc>) -> Self {
        Self { value, created_at }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// Keyed memo with a fixed time-to-live
#[derive(Debug)]
pub struct ConversionCache {
    entries: HashMap<String, CachedConversion>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl ConversionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `key`, or compute, store and return it
    ///
    /// Errors from `compute` are returned as-is and nothing is stored.
    pub fn get_or_compute<F>(&mut self, key: &str, compute: F) -> Result<String>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        self.get_or_compute_at(key, Utc::now(), compute)
    }

    /// Same as [`get_or_compute`](Self::get_or_compute) with an explicit clock reading
    pub fn get_or_compute_at<F>(&mut self, key: &str, now: DateTime<Utc>, compute: F) -> Result<String>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now, self.ttl) {
                self.hits += 1;
                return Ok(entry.value.clone());
            }
        }

        self.misses += 1;
        let value = compute(key)?;
        self.entries
            .insert(key.to_string(), CachedConversion::new(value.clone(), now));
        Ok(value)
    }

    /// Drop entries older than the TTL
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
