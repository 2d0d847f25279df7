//! Read-only candidate pools.
//!
//! Two JSON sources feed the selector:
//!
//! - locations: `[{"name": "Uglich", ...}, ...]`, optionally wrapped as
//!   `{"cities": [...]}`; only `name` is load-bearing.
//! - subjects: `["pen", "pencil", ...]`.
//!
//! A `Pool` is never empty. Loading an empty source is a config error so the
//! exhaustion-reset logic can assume at least one candidate.

use crate::config::Config;
use crate::error::{HeraldError, Result};
use crate::types::PoolKind;
use serde_json::Value;
use std::path::Path;

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    entries: Vec<String>,
}

impl Pool {
    pub fn new(kind: PoolKind, entries: Vec<String>) -> Result<Self> {
        if entries.is_empty() {
            return Err(HeraldError::EmptyPool(kind));
        }
        Ok(Self { entries })
    }

    /// Read and validate the pool source at `path`.
    pub fn load(kind: PoolKind, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HeraldError::PoolNotFound {
                kind,
                path: path.to_path_buf(),
            });
        }
        let malformed = |reason: String| HeraldError::MalformedPool {
            kind,
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        let value: Value = serde_json::from_str(&data).map_err(|e| malformed(e.to_string()))?;
        let entries = match kind {
            PoolKind::Location => parse_locations(value),
            PoolKind::Subject => parse_subjects(value),
        }
        .map_err(malformed)?;
        let pool = Self::new(kind, entries)?;
        tracing::debug!(kind = %kind, size = pool.len(), path = %path.display(), "pool loaded");
        Ok(pool)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_locations(value: Value) -> std::result::Result<Vec<String>, String> {
    let value = match value {
        Value::Object(mut map) if map.contains_key("cities") => map
            .remove("cities")
            .unwrap_or(Value::Null),
        other => other,
    };
    let Value::Array(items) = value else {
        return Err("expected an array of objects with a 'name' field".into());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item.get("name") {
            Some(Value::String(name)) => Ok(name.clone()),
            Some(_) => Err(format!("element {i}: 'name' must be a string")),
            None => Err(format!("element {i}: missing 'name' field")),
        })
        .collect()
}

fn parse_subjects(value: Value) -> std::result::Result<Vec<String>, String> {
    let Value::Array(items) = value else {
        return Err("expected an array of strings".into());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s),
            _ => Err(format!("element {i}: expected a string")),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PoolSet
// ---------------------------------------------------------------------------

/// Both pools, loaded once at startup.
#[derive(Debug, Clone)]
pub struct PoolSet {
    pub locations: Pool,
    pub subjects: Pool,
}

impl PoolSet {
    pub fn new(locations: Pool, subjects: Pool) -> Self {
        Self {
            locations,
            subjects,
        }
    }

    /// Load both pools from the paths named in `config`, relative to `root`.
    pub fn load(config: &Config, root: &Path) -> Result<Self> {
        let locations = Pool::load(PoolKind::Location, &config.locations_path(root))?;
        let subjects = Pool::load(PoolKind::Subject, &config.subjects_path(root))?;
        Ok(Self::new(locations, subjects))
    }

    pub fn get(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Location => &self.locations,
            PoolKind::Subject => &self.subjects,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
