//! Persisted selection history with exhaustion reset.
//!
//! On disk this is a single JSON record:
//!
//! ```text
//! { "cities": ["Uglich", ...], "items": ["pen", ...] }
//! ```
//!
//! Locations live under `cities`, subjects under `items`. Matching against a
//! pool is case-insensitive; stored values are never rewritten. Every
//! mutation is a locked read-modify-write followed by an atomic replace of
//! the file, so concurrent callers in one process cannot lose updates and a
//! crash mid-write leaves the previous record intact.

use crate::error::{HeraldError, Result};
use crate::io;
use crate::paths;
use crate::types::PoolKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// HistoryState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl HistoryState {
    pub fn used(&self, kind: PoolKind) -> &[String] {
        match kind {
            PoolKind::Location => &self.cities,
            PoolKind::Subject => &self.items,
        }
    }

    fn used_mut(&mut self, kind: PoolKind) -> &mut Vec<String> {
        match kind {
            PoolKind::Location => &mut self.cities,
            PoolKind::Subject => &mut self.items,
        }
    }

    /// `candidates` minus everything already used for `kind`, compared
    /// case-insensitively. Preserves candidate order.
    pub fn available(&self, kind: PoolKind, candidates: &[String]) -> Vec<String> {
        let used: HashSet<String> = self.used(kind).iter().map(|v| v.to_lowercase()).collect();
        candidates
            .iter()
            .filter(|c| !used.contains(&c.to_lowercase()))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// HistoryStore
// ---------------------------------------------------------------------------

pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the default `history.json` location inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(paths::history_path(data_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current history; the empty default when nothing has been persisted.
    pub fn load(&self) -> Result<HistoryState> {
        let Some(data) = io::read_optional(&self.path)? else {
            return Ok(HistoryState::default());
        };
        serde_json::from_str(&data).map_err(|e| HeraldError::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Append `value` to the history for `kind` and persist before returning.
    pub fn record(&self, kind: PoolKind, value: &str) -> Result<()> {
        let _guard = self.guard()?;
        let mut state = self.load()?;
        state.used_mut(kind).push(value.to_string());
        self.save(&state)
    }

    /// Candidates not yet used for `kind`. When every candidate has been
    /// used the history for `kind` is cleared (and persisted) and the full
    /// candidate list is returned.
    pub fn reset_if_exhausted(&self, kind: PoolKind, candidates: &[String]) -> Result<Vec<String>> {
        let _guard = self.guard()?;
        let mut state = self.load()?;
        self.available_or_reset(&mut state, kind, candidates)
    }

    /// Filter, choose and record as one locked transaction.
    ///
    /// `choose` receives the non-empty available slice and returns an index
    /// into it; out-of-range indices are clamped to the last element.
    pub fn select<F>(&self, kind: PoolKind, candidates: &[String], choose: F) -> Result<String>
    where
        F: FnOnce(&[String]) -> usize,
    {
        let _guard = self.guard()?;
        let mut state = self.load()?;
        let available = self.available_or_reset(&mut state, kind, candidates)?;
        if available.is_empty() {
            return Err(HeraldError::EmptyPool(kind));
        }
        let idx = choose(&available).min(available.len() - 1);
        let chosen = available[idx].clone();
        state.used_mut(kind).push(chosen.clone());
        self.save(&state)?;
        Ok(chosen)
    }

    fn available_or_reset(
        &self,
        state: &mut HistoryState,
        kind: PoolKind,
        candidates: &[String],
    ) -> Result<Vec<String>> {
        let available = state.available(kind, candidates);
        if !available.is_empty() {
            return Ok(available);
        }
        tracing::info!(
            kind = %kind,
            used = state.used(kind).len(),
            "pool exhausted, resetting history"
        );
        state.used_mut(kind).clear();
        self.save(state)?;
        Ok(candidates.to_vec())
    }

    fn save(&self, state: &HistoryState) -> Result<()> {
        let data = serde_json::to_string_pretty(state)?;
        io::atomic_write(&self.path, data.as_bytes())
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| HeraldError::LockPoisoned("history"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
