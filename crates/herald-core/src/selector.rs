use crate::error::{HeraldError, Result};
use crate::history::HistoryStore;
use crate::pool::PoolSet;
use crate::random::Chooser;
use crate::types::PoolKind;
use std::sync::{Arc, Mutex};

/// Non-repeating random picks over the configured pools.
///
/// Each `pick` runs the filter / choose / record sequence as one locked
/// transaction on the history store.
pub struct Selector {
    pools: Arc<PoolSet>,
    history: Arc<HistoryStore>,
    chooser: Mutex<Box<dyn Chooser>>,
}

impl Selector {
    pub fn new(pools: Arc<PoolSet>, history: Arc<HistoryStore>, chooser: Box<dyn Chooser>) -> Self {
        Self {
            pools,
            history,
            chooser: Mutex::new(chooser),
        }
    }

    pub fn pools(&self) -> &PoolSet {
        &self.pools
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Choose a value for `kind` not used since the last reset and record it.
    pub fn pick(&self, kind: PoolKind) -> Result<String> {
        let pool = self.pools.get(kind);
        let mut chooser = self
            .chooser
            .lock()
            .map_err(|_| HeraldError::LockPoisoned("chooser"))?;
        let chosen = self
            .history
            .select(kind, pool.entries(), |available| chooser.choose(available.len()))?;
        tracing::info!(kind = %kind, value = %chosen, "selected");
        Ok(chosen)
    }
}
