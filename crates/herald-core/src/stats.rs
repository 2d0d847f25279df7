use crate::error::Result;
use crate::history::HistoryStore;
use crate::ledger::DispatchLedger;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Read-only snapshot of history sizes and the last dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub locations_used: usize,
    pub subjects_used: usize,
    pub last_dispatch: Option<NaiveDate>,
    pub dispatched_today: bool,
}

impl Stats {
    pub fn collect(history: &HistoryStore, ledger: &DispatchLedger, today: NaiveDate) -> Result<Self> {
        let state = history.load()?;
        let last_dispatch = ledger.last_completed_date()?;
        Ok(Self {
            locations_used: state.cities.len(),
            subjects_used: state.items.len(),
            last_dispatch,
            dispatched_today: last_dispatch == Some(today),
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Locations used: {}", self.locations_used)?;
        writeln!(f, "📦 Subjects used: {}", self.subjects_used)?;
        match self.last_dispatch {
            Some(d) => writeln!(f, "📅 Last dispatch: {d}")?,
            None => writeln!(f, "📅 Last dispatch: never")?,
        }
        write!(
            f,
            "✅ Today: {}",
            if self.dispatched_today { "yes" } else { "no" }
        )
    }
}
