use chrono::{NaiveDate, NaiveDateTime};
use herald_agent::{ContentGenerator, Deliverer};
use herald_core::history::HistoryStore;
use herald_core::ledger::DispatchLedger;
use herald_core::pool::PoolSet;
use herald_core::random::{Chooser, RandomChooser};
use herald_core::schedule::DispatchWindow;
use herald_core::selector::Selector;
use herald_core::stats::Stats;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Local wall-clock time. Calendar days are taken in the process time zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Exists for tests that need to
/// pin the calendar day.
#[doc(hidden)]
pub struct FixedClock(Mutex<NaiveDateTime>);

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: NaiveDateTime) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = at;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared handles passed to the scheduler, the executor and every command
/// surface. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<Selector>,
    pub history: Arc<HistoryStore>,
    pub ledger: Arc<DispatchLedger>,
    pub generator: Arc<dyn ContentGenerator>,
    pub deliverer: Arc<dyn Deliverer>,
    pub clock: Arc<dyn Clock>,
    pub window: DispatchWindow,
    /// Held across the whole ledger-gated dispatch so concurrent triggers
    /// deliver at most once per day.
    pub dispatch_gate: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Wire the stores under `data_dir` with the system clock, the default
    /// window and OS-seeded randomness.
    pub fn new(
        pools: PoolSet,
        data_dir: &Path,
        generator: Arc<dyn ContentGenerator>,
        deliverer: Arc<dyn Deliverer>,
    ) -> Self {
        let pools = Arc::new(pools);
        let history = Arc::new(HistoryStore::in_dir(data_dir));
        let ledger = Arc::new(DispatchLedger::in_dir(data_dir));
        let selector = Arc::new(Selector::new(
            pools,
            Arc::clone(&history),
            Box::new(RandomChooser::new()),
        ));
        Self {
            selector,
            history,
            ledger,
            generator,
            deliverer,
            clock: Arc::new(SystemClock),
            window: DispatchWindow::default(),
            dispatch_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_window(mut self, window: DispatchWindow) -> Self {
        self.window = window;
        self
    }

    /// Replace the selection randomness; history and pools are kept.
    pub fn with_chooser(mut self, chooser: Box<dyn Chooser>) -> Self {
        let pools = Arc::new(self.selector.pools().clone());
        self.selector = Arc::new(Selector::new(pools, Arc::clone(&self.history), chooser));
        self
    }

    pub fn stats(&self) -> herald_core::Result<Stats> {
        Stats::collect(&self.history, &self.ledger, self.clock.today())
    }
}
