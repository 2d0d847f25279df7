//! Fakes shared by the unit tests in this crate.

use crate::state::{AppState, Clock, FixedClock};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use herald_agent::{AgentError, ContentGenerator, Deliverer, Generation};
use herald_core::pool::{Pool, PoolSet};
use herald_core::random::FirstAvailable;
use herald_core::PoolKind;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub(crate) fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, location: &str, subject: &str) -> Generation {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Generation::Failed("service unavailable".into())
        } else {
            Generation::Text(format!("news from {location} about {subject}"))
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingDeliverer {
    pub fail: AtomicBool,
    pub attempts: AtomicUsize,
    /// Milliseconds each send spends in flight before completing.
    pub delay_ms: AtomicU64,
    pub sent: Mutex<Vec<String>>,
}

impl RecordingDeliverer {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Deliverer for RecordingDeliverer {
    async fn send(&self, text: &str) -> herald_agent::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AgentError::Telegram {
                method: "sendMessage",
                status: Some(502),
                description: "Bad Gateway".into(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Follows tokio's (possibly paused) clock from a fixed local start time.
pub(crate) struct TokioClock {
    base: NaiveDateTime,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: NaiveDateTime) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = tokio::time::Instant::now() - self.start;
        self.base + chrono::Duration::from_std(elapsed).unwrap()
    }
}

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub generator: Arc<ScriptedGenerator>,
    pub deliverer: Arc<RecordingDeliverer>,
}

pub(crate) fn pools() -> PoolSet {
    let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    PoolSet::new(
        Pool::new(PoolKind::Location, strings(&["Tver", "Kimry", "Uglich"])).unwrap(),
        Pool::new(PoolKind::Subject, strings(&["pen", "pencil"])).unwrap(),
    )
}

/// Stores in a temp dir, first-available selection, a fixed clock at `now`.
pub(crate) fn fixture(now: NaiveDateTime) -> Fixture {
    let dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let deliverer = Arc::new(RecordingDeliverer::default());
    let clock = Arc::new(FixedClock::new(now));
    let state = AppState::new(
        pools(),
        &dir.path().join("bot_data"),
        generator.clone(),
        deliverer.clone(),
    )
    .with_clock(clock.clone())
    .with_chooser(Box::new(FirstAvailable));
    Fixture {
        dir,
        state,
        clock,
        generator,
        deliverer,
    }
}
