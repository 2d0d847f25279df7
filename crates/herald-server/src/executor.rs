//! Turns two selections into a delivered message.
//!
//! `run_once` is the ledger-gated daily path; `run_now` composes without
//! consulting or touching the ledger and leaves delivery to the caller.
//! Store mutations are serialized inside the stores. `run_once` additionally
//! holds the shared dispatch gate from the ledger check to the ledger write,
//! so a second concurrent caller waits and then sees the day as done.

use chrono::NaiveDate;
use herald_core::PoolKind;
use serde::Serialize;

use crate::error::DispatchError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composed {
    pub location: String,
    pub subject: String,
    pub text: String,
    /// `true` when the generator failed and the fallback text was used.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The ledger already records a dispatch for `date`.
    Skipped { date: NaiveDate },
    Delivered {
        date: NaiveDate,
        #[serde(flatten)]
        composed: Composed,
    },
}

#[derive(Clone)]
pub struct Executor {
    state: AppState,
}

impl Executor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Pick a location and a subject, then generate text for them.
    pub async fn compose(&self) -> Result<Composed, DispatchError> {
        let location = self.state.selector.pick(PoolKind::Location)?;
        let subject = self.state.selector.pick(PoolKind::Subject)?;
        let (text, fallback) = self
            .state
            .generator
            .generate(&location, &subject)
            .await
            .text_or_fallback(&location, &subject);
        if fallback {
            tracing::warn!(%location, %subject, "using fallback text");
        }
        Ok(Composed {
            location,
            subject,
            text,
            fallback,
        })
    }

    /// The daily dispatch: at most one successful delivery per calendar day.
    ///
    /// A delivery error is returned as-is and the ledger is not marked, so a
    /// later cycle retries the same day.
    pub async fn run_once(&self) -> Result<RunOutcome, DispatchError> {
        let _gate = self.state.dispatch_gate.lock().await;
        let today = self.state.clock.today();
        if self.state.ledger.was_completed_on(today)? {
            tracing::info!(%today, "already dispatched today, skipping");
            return Ok(RunOutcome::Skipped { date: today });
        }

        let composed = self.compose().await?;
        self.state
            .deliverer
            .send(&composed.text)
            .await
            .map_err(DispatchError::Delivery)?;
        self.state.ledger.mark_completed(today)?;
        tracing::info!(%today, location = %composed.location, subject = %composed.subject, "dispatched");
        Ok(RunOutcome::Delivered {
            date: today,
            composed,
        })
    }

    /// Manual trigger: same selection and generation, no ledger gate, no
    /// ledger write. May run any number of times per day.
    pub async fn run_now(&self) -> Result<Composed, DispatchError> {
        self.compose().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, fixture};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn run_once_delivers_and_marks_ledger() {
        let fx = fixture(at(16, 12, 0));
        let outcome = Executor::new(fx.state.clone()).run_once().await.unwrap();

        let RunOutcome::Delivered { date, composed } = outcome else {
            panic!("expected Delivered")
        };
        assert_eq!(date, at(16, 0, 0).date());
        assert_eq!(composed.location, "Tver");
        assert_eq!(composed.subject, "pen");
        assert!(!composed.fallback);
        assert_eq!(fx.deliverer.sent(), ["news from Tver about pen"]);
        assert!(fx.state.ledger.was_completed_on(date).unwrap());
    }

    #[tokio::test]
    async fn run_once_twice_same_day_delivers_once() {
        let fx = fixture(at(16, 12, 0));
        let exec = Executor::new(fx.state.clone());
        exec.run_once().await.unwrap();
        let second = exec.run_once().await.unwrap();

        assert!(matches!(second, RunOutcome::Skipped { .. }));
        assert_eq!(fx.deliverer.sent().len(), 1);
        // The skip happens before any selection.
        assert_eq!(fx.state.history.load().unwrap().cities, ["Tver"]);
    }

    #[tokio::test]
    async fn concurrent_run_once_delivers_once() {
        let fx = fixture(at(16, 12, 0));
        fx.deliverer.delay_ms.store(50, Ordering::SeqCst);
        let a = Executor::new(fx.state.clone());
        let b = a.clone();

        let (first, second) = tokio::join!(a.run_once(), b.run_once());
        let outcomes = [first.unwrap(), second.unwrap()];
        let delivered = outcomes
            .iter()
            .filter(|o| matches!(o, RunOutcome::Delivered { .. }))
            .count();
        assert_eq!(delivered, 1);
        assert!(outcomes
            .iter()
            .any(|o| matches!(o, RunOutcome::Skipped { .. })));
        assert_eq!(fx.deliverer.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(fx.deliverer.sent().len(), 1);
    }

    #[tokio::test]
    async fn run_once_next_day_delivers_again() {
        let fx = fixture(at(16, 12, 0));
        let exec = Executor::new(fx.state.clone());
        exec.run_once().await.unwrap();
        fx.clock.set(at(17, 11, 30));
        exec.run_once().await.unwrap();

        assert_eq!(
            fx.deliverer.sent(),
            ["news from Tver about pen", "news from Kimry about pencil"]
        );
        assert_eq!(
            fx.state.ledger.last_completed_date().unwrap(),
            Some(at(17, 0, 0).date())
        );
    }

    #[tokio::test]
    async fn generator_failure_sends_fallback() {
        let fx = fixture(at(16, 12, 0));
        fx.generator.fail.store(true, Ordering::SeqCst);

        let outcome = Executor::new(fx.state.clone()).run_once().await.unwrap();
        let RunOutcome::Delivered { composed, .. } = outcome else {
            panic!("expected Delivered")
        };
        assert!(composed.fallback);

        let sent = fx.deliverer.sent();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].is_empty());
        assert!(sent[0].contains("Tver"));
        assert!(sent[0].contains("pen"));
        assert!(fx.state.ledger.was_completed_on(at(16, 0, 0).date()).unwrap());
    }

    #[tokio::test]
    async fn delivery_failure_leaves_ledger_unmarked() {
        let fx = fixture(at(16, 12, 0));
        fx.deliverer.fail.store(true, Ordering::SeqCst);
        let exec = Executor::new(fx.state.clone());

        let err = exec.run_once().await.unwrap_err();
        assert!(matches!(err, DispatchError::Delivery(_)));
        assert!(!err.is_fatal());
        assert_eq!(fx.state.ledger.last_completed_date().unwrap(), None);

        // A retry the same day goes through once delivery recovers.
        fx.deliverer.fail.store(false, Ordering::SeqCst);
        let outcome = exec.run_once().await.unwrap();
        assert!(matches!(outcome, RunOutcome::Delivered { .. }));
        assert_eq!(fx.deliverer.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn run_now_bypasses_ledger() {
        let fx = fixture(at(16, 12, 0));
        let exec = Executor::new(fx.state.clone());
        exec.run_once().await.unwrap();

        let first = exec.run_now().await.unwrap();
        let second = exec.run_now().await.unwrap();
        assert_eq!(first.location, "Kimry");
        assert_eq!(second.location, "Uglich");
        // run_now leaves delivery to its caller and never writes the ledger.
        assert_eq!(fx.deliverer.sent().len(), 1);
        assert_eq!(
            fx.state.ledger.last_completed_date().unwrap(),
            Some(at(16, 0, 0).date())
        );
    }

    #[tokio::test]
    async fn corrupt_history_is_fatal() {
        let fx = fixture(at(16, 12, 0));
        std::fs::create_dir_all(fx.dir.path().join("bot_data")).unwrap();
        std::fs::write(fx.state.history.path(), "{oops").unwrap();

        let err = Executor::new(fx.state.clone()).run_once().await.unwrap_err();
        assert!(err.is_fatal(), "got: {err}");
        assert!(fx.deliverer.sent().is_empty());
    }

    #[test]
    fn outcome_serializes_flat() {
        let outcome = RunOutcome::Delivered {
            date: at(16, 0, 0).date(),
            composed: Composed {
                location: "Tver".into(),
                subject: "pen".into(),
                text: "t".into(),
                fallback: false,
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "delivered");
        assert_eq!(json["location"], "Tver");
        assert_eq!(json["date"], "2026-10-16");
    }
}
