//! The daily scheduling loop.
//!
//! ```text
//! COMPUTING_TARGET ──▶ SLEEPING ──▶ FIRING ──┐
//!        ▲                                    │
//!        └────────────────────────────────────┘
//! ```
//!
//! The fire time is re-planned on every iteration (and therefore after every
//! restart) from the ledger and the clock alone; it is never persisted.
//! Cancellation aborts a sleep without firing. A fire already in flight is
//! allowed up to [`SHUTDOWN_GRACE`] to finish so a delivered message still
//! gets its ledger entry. A failed delivery only ends the current cycle; a
//! storage failure ends the loop with an error.

use std::time::Duration;

use herald_core::random::{Chooser, RandomChooser};
use herald_core::schedule::{plan_next, FirePlan};
use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;
use crate::executor::{Executor, RunOutcome};
use crate::state::AppState;

/// How long shutdown waits for an in-flight dispatch.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub struct Scheduler {
    state: AppState,
    executor: Executor,
    chooser: Box<dyn Chooser>,
}

impl Scheduler {
    pub fn new(state: AppState) -> Self {
        Self {
            executor: Executor::new(state.clone()),
            state,
            chooser: Box::new(RandomChooser::new()),
        }
    }

    /// Replace the randomness used for fire-time draws.
    pub fn with_chooser(mut self, chooser: Box<dyn Chooser>) -> Self {
        self.chooser = chooser;
        self
    }

    /// COMPUTING_TARGET: plan the next fire time from the clock and ledger.
    pub fn plan(&mut self) -> Result<FirePlan, DispatchError> {
        let now = self.state.clock.now();
        let completed_today = self.state.ledger.was_completed_on(now.date())?;
        Ok(plan_next(
            now,
            completed_today,
            &self.state.window,
            self.chooser.as_mut(),
        ))
    }

    /// Run until `cancel` fires or a storage error occurs.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), DispatchError> {
        tracing::info!(window = %self.state.window, "scheduler started");
        loop {
            let plan = self.plan()?;
            let wait = plan.wait_from(self.state.clock.now());
            tracing::info!(
                fire_at = %plan.target,
                reason = ?plan.reason,
                "next dispatch in {:.2} h",
                wait.as_secs_f64() / 3600.0
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            let firing = fire(&self.state, &self.executor);
            tokio::pin!(firing);
            tokio::select! {
                res = &mut firing => res?,
                _ = cancel.cancelled() => {
                    tracing::info!("shutdown requested during dispatch, letting it finish");
                    match tokio::time::timeout(SHUTDOWN_GRACE, &mut firing).await {
                        Ok(res) => res?,
                        Err(_) => tracing::warn!(
                            "dispatch still running after {}s, abandoning it",
                            SHUTDOWN_GRACE.as_secs()
                        ),
                    }
                    break;
                }
            }
        }
        tracing::info!("scheduler stopped");
        Ok(())
    }
}

/// FIRING: re-check the ledger, then dispatch.
///
/// Takes the shared handles only; the scheduler's chooser is not `Sync`.
async fn fire(state: &AppState, executor: &Executor) -> Result<(), DispatchError> {
    let today = state.clock.today();
    if state.ledger.was_completed_on(today)? {
        tracing::info!(%today, "woke up but today's dispatch is already recorded");
        return Ok(());
    }
    match executor.run_once().await {
        Ok(RunOutcome::Delivered { composed, .. }) if composed.fallback => {
            tracing::warn!("dispatched with fallback text");
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) if e.is_fatal() => {
            tracing::error!(error = %e, "dispatch hit a storage failure, stopping scheduler");
            Err(e)
        }
        Err(e) => {
            tracing::warn!(error = %e, "dispatch failed, will retry on a later cycle");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
