use axum::extract::State;
use axum::Json;

use crate::error::{AppError, DispatchError};
use crate::executor::{Composed, Executor, RunOutcome};
use crate::state::AppState;

/// POST /api/dispatch/run-now: compose and deliver immediately.
///
/// The ledger is neither consulted nor written, so this can run any number
/// of times a day without affecting the scheduled dispatch.
pub async fn run_now(State(app): State<AppState>) -> Result<Json<Composed>, AppError> {
    let composed = Executor::new(app.clone()).run_now().await?;
    app.deliverer
        .send(&composed.text)
        .await
        .map_err(DispatchError::Delivery)?;
    tracing::info!(location = %composed.location, subject = %composed.subject, "manual dispatch delivered");
    Ok(Json(composed))
}

/// POST /api/dispatch/run-once: the ledger-gated daily dispatch.
///
/// Returns `{"outcome":"skipped"}` if today is already recorded.
pub async fn run_once(State(app): State<AppState>) -> Result<Json<RunOutcome>, AppError> {
    let outcome = Executor::new(app).run_once().await?;
    Ok(Json(outcome))
}
