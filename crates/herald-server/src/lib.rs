pub mod commands;
pub mod error;
pub mod executor;
pub mod routes;
pub mod scheduler;
pub mod state;

#[cfg(test)]
mod test_support;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use herald_agent::TelegramClient;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::commands::CommandPoller;
use crate::scheduler::Scheduler;
use crate::state::AppState;

/// Build the axum Router for the control API.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/stats", get(routes::stats::get_stats))
        .route("/api/dispatch/run-now", post(routes::dispatch::run_now))
        .route("/api/dispatch/run-once", post(routes::dispatch::run_once))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the control API on a pre-bound listener until `cancel` fires.
///
/// Taking a bound listener lets the caller read the actual port first
/// (useful when binding port 0).
pub async fn serve_on(
    state: AppState,
    listener: TcpListener,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    tracing::info!("control API listening on http://localhost:{port}");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    Ok(())
}

/// Cancel `cancel` once `signal` resolves successfully.
///
/// A signal handler that fails to install is logged and leaves the daemon
/// running; only a delivered interrupt shuts it down.
pub async fn cancel_on<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("interrupt received, shutting down");
            cancel.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "cannot listen for interrupts, ignoring"),
    }
}

/// Optional surfaces started next to the scheduler.
#[derive(Default)]
pub struct DaemonOptions {
    /// Telegram client and long-poll timeout for the command poller.
    pub commands: Option<(Arc<TelegramClient>, u64)>,
    /// Bound listener for the control API.
    pub control: Option<TcpListener>,
}

/// Run the scheduler plus any enabled surfaces until `cancel` fires.
///
/// A storage failure in the scheduler cancels every other task and is
/// returned as the error.
pub async fn run_daemon(
    state: AppState,
    opts: DaemonOptions,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut tasks: Vec<tokio::task::JoinHandle<anyhow::Result<()>>> = Vec::new();

    if let Some((client, timeout_secs)) = opts.commands {
        let poller = CommandPoller::new(state.clone(), client, timeout_secs);
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move {
            poller.run(token).await;
            Ok(())
        }));
    }

    if let Some(listener) = opts.control {
        let server_state = state.clone();
        let token = cancel.clone();
        tasks.push(tokio::spawn(async move {
            serve_on(server_state, listener, token).await
        }));
    }

    let result = Scheduler::new(state).run(cancel.clone()).await;
    cancel.cancel();

    for task in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "surface stopped with error"),
            Err(e) => tracing::warn!(error = %e, "surface task panicked"),
        }
    }

    result.map_err(anyhow::Error::from)
}
