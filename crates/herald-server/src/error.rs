use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use herald_agent::AgentError;
use herald_core::HeraldError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Failure of a single dispatch attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// History or ledger could not be read or written.
    #[error(transparent)]
    Storage(#[from] HeraldError),

    /// The deliverer rejected the message; the ledger was left untouched.
    #[error("delivery failed: {0}")]
    Delivery(#[source] AgentError),
}

impl DispatchError {
    /// Severe enough to stop the scheduler.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchError::Storage(e) if e.is_storage())
    }
}

// ---------------------------------------------------------------------------
// AppError: HTTP error responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<DispatchError>() {
            Some(DispatchError::Delivery(_)) => StatusCode::BAD_GATEWAY,
            Some(DispatchError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn corrupt() -> HeraldError {
        HeraldError::CorruptState {
            path: PathBuf::from("bot_data/history.json"),
            reason: "EOF".into(),
        }
    }

    #[test]
    fn storage_is_fatal_delivery_is_not() {
        assert!(DispatchError::Storage(corrupt()).is_fatal());
        let delivery = DispatchError::Delivery(AgentError::Config("no token".into()));
        assert!(!delivery.is_fatal());
    }

    #[test]
    fn delivery_maps_to_502() {
        let err: AppError = DispatchError::Delivery(AgentError::EmptyCompletion).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn storage_maps_to_500() {
        let err: AppError = DispatchError::Storage(corrupt()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
