use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stats: history sizes and the last recorded dispatch.
pub async fn get_stats(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let stats = app.stats()?;
        let json = serde_json::to_value(&stats)?;
        Ok::<_, herald_core::HeraldError>(json)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
