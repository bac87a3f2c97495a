//! Signal endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::error::Result;
use crate::types::EvaluationResult;
use crate::AppState;

/// Run one evaluation and return it as JSON.
async fn trade(State(state): State<AppState>) -> Result<Json<EvaluationResult>> {
    let result = state.pipeline.evaluate().await?;
    Ok(Json(result))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/trade", get(trade))
}
