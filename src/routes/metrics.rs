use axum::{extract::State, Json};
use serde_json::Value;

use crate::{
    analytics::AnalyticsError,
    error::{AppError, AppResult},
    state::AppState,
};

// Traffic figures for the admin dashboard; sample data when analytics is unconfigured
pub async fn get_metrics(State(state): State<AppState>) -> AppResult<Json<Value>> {
    match state.analytics.daily_traffic().await {
        Ok(data) => Ok(Json(data)),
        Err(AnalyticsError::Graphql(errors)) => {
            tracing::error!(%errors, "Cloudflare API errors");
            Err(AppError::Upstream("Cloudflare API error".to_string()))
        }
        Err(e) => {
            tracing::error!("Metrics fetch error: {}", e);
            Err(AppError::Upstream("Failed to fetch metrics".to_string()))
        }
    }
}
