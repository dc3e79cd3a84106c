use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    repo,
    state::AppState,
    types::{Created, Setting},
};

/// All settings as one `{key: value}` object.
pub async fn list_settings(State(state): State<AppState>) -> AppResult<Json<BTreeMap<String, String>>> {
    Ok(Json(repo::list_settings(state.db.as_ref()).await?))
}

pub async fn upsert_setting(
    State(state): State<AppState>,
    payload: Result<Json<Setting>, JsonRejection>,
) -> AppResult<Json<Created<Setting>>> {
    let Json(setting) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    repo::upsert_setting(state.db.as_ref(), &setting).await?;
    tracing::info!(key = %setting.key, "Saved setting");
    Ok(Json(Created::new(setting)))
}
