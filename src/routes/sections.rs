use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    repo,
    state::AppState,
    types::{Created, Deleted, NewSection, Section},
};

pub async fn list_sections(State(state): State<AppState>) -> AppResult<Json<Vec<Section>>> {
    Ok(Json(repo::list_sections(state.db.as_ref()).await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    payload: Result<Json<NewSection>, JsonRejection>,
) -> AppResult<Json<Created<Section>>> {
    let Json(new) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let section = repo::create_section(state.db.as_ref(), new).await?;
    tracing::info!(id = section.id, path = %section.path, "Created section");
    Ok(Json(Created::new(section)))
}

pub async fn delete_section(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Deleted>> {
    let result = repo::delete_section(state.db.as_ref(), id).await?;
    Ok(Json(Deleted::new(result.changes)))
}
