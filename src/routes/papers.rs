use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use super::form::UploadForm;
use crate::{
    error::{AppResult, OptionExt},
    repo,
    state::AppState,
    types::{Created, Deleted, NewPaper, Paper},
};

pub async fn list_papers(State(state): State<AppState>) -> AppResult<Json<Vec<Paper>>> {
    Ok(Json(repo::list_papers(state.db.as_ref()).await?))
}

pub async fn get_paper(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Paper>> {
    let paper = repo::get_paper(state.db.as_ref(), id).await?.ok_or_not_found("Paper")?;
    Ok(Json(paper))
}

/// Multipart fields `title`, `topic`, `abstract`, `date` and an optional `file`.
/// The paper is a "PDF" when a file came along, a "Link" otherwise.
pub async fn create_paper(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Json<Created<Paper>>> {
    let mut form = UploadForm::read(&mut multipart, "file").await?;
    let file = form.store_file(&state.uploads).await?;

    let new = NewPaper {
        title: form.text("title"),
        topic: form.text("topic"),
        abstract_text: form.text("abstract"),
        date: form.date_or_today(),
        file,
    };
    let paper = repo::create_paper(state.db.as_ref(), new).await?;
    tracing::info!(id = paper.id, kind = paper.kind.as_str(), topic = %paper.topic, "Published paper");

    Ok(Json(Created::new(paper)))
}

pub async fn delete_paper(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Deleted>> {
    let result = repo::delete_paper(state.db.as_ref(), id).await?;
    Ok(Json(Deleted::new(result.changes)))
}
