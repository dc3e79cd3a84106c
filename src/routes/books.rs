use axum::{
    extract::{Multipart, Path, State},
    Json,
};

use super::form::UploadForm;
use crate::{
    error::AppResult,
    repo,
    state::AppState,
    types::{Book, Created, Deleted, NewBook},
};

pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(repo::list_books(state.db.as_ref()).await?))
}

// Multipart: title, author, summary, recommendation, date, optional `cover` image
pub async fn create_book(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Json<Created<Book>>> {
    let mut form = UploadForm::read(&mut multipart, "cover").await?;
    let cover = form.store_file(&state.uploads).await?;

    let new = NewBook {
        title: form.text("title"),
        author: form.text("author"),
        cover,
        summary: form.text("summary"),
        recommendation: form.text("recommendation"),
        date: form.date_or_today(),
    };
    let book = repo::create_book(state.db.as_ref(), new).await?;
    tracing::info!(id = book.id, title = %book.title, "Added book");

    Ok(Json(Created::new(book)))
}

pub async fn delete_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Deleted>> {
    let result = repo::delete_book(state.db.as_ref(), id).await?;
    Ok(Json(Deleted::new(result.changes)))
}
