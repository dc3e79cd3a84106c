//! HTTP route handlers for the Folio API.
//!
//! - `papers`, `sections`, `settings`, `books`: CRUD over the store
//! - `metrics`: Cloudflare analytics proxy
//! - `health`: liveness, readiness and build info
//! - `form`: multipart parsing shared by the upload endpoints

pub mod books;
pub mod form;
pub mod health;
pub mod metrics;
pub mod papers;
pub mod sections;
pub mod settings;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::security_headers::security_headers_middleware;
use crate::state::AppState;

/// The full application router: API, uploaded files and, when configured, the
/// built front end with `index.html` fallback for client-side routes.
pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());
    let body_limit = state.config.uploads.max_body_bytes;
    let static_dir = state.config.server.static_dir.clone();

    let mut app = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/version", get(health::version))
        .route("/api/papers", get(papers::list_papers).post(papers::create_paper))
        .route("/api/papers/{id}", get(papers::get_paper).delete(papers::delete_paper))
        .route("/api/sections", get(sections::list_sections).post(sections::create_section))
        .route("/api/sections/{id}", delete(sections::delete_section))
        .route("/api/settings", get(settings::list_settings).post(settings::upsert_setting))
        .route("/api/books", get(books::list_books).post(books::create_book))
        .route("/api/books/{id}", delete(books::delete_book))
        .route("/api/metrics", get(metrics::get_metrics))
        .nest_service("/uploads", uploads);

    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        app = app.fallback_service(
            ServeDir::new(dir).append_index_html_on_directories(true).not_found_service(ServeFile::new(index)),
        );
    }

    app.with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
}
