//! # Folio Backend Library
//!
//! Content backend for a personal research-publishing site: papers, books, topic
//! sections and key-value settings behind a small REST API.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server, routing and multipart uploads
//! - **SQLx**: SQLite (embedded) or PostgreSQL (networked), behind one storage trait
//! - **Tokio**: async runtime
//! - **Serde**: JSON request and response bodies
//!
//! ## Core Components
//!
//! - [`store`]: the `{all, get, run}` storage port, its two adapters and migrations
//! - [`repo`]: typed per-entity queries on top of the port
//! - [`routes`]: HTTP handlers and the application router
//! - [`uploads`]: on-disk storage for attached documents and cover images
//! - [`analytics`]: Cloudflare traffic proxy with sample-data fallback
//! - [`client`]: typed API client and the list caches used by front ends
//! - [`config`]: layered configuration (defaults, file, environment)
//! - [`error`]: HTTP error mapping
//! - [`state`]: shared handles injected into handlers

pub mod analytics;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repo;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;
pub mod uploads;

#[cfg(test)]
mod tests;
