use std::sync::Arc;

use crate::analytics::AnalyticsClient;
use crate::config::AppConfig;
use crate::store::{self, SharedDatabase};
use crate::uploads::UploadStore;

/// The shared application state.
///
/// Cloned into every handler by axum. The database handle is constructed once at
/// startup (or by a test) and passed in, never looked up globally.
#[derive(Clone)]
pub struct AppState {
    /// Storage port; SQLite or PostgreSQL depending on `database.url`.
    pub db: SharedDatabase,
    /// Where uploaded documents and covers are written.
    pub uploads: UploadStore,
    /// Cloudflare analytics proxy used by `/api/metrics`.
    pub analytics: AnalyticsClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SharedDatabase, config: AppConfig) -> anyhow::Result<Self> {
        let uploads = UploadStore::new(config.uploads.dir.clone());
        let analytics = AnalyticsClient::new(config.analytics.clone())?;
        if !analytics.is_configured() {
            tracing::info!("Analytics credentials not set; /api/metrics serves sample data");
        }
        Ok(Self { db, uploads, analytics, config: Arc::new(config) })
    }

    /// Connects the configured store, applies migrations when `migrate` is set and
    /// builds the state. This is the startup path of `folio serve`.
    pub async fn open(config: AppConfig, migrate: bool) -> anyhow::Result<Self> {
        let db = store::connect(&config.database).await?;
        tracing::info!(backend = db.backend().as_str(), "Storage ready");
        if migrate {
            db.migrate().await?;
            tracing::info!("Migrations applied");
        }
        Self::new(db, config)
    }
}
