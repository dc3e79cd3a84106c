use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of the built front end; served with SPA fallback when present.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    pub dir: PathBuf,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub api_token: Option<String>,
    pub zone_id: Option<String>,
}

impl AnalyticsConfig {
    /// Token and zone id, trimmed. `None` unless both are set and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.api_token.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let zone = self.zone_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((token, zone))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub uploads: UploadsConfig,
    pub analytics: AnalyticsConfig,
}

const DEFAULTS: &str = include_str!("../config/default.toml");

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        // Optional local file: folio.toml (in CWD)
        .add_source(::config::File::with_name("folio").required(false));

    if let Ok(custom_path) = std::env::var("FOLIO_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    builder = builder.add_source(::config::Environment::with_prefix("FOLIO").separator("__"));

    // Legacy unprefixed variables win over everything else
    builder = builder
        .set_override_option("database.url", legacy_var("DATABASE_URL"))?
        .set_override_option("server.port", legacy_var("PORT"))?
        .set_override_option("analytics.api_token", legacy_var("CLOUDFLARE_API_TOKEN"))?
        .set_override_option("analytics.zone_id", legacy_var("CLOUDFLARE_ZONE_ID"))?;

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn legacy_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    let url = cfg.database.url.trim();
    if url.is_empty() {
        return Err(anyhow::anyhow!("database.url must not be empty"));
    }
    if !is_postgres_url(url) && !url.starts_with("sqlite:") {
        return Err(anyhow::anyhow!("database.url must start with sqlite: or postgres://, got {}", url));
    }
    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    if cfg.uploads.dir.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("uploads.dir must not be empty"));
    }
    if cfg.uploads.max_body_bytes < 1024 {
        return Err(anyhow::anyhow!("uploads.max_body_bytes must be >= 1024"));
    }

    if cfg.analytics.timeout_secs == 0 {
        return Err(anyhow::anyhow!("analytics.timeout_secs must be > 0"));
    }

    Ok(())
}

pub fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

pub fn ensure_sqlite_parent_dir(url: &str) -> std::io::Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    // sqlite:///C:/... on Windows carries a leading slash before the drive letter
    #[cfg(windows)]
    let path = {
        let bytes = path.as_bytes();
        if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
            &path[1..]
        } else {
            path
        }
    };
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
