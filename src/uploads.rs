//! Disk storage for uploaded papers and book covers.
//!
//! Files land in one flat directory as `<unix-millis>-<original name>` and are served
//! back under `/uploads/<stored name>`. Rows that reference a file never clean it up.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` and returns the stored file name.
    ///
    /// The content goes to a hidden temporary sibling first and is renamed into place,
    /// so a crash never leaves a truncated file under the final name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        fs::create_dir_all(&self.dir).await?;

        let stored = stored_name(chrono::Utc::now().timestamp_millis(), original_name);
        let target = self.dir.join(&stored);
        let partial = self.dir.join(format!(".{}.part", stored));

        let mut file = fs::File::create(&partial).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&partial, &target).await?;

        tracing::debug!(file = %stored, size = bytes.len(), "Stored upload");
        Ok(stored)
    }
}

/// `<millis>-<name>`, keeping only the last path component of the client-supplied name.
pub fn stored_name(millis: i64, original_name: &str) -> String {
    let base = original_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    let base = match base {
        "" | "." | ".." => "upload",
        other => other,
    };
    format!("{}-{}", millis, base)
}
