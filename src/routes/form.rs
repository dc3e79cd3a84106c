use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::AppResult;
use crate::uploads::UploadStore;

/// File part of a multipart form.
#[derive(Debug)]
pub struct FilePart {
    pub file_name: String,
    pub data: Bytes,
}

/// Text fields plus at most one file from a multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<FilePart>,
}

impl UploadForm {
    /// Drains `multipart`, treating the part named `file_field` as the upload.
    ///
    /// A file part with no name and no content (what browsers send for an empty file
    /// input) counts as no file.
    pub async fn read(multipart: &mut Multipart, file_field: &str) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                form.file = Some(FilePart { file_name, data });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Field value, `None` when absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// The `date` field, or today's UTC date when the client left it out.
    pub fn date_or_today(&self) -> String {
        self.text("date")
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string())
    }

    /// Persists the file part, if any, and returns its stored name.
    pub async fn store_file(&mut self, uploads: &UploadStore) -> AppResult<Option<String>> {
        match self.file.take() {
            Some(part) => {
                let name = if part.file_name.is_empty() { "upload" } else { part.file_name.as_str() };
                Ok(Some(uploads.save(name, &part.data).await?))
            }
            None => Ok(None),
        }
    }
}
