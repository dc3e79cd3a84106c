use serde::{Deserialize, Serialize};

/// How a paper is published: an uploaded document or an external link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperKind {
    #[serde(rename = "PDF")]
    Pdf,
    Link,
}

impl PaperKind {
    pub fn for_upload(has_file: bool) -> Self {
        if has_file {
            PaperKind::Pdf
        } else {
            PaperKind::Link
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaperKind::Pdf => "PDF",
            PaperKind::Link => "Link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: i64,
    pub title: String,
    /// Category key of the section this paper is listed under.
    pub topic: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(rename = "type")]
    pub kind: PaperKind,
    /// Stored upload name, if a document was attached.
    pub file: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewPaper {
    /// `None` binds as NULL, which the NOT NULL column rejects.
    pub title: Option<String>,
    pub topic: Option<String>,
    pub abstract_text: Option<String>,
    pub date: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub label: String,
    pub path: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSection {
    pub label: String,
    pub path: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Stored upload name of the cover image.
    pub cover: Option<String>,
    pub summary: Option<String>,
    pub recommendation: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub summary: Option<String>,
    pub recommendation: Option<String>,
    pub date: String,
}

/// `{"message": "success", "data": ...}` envelope returned by create endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Created<T> {
    pub message: String,
    pub data: T,
}

impl<T> Created<T> {
    pub fn new(data: T) -> Self {
        Self { message: "success".to_string(), data }
    }
}

/// `{"message": "deleted", "changes": n}`; `changes` is 0 when the id did not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub changes: u64,
}

impl Deleted {
    pub fn new(changes: u64) -> Self {
        Self { message: "deleted".to_string(), changes }
    }
}
