//! Entity queries over the storage port.
//!
//! All SQL here uses `?` placeholders and runs unchanged on either adapter.

use std::collections::BTreeMap;

use crate::store::{decode, Database, Param, RunResult, StoreError, StoreResult};
use crate::types::{Book, NewBook, NewPaper, NewSection, Paper, PaperKind, Section, Setting};

fn inserted_id(result: RunResult, table: &str) -> StoreResult<i64> {
    result.id.ok_or_else(|| StoreError::Driver(format!("insert into {} did not report an id", table)))
}

// Papers

pub async fn list_papers(db: &dyn Database) -> StoreResult<Vec<Paper>> {
    db.all("SELECT id, title, topic, abstract, type, file, date FROM papers ORDER BY id DESC", &[])
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn get_paper(db: &dyn Database, id: i64) -> StoreResult<Option<Paper>> {
    db.get("SELECT id, title, topic, abstract, type, file, date FROM papers WHERE id = ?", &[Param::Int(id)])
        .await?
        .map(decode)
        .transpose()
}

/// Inserts a paper; its kind follows from whether a file was stored.
pub async fn create_paper(db: &dyn Database, new: NewPaper) -> StoreResult<Paper> {
    let kind = PaperKind::for_upload(new.file.is_some());
    let result = db
        .run(
            "INSERT INTO papers (title, topic, abstract, type, file, date) VALUES (?, ?, ?, ?, ?, ?)",
            &[
                new.title.clone().into(),
                new.topic.clone().into(),
                new.abstract_text.clone().into(),
                kind.as_str().into(),
                new.file.clone().into(),
                new.date.as_str().into(),
            ],
        )
        .await?;

    Ok(Paper {
        id: inserted_id(result, "papers")?,
        title: new.title.unwrap_or_default(),
        topic: new.topic.unwrap_or_default(),
        abstract_text: new.abstract_text,
        kind,
        file: new.file,
        date: Some(new.date),
    })
}

pub async fn delete_paper(db: &dyn Database, id: i64) -> StoreResult<RunResult> {
    db.run("DELETE FROM papers WHERE id = ?", &[Param::Int(id)]).await
}

// Sections

/// Trims the path and gives it exactly one leading slash.
pub fn normalize_section_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

pub async fn list_sections(db: &dyn Database) -> StoreResult<Vec<Section>> {
    db.all("SELECT id, label, path, category FROM sections ORDER BY id", &[])
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn create_section(db: &dyn Database, new: NewSection) -> StoreResult<Section> {
    let path = normalize_section_path(&new.path);
    let result = db
        .run(
            "INSERT INTO sections (label, path, category) VALUES (?, ?, ?)",
            &[new.label.as_str().into(), path.as_str().into(), new.category.as_str().into()],
        )
        .await?;

    Ok(Section { id: inserted_id(result, "sections")?, label: new.label, path, category: new.category })
}

/// Removes the section only; papers filed under its category stay put.
pub async fn delete_section(db: &dyn Database, id: i64) -> StoreResult<RunResult> {
    db.run("DELETE FROM sections WHERE id = ?", &[Param::Int(id)]).await
}

// Settings

pub async fn list_settings(db: &dyn Database) -> StoreResult<BTreeMap<String, String>> {
    let rows = db.all("SELECT key, value FROM settings ORDER BY key", &[]).await?;
    let mut settings = BTreeMap::new();
    for row in rows {
        let setting: Setting = decode(row)?;
        settings.insert(setting.key, setting.value);
    }
    Ok(settings)
}

/// Inserts the key or replaces its value in one statement.
pub async fn upsert_setting(db: &dyn Database, setting: &Setting) -> StoreResult<RunResult> {
    db.run(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        &[setting.key.as_str().into(), setting.value.as_str().into()],
    )
    .await
}

// Books

pub async fn list_books(db: &dyn Database) -> StoreResult<Vec<Book>> {
    db.all("SELECT id, title, author, cover, summary, recommendation, date FROM books ORDER BY id DESC", &[])
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

pub async fn create_book(db: &dyn Database, new: NewBook) -> StoreResult<Book> {
    let result = db
        .run(
            "INSERT INTO books (title, author, cover, summary, recommendation, date) VALUES (?, ?, ?, ?, ?, ?)",
            &[
                new.title.clone().into(),
                new.author.clone().into(),
                new.cover.clone().into(),
                new.summary.clone().into(),
                new.recommendation.clone().into(),
                new.date.as_str().into(),
            ],
        )
        .await?;

    Ok(Book {
        id: inserted_id(result, "books")?,
        title: new.title.unwrap_or_default(),
        author: new.author.unwrap_or_default(),
        cover: new.cover,
        summary: new.summary,
        recommendation: new.recommendation,
        date: Some(new.date),
    })
}

pub async fn delete_book(db: &dyn Database, id: i64) -> StoreResult<RunResult> {
    db.run("DELETE FROM books WHERE id = ?", &[Param::Int(id)]).await
}

#[cfg(test)]
mod tests {
    use super::normalize_section_path;

    #[test]
    fn section_paths_get_exactly_one_leading_slash() {
        assert_eq!(normalize_section_path("biology"), "/biology");
        assert_eq!(normalize_section_path("/biology"), "/biology");
        assert_eq!(normalize_section_path("///biology"), "/biology");
        assert_eq!(normalize_section_path("  biology "), "/biology");
    }
}
