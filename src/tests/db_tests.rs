#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::store::schema::{DEFAULT_SECTIONS, TABLES};
    use crate::store::{Backend, Database, Param, SqliteDatabase, StoreError};

    async fn memory_db() -> SqliteDatabase {
        let db = SqliteDatabase::connect("sqlite::memory:", 4).await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn count(db: &dyn Database, table: &str) -> i64 {
        let row = db.get(&format!("SELECT count(*) AS n FROM {}", table), &[]).await.unwrap().unwrap();
        row["n"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_migrate_creates_tables() {
        let db = memory_db().await;
        assert_eq!(db.backend(), Backend::Sqlite);

        let tables = db
            .all("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name", &[])
            .await
            .unwrap();
        let names: Vec<&str> = tables.iter().filter_map(|r| r["name"].as_str()).collect();
        for table in TABLES {
            assert!(names.contains(table), "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_migrate_seeds_defaults_once() {
        let db = memory_db().await;
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        assert_eq!(count(&db, "sections").await, DEFAULT_SECTIONS.len() as i64);
        assert_eq!(count(&db, "settings").await, 1);

        let row = db.get("SELECT value FROM settings WHERE key = ?", &["no_posts_text".into()]).await.unwrap().unwrap();
        assert_eq!(row["value"], "No research found for this topic.");

        let tech = db.get("SELECT * FROM sections WHERE label = ?", &["Tech".into()]).await.unwrap().unwrap();
        assert_eq!(tech["path"], "/tech");
        assert_eq!(tech["category"], "technology");
    }

    #[tokio::test]
    async fn test_reopening_seeded_file_does_not_duplicate() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("data/research.db").display());

        let first = SqliteDatabase::connect(&url, 2).await.unwrap();
        first.migrate().await.unwrap();
        first.run("DELETE FROM sections WHERE label = ?", &["Tech".into()]).await.unwrap();
        first.pool().close().await;

        // A non-empty sections table is left alone, even if a default is missing
        let second = SqliteDatabase::connect(&url, 2).await.unwrap();
        second.migrate().await.unwrap();
        assert_eq!(count(&second, "sections").await, 3);
        assert_eq!(count(&second, "settings").await, 1);
    }

    #[tokio::test]
    async fn test_run_reports_insert_id_and_changes() {
        let db = memory_db().await;
        let insert = "INSERT INTO papers (title, topic, abstract, type, file, date) VALUES (?, ?, ?, ?, ?, ?)";
        let params = |title: &str| -> Vec<Param> {
            vec![title.into(), "history".into(), Param::Null, "Link".into(), Param::Null, "2024-01-01".into()]
        };

        let a = db.run(insert, &params("A")).await.unwrap();
        let b = db.run(insert, &params("B")).await.unwrap();
        assert_eq!(a.changes, 1);
        assert!(b.id.unwrap() > a.id.unwrap());

        let update = db.run("UPDATE papers SET topic = ? WHERE topic = ?", &["physics".into(), "history".into()]).await.unwrap();
        assert_eq!(update.id, None);
        assert_eq!(update.changes, 2);

        let gone = db.run("DELETE FROM papers WHERE id = ?", &[Param::Int(9999)]).await.unwrap();
        assert_eq!(gone.changes, 0);
    }

    #[tokio::test]
    async fn test_records_keep_column_types() {
        let db = memory_db().await;
        db.run(
            "INSERT INTO books (title, author, cover, summary, recommendation, date) VALUES (?, ?, ?, ?, ?, ?)",
            &["Dune".into(), "Herbert".into(), Param::Null, "Sand".into(), "Read it".into(), "2024-02-02".into()],
        )
        .await
        .unwrap();

        let row = db.get("SELECT * FROM books WHERE title = ?", &["Dune".into()]).await.unwrap().unwrap();
        assert!(row["id"].is_i64());
        assert_eq!(row["cover"], Value::Null);
        assert_eq!(row["author"], json!("Herbert"));
        let columns: Vec<&String> = row.keys().collect();
        assert_eq!(columns, ["id", "title", "author", "cover", "summary", "recommendation", "date"]);
    }

    #[tokio::test]
    async fn test_get_absent_row_is_none() {
        let db = memory_db().await;
        let row = db.get("SELECT * FROM papers WHERE id = ?", &[Param::Int(1)]).await.unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_driver_errors_surface_unchanged() {
        let db = memory_db().await;
        match db.all("SELECT * FROM missing_table", &[]).await {
            Err(StoreError::Driver(msg)) => assert!(msg.contains("no such table"), "{}", msg),
            other => panic!("expected driver error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[tokio::test]
    async fn test_settings_key_is_unique() {
        let db = memory_db().await;
        let err = db
            .run("INSERT INTO settings (key, value) VALUES (?, ?)", &["no_posts_text".into(), "dup".into()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE"), "{}", err);
    }
}
