#[cfg(test)]
mod tests {
    //! Runs only when `FOLIO_TEST_POSTGRES_URL` points at a disposable database.

    use crate::repo;
    use crate::store::schema::TABLES;
    use crate::store::{Backend, Database, Param, PostgresDatabase, StoreError};
    use crate::types::{NewSection, Setting};

    async fn fresh_db() -> Option<PostgresDatabase> {
        let url = std::env::var("FOLIO_TEST_POSTGRES_URL").ok()?;
        let db = PostgresDatabase::connect(&url, 2).await.unwrap();
        for table in TABLES {
            db.run(&format!("DROP TABLE IF EXISTS {}", table), &[]).await.unwrap();
        }
        Some(db)
    }

    // One test so the shared tables are never migrated concurrently.
    #[tokio::test]
    async fn test_postgres_adapter() {
        let Some(db) = fresh_db().await else {
            eprintln!("FOLIO_TEST_POSTGRES_URL not set; skipping");
            return;
        };
        assert_eq!(db.backend(), Backend::Postgres);

        db.migrate().await.unwrap();
        db.migrate().await.unwrap();
        let sections = repo::list_sections(&db).await.unwrap();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[3].category, "technology");
        let settings = repo::list_settings(&db).await.unwrap();
        assert_eq!(settings.len(), 1);

        // Placeholders are rewritten and inserts report their generated id
        let insert = "INSERT INTO papers (title, topic, abstract, type, file, date) VALUES (?, ?, ?, ?, ?, ?)";
        let first = db
            .run(insert, &["A".into(), "history".into(), Param::Null, "Link".into(), Param::Null, "2024-01-01".into()])
            .await
            .unwrap();
        let second = db
            .run(insert, &["B?".into(), "history".into(), "a '?' here".into(), "Link".into(), Param::Null, "2024-01-02".into()])
            .await
            .unwrap();
        assert_eq!(first.changes, 1);
        assert!(second.id.unwrap() > first.id.unwrap());

        let row = db.get("SELECT * FROM papers WHERE id = ?", &[Param::Int(second.id.unwrap())]).await.unwrap().unwrap();
        assert_eq!(row["title"], "B?");
        assert_eq!(row["abstract"], "a '?' here");
        assert_eq!(row["file"], serde_json::Value::Null);
        assert!(row["id"].is_i64());

        let matched = db
            .all("SELECT id FROM papers WHERE title = '?' OR topic = ?", &["history".into()])
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);

        let update = db.run("UPDATE papers SET topic = ? WHERE topic = ?", &["physics".into(), "history".into()]).await.unwrap();
        assert_eq!(update.id, None);
        assert_eq!(update.changes, 2);
        assert_eq!(db.run("DELETE FROM papers WHERE id = ?", &[Param::Int(-1)]).await.unwrap().changes, 0);

        let section = repo::create_section(
            &db,
            NewSection { label: "Biology".into(), path: "biology".into(), category: "biology".into() },
        )
        .await
        .unwrap();
        assert_eq!(section.path, "/biology");

        for value in ["first", "second"] {
            repo::upsert_setting(&db, &Setting { key: "no_posts_text".into(), value: value.into() }).await.unwrap();
        }
        let settings = repo::list_settings(&db).await.unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings["no_posts_text"], "second");

        match db.all("SELECT * FROM missing_table", &[]).await {
            Err(StoreError::Driver(msg)) => assert!(msg.contains("missing_table"), "{}", msg),
            other => panic!("expected driver error, got {:?}", other.map(|r| r.len())),
        }

        db.ping().await.unwrap();
    }
}
