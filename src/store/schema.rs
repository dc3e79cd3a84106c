//! Table layout and default rows shared by both adapters.
//!
//! Only the identity column differs between engines, so the DDL is rendered from
//! one template per table.

/// `(label, path, category)` rows inserted into an empty `sections` table.
pub const DEFAULT_SECTIONS: &[(&str, &str, &str)] = &[
    ("History", "/history", "history"),
    ("Physics", "/physics", "physics"),
    ("Philosophy", "/philosophy", "philosophy"),
    ("Tech", "/tech", "technology"),
];

/// `(key, value)` rows inserted when the key is missing.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[("no_posts_text", "No research found for this topic.")];

pub const TABLES: &[&str] = &["papers", "sections", "settings", "books"];

/// `CREATE TABLE IF NOT EXISTS` statements, given the engine's identity column
/// definition (e.g. `INTEGER PRIMARY KEY AUTOINCREMENT` or `SERIAL PRIMARY KEY`).
pub fn create_tables(id_column: &str) -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS papers (
                id {id_column},
                title TEXT NOT NULL,
                topic TEXT NOT NULL,
                abstract TEXT,
                type TEXT,
                file TEXT,
                date TEXT
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS sections (
                id {id_column},
                label TEXT NOT NULL,
                path TEXT NOT NULL,
                category TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS settings (
                id {id_column},
                key TEXT NOT NULL UNIQUE,
                value TEXT NOT NULL
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS books (
                id {id_column},
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                cover TEXT,
                summary TEXT,
                recommendation TEXT,
                date TEXT
            )"
        ),
    ]
}

pub const INSERT_SECTION: &str = "INSERT INTO sections (label, path, category) VALUES (?, ?, ?)";

pub const INSERT_DEFAULT_SETTING: &str = "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT (key) DO NOTHING";
