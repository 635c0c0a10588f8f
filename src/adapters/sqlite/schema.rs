//! Schema creation for the SQLite store.
//!
//! Every statement is `IF NOT EXISTS`, so applying the schema to an
//! existing database is a no-op.

use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::foundation::DomainError;

const TABLES: &[(&str, &str)] = &[
    (
        "documents",
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            scope TEXT NOT NULL DEFAULT 'trainee'
        )
        "#,
    ),
    (
        "events",
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            duration_days INTEGER
        )
        "#,
    ),
    (
        "questions",
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            field_name TEXT NOT NULL,
            input_type TEXT NOT NULL,
            section TEXT NOT NULL DEFAULT '',
            required INTEGER NOT NULL DEFAULT 0,
            role TEXT,
            allow_multiple INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0,
            UNIQUE (document_id, field_name)
        )
        "#,
    ),
    (
        "question_options",
        r#"
        CREATE TABLE IF NOT EXISTS question_options (
            id INTEGER PRIMARY KEY,
            question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            value TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "responses",
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY,
            event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
            field_name TEXT NOT NULL,
            trainee_id INTEGER NOT NULL DEFAULT -1,
            value TEXT NOT NULL DEFAULT '',
            completed INTEGER NOT NULL DEFAULT 0,
            comments TEXT NOT NULL DEFAULT '',
            UNIQUE (event_id, document_id, field_name, trainee_id)
        )
        "#,
    ),
    (
        "document_progress",
        r#"
        CREATE TABLE IF NOT EXISTS document_progress (
            id INTEGER PRIMARY KEY,
            event_id INTEGER NOT NULL,
            document_id INTEGER NOT NULL,
            trainee_id INTEGER,
            progress INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_questions_document ON questions (document_id, position)",
    "CREATE INDEX IF NOT EXISTS idx_responses_instance ON responses (event_id, document_id, trainee_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_progress_unique_key ON document_progress (event_id, document_id, IFNULL(trainee_id, -1))",
];

// Databases created before the progress key was unique may hold duplicates;
// the newest row of each key is kept.
const DEDUPE_PROGRESS_SQL: &str = r#"
    DELETE FROM document_progress
    WHERE id NOT IN (
        SELECT MAX(id) FROM document_progress
        GROUP BY event_id, document_id, IFNULL(trainee_id, -1)
    )
"#;

/// Creates every table and index the engine uses.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), DomainError> {
    for (table, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| DomainError::database(&format!("Failed to create table {}", table), e))?;
        debug!(table, "Table ready");
    }

    // Superseded by idx_progress_unique_key
    sqlx::query("DROP INDEX IF EXISTS idx_progress_key")
        .execute(pool)
        .await
        .map_err(|e| DomainError::database("Failed to drop index", e))?;
    sqlx::query(DEDUPE_PROGRESS_SQL)
        .execute(pool)
        .await
        .map_err(|e| DomainError::database("Failed to deduplicate progress rows", e))?;

    for ddl in INDEXES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| DomainError::database("Failed to create index", e))?;
    }

    Ok(())
}
