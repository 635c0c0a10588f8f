//! In-memory SQLite fixture shared by handler tests.

use std::sync::Arc;

use crate::adapters::sqlite::{apply_schema, memory_pool, SqliteResponseStore};
use crate::ports::{ResponseStore, SqlValue};

use super::questionnaire::{CatalogResolver, ResponseMaterializer};

pub(crate) struct TestDb {
    store: Arc<SqliteResponseStore>,
}

impl TestDb {
    pub async fn new() -> Self {
        let pool = memory_pool().await;
        apply_schema(&pool).await.unwrap();
        Self {
            store: Arc::new(SqliteResponseStore::new(pool)),
        }
    }

    pub fn store(&self) -> Arc<dyn ResponseStore> {
        self.store.clone()
    }

    pub fn catalogs(&self) -> CatalogResolver {
        CatalogResolver::new(self.store())
    }

    pub fn materializer(&self) -> ResponseMaterializer {
        ResponseMaterializer::new(self.store())
    }

    pub async fn exec(&self, sql: &str) {
        self.store.run(sql, &[]).await.unwrap();
    }

    pub async fn document(&self, id: i64, name: &str) {
        self.store
            .run("INSERT INTO documents (id, name) VALUES (?, ?)", &[id.into(), name.into()])
            .await
            .unwrap();
    }

    pub async fn event(&self, id: i64, duration_days: Option<i64>) {
        self.store
            .run(
                "INSERT INTO events (id, name, duration_days) VALUES (?, ?, ?)",
                &[id.into(), format!("Event {}", id).into(), duration_days.into()],
            )
            .await
            .unwrap();
    }

    pub async fn question(&self, document_id: i64, field: &str, input_type: &str, position: i64, required: bool) {
        self.store
            .run(
                "INSERT INTO questions (document_id, field_name, input_type, section, required, position) VALUES (?, ?, ?, 'General', ?, ?)",
                &[document_id.into(), field.into(), input_type.into(), required.into(), position.into()],
            )
            .await
            .unwrap();
    }

    pub async fn option(&self, field: &str, value: &str, position: i64) {
        self.store
            .run(
                "INSERT INTO question_options (question_id, value, position) SELECT id, ?, ? FROM questions WHERE field_name = ?",
                &[value.into(), position.into(), field.into()],
            )
            .await
            .unwrap();
    }

    /// Raw stored value of one response row.
    pub async fn raw_value(&self, field: &str, trainee_id: i64) -> Option<String> {
        self.store
            .get(
                "SELECT value FROM responses WHERE field_name = ? AND trainee_id = ?",
                &[field.into(), trainee_id.into()],
            )
            .await
            .unwrap()
            .map(|row| row.text("value").unwrap())
    }

    pub async fn set_raw_value(&self, field: &str, trainee_id: i64, value: &str) {
        self.store
            .run(
                "UPDATE responses SET value = ? WHERE field_name = ? AND trainee_id = ?",
                &[value.into(), field.into(), trainee_id.into()],
            )
            .await
            .unwrap();
    }

    pub async fn count(&self, sql: &str, params: &[SqlValue]) -> i64 {
        self.store
            .get(sql, params)
            .await
            .unwrap()
            .map(|row| row.i64("n").unwrap())
            .unwrap_or(0)
    }
}
