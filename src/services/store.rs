use crate::models::DocumentRecord;
use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

/// Persistence for generated-document metadata, scoped by owner id.
#[derive(Clone)]
pub struct DocumentStore {
    pool: Pool<Sqlite>,
}

impl DocumentStore {
    /// Create new database connection pool
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                text TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        url: &str,
        text: Option<&str>,
    ) -> Result<DocumentRecord> {
        let id = Uuid::new_v4().to_string();
        // Bound from the clock rather than CURRENT_TIMESTAMP so ordering keeps
        // sub-second resolution.
        let created_at = chrono::Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO documents (id, owner_id, name, url, text, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(name)
        .bind(url)
        .bind(text)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(DocumentRecord {
            id,
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            text: text.map(|t| t.to_string()),
            created_at: chrono::DateTime::from_naive_utc_and_offset(created_at, chrono::Utc),
        })
    }

    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<DocumentRecord>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE owner_id = ?1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update the display name, only when both id and owner match.
    /// `None` deliberately does not distinguish "missing" from "not owned".
    pub async fn rename(
        &self,
        id: &str,
        owner_id: &str,
        new_name: &str,
    ) -> Result<Option<DocumentRecord>> {
        let result = sqlx::query(
            "UPDATE documents SET name = ?1 WHERE id = ?2 AND owner_id = ?3",
        )
        .bind(new_name)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Some(row.into()))
    }

    /// Delete with the same ownership-matching rule as rename.
    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// === Database Row Types ===

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    owner_id: String,
    name: String,
    url: String,
    text: Option<String>,
    created_at: chrono::NaiveDateTime,
}

impl From<DocumentRow> for DocumentRecord {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            url: row.url,
            text: row.text,
            created_at: chrono::DateTime::from_naive_utc_and_offset(row.created_at, chrono::Utc),
        }
    }
}
