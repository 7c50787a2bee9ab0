use crate::error::Result;
use crate::models::Item;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the schema if it does not exist yet.
    ///
    /// `seq` records insertion order; listings sort on it to break
    /// `created_at` ties stably.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT NOT NULL UNIQUE,
                owner_id   TEXT NOT NULL,
                kind       TEXT NOT NULL,
                payload    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_items_owner_created ON items (owner_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created ON items (created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert one item. Single-statement, so an item is never partially
    /// visible to a concurrent read.
    pub async fn insert_item(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, owner_id, kind, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.kind)
        .bind(&item.payload)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All items for `owner_id` created strictly after `cutoff`, newest
    /// first, equal timestamps in insertion order.
    ///
    /// The age filter lives here so visible behavior never depends on
    /// whether the sweep has run yet.
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, owner_id, kind, payload, created_at
            FROM items
            WHERE owner_id = ? AND created_at > ?
            ORDER BY created_at DESC, seq ASC
            "#,
        )
        .bind(owner_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Delete every item for `owner_id`, expired or not. Returns the number
    /// removed; deleting an already-empty set is a no-op.
    pub async fn clear_owner(&self, owner_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE owner_id = ?")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete items across all owners created before `cutoff`. One bulk
    /// statement, safe to run concurrently with inserts and reads.
    pub async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Close the pool. Operations issued afterwards fail with a store error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
