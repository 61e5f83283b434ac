//! SQLite score store
//!
//! Lightweight persistent backend. `created_at` is stored as microseconds
//! since the Unix epoch so the ranking index sorts numerically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use riskzone_kernel::leaderboard::{NewScore, ScoreRecord, ScoreStore, StoreError, StoreResult};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use tracing::info;

/// SQLite-backed [`ScoreStore`].
pub struct SqliteScoreStore {
    pool: SqlitePool,
}

impl SqliteScoreStore {
    /// Open (creating if missing) the database at `database_url` and migrate it.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        Self::connect_with_options(database_url, 5).await
    }

    /// Private in-memory database, mainly for tests.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// capped at one connection.
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect_with_options("sqlite::memory:", 1).await
    }

    pub async fn connect_with_options(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!(database_url = %database_url, "sqlite score store ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                level INTEGER NOT NULL DEFAULT 1,
                character TEXT,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_scores_rank
                ON scores (score DESC, level DESC, created_at DESC, id DESC)
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    fn parse_row(row: &SqliteRow) -> StoreResult<ScoreRecord> {
        let get_u32 = |column: &str| -> StoreResult<u32> {
            let value: i64 = row.try_get(column).map_err(map_sqlx_error)?;
            u32::try_from(value).map_err(|e| StoreError::Corrupt(format!("{column}: {e}")))
        };

        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let created_micros: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
        let created_at = DateTime::<Utc>::from_timestamp_micros(created_micros)
            .ok_or_else(|| StoreError::Corrupt(format!("created_at: {created_micros}")))?;

        Ok(ScoreRecord {
            id: u64::try_from(id).map_err(|e| StoreError::Corrupt(format!("id: {e}")))?,
            name: row.try_get("name").map_err(map_sqlx_error)?,
            score: get_u32("score")?,
            level: get_u32("level")?,
            character: row.try_get("character").map_err(map_sqlx_error)?,
            created_at,
        })
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn append(&self, score: NewScore, now: DateTime<Utc>) -> StoreResult<ScoreRecord> {
        // One statement, so the monotonic clamp and the insert are atomic.
        let row = sqlx::query(
            r#"
            INSERT INTO scores (name, score, level, character, created_at)
            VALUES (?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(created_at) FROM scores), 0)))
            RETURNING id, name, score, level, character, created_at
        "#,
        )
        .bind(&score.name)
        .bind(i64::from(score.score))
        .bind(i64::from(score.level))
        .bind(score.character.as_deref())
        .bind(now.timestamp_micros())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Self::parse_row(&row)
    }

    async fn query_top_n(&self, limit: usize) -> StoreResult<Vec<ScoreRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, score, level, character, created_at
            FROM scores
            ORDER BY score DESC, level DESC, created_at DESC, id DESC
            LIMIT ?
        "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(Self::parse_row).collect()
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scores")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count.max(0) as u64)
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn score(name: &str, score: u32, level: u32, character: Option<&str>) -> NewScore {
        NewScore {
            name: name.to_string(),
            score,
            level,
            character: character.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn append_and_rank() {
        let store = SqliteScoreStore::in_memory().await.unwrap();
        assert!(store.query_top_n(10).await.unwrap().is_empty());

        store.append(score("low", 10, 1, None), at(0)).await.unwrap();
        store.append(score("high", 30, 1, Some("Runner")), at(1)).await.unwrap();
        store.append(score("tie-old", 20, 2, None), at(2)).await.unwrap();
        store.append(score("tie-new", 20, 2, None), at(3)).await.unwrap();

        let top = store.query_top_n(3).await.unwrap();
        let names: Vec<_> = top.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["high", "tie-new", "tie-old"]);
        assert_eq!(top[0].character.as_deref(), Some("Runner"));
        assert_eq!(top[0].created_at, at(1));
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn created_at_is_clamped_to_last_insert() {
        let store = SqliteScoreStore::in_memory().await.unwrap();
        store.append(score("a", 1, 1, None), at(10)).await.unwrap();
        let b = store.append(score("b", 1, 1, None), at(5)).await.unwrap();
        assert_eq!(b.created_at, at(10));
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn records_survive_reconnect() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("scores.db").display());

        {
            let store = SqliteScoreStore::connect(&url).await.unwrap();
            store.append(score("kept", 42, 3, None), at(0)).await.unwrap();
            store.pool().close().await;
        }

        let store = SqliteScoreStore::connect(&url).await.unwrap();
        let top = store.query_top_n(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "kept");
        assert_eq!(top[0].level, 3);
    }

    #[tokio::test]
    async fn closed_pool_reports_connection_error() {
        let store = SqliteScoreStore::in_memory().await.unwrap();
        store.pool().close().await;
        assert!(matches!(
            store.append(score("a", 1, 1, None), at(0)).await,
            Err(StoreError::Connection(_))
        ));
    }
}
