use async_trait::async_trait;
use sqlx::Row;
use std::collections::HashMap;

use super::SqliteRepository;
use super::mapping::{conn, ser, u64_from_i64};
use crate::repository::{CounterStore, StorageError};

#[async_trait]
impl CounterStore for SqliteRepository {
    async fn incr(&self, key: &str) -> Result<u64, StorageError> {
        // Single statement, so the add happens inside SQLite's write lock.
        let value: i64 = sqlx::query_scalar(
            r"
            INSERT INTO counters (key, value)
            VALUES (?1, 1)
            ON CONFLICT(key) DO UPDATE SET value = value + 1
            RETURNING value
            ",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        u64_from_i64("value", value)
    }

    async fn get(&self, key: &str) -> Result<u64, StorageError> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM counters WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        value.map_or(Ok(0), |v| u64_from_i64("value", v))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<u64>, StorageError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from("SELECT key, value FROM counters WHERE key IN (");
        for i in 0..keys.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 1).to_string());
        }
        sql.push(')');

        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(key);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(conn)?;

        let mut found = HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key").map_err(ser)?;
            let value = u64_from_i64("value", row.try_get::<i64, _>("value").map_err(ser)?)?;
            found.insert(key, value);
        }

        Ok(keys
            .iter()
            .map(|key| found.get(key).copied().unwrap_or(0))
            .collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(conn)
    }
}
