use async_trait::async_trait;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, u32_from_i64};
use crate::repository::{SessionStatsRepository, StatsRecord, StorageError};

#[async_trait]
impl SessionStatsRepository for SqliteRepository {
    async fn load_stats(&self) -> Result<Option<StatsRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                schema_version,
                total_seen,
                total_correct,
                current_streak,
                best_streak,
                saved_at
            FROM session_stats
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schema_version =
            u32_from_i64("schema_version", row.try_get::<i64, _>("schema_version").map_err(ser)?)?;
        let total_seen =
            u32_from_i64("total_seen", row.try_get::<i64, _>("total_seen").map_err(ser)?)?;
        let total_correct = u32_from_i64(
            "total_correct",
            row.try_get::<i64, _>("total_correct").map_err(ser)?,
        )?;
        let current_streak = u32_from_i64(
            "current_streak",
            row.try_get::<i64, _>("current_streak").map_err(ser)?,
        )?;
        let best_streak =
            u32_from_i64("best_streak", row.try_get::<i64, _>("best_streak").map_err(ser)?)?;
        let saved_at = row.try_get("saved_at").map_err(ser)?;

        Ok(Some(StatsRecord {
            schema_version,
            total_seen,
            total_correct,
            current_streak,
            best_streak,
            saved_at,
        }))
    }

    async fn save_stats(&self, record: &StatsRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session_stats (
                id,
                schema_version,
                total_seen,
                total_correct,
                current_streak,
                best_streak,
                saved_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                schema_version = excluded.schema_version,
                total_seen = excluded.total_seen,
                total_correct = excluded.total_correct,
                current_streak = excluded.current_streak,
                best_streak = excluded.best_streak,
                saved_at = excluded.saved_at
            ",
        )
        .bind(1_i64)
        .bind(i64::from(record.schema_version))
        .bind(i64::from(record.total_seen))
        .bind(i64::from(record.total_correct))
        .bind(i64::from(record.current_streak))
        .bind(i64::from(record.best_streak))
        .bind(record.saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
