//! SQLite-backed record store (tables `job_records` and `recent_jobs`).

use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use super::RecordStore;
use crate::clock::Clock;
use crate::db::Database;
use crate::error::StoreError;
use crate::types::{JobId, JobRecord};

#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SqliteRecordStore {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn put(&self, record: &JobRecord, ttl_secs: i64) -> Result<(), StoreError> {
        let expires_at = self.clock.now() + ttl_secs;
        sqlx::query(
            r#"
            INSERT INTO job_records (
                id, request_url, submitted_at, display_title, expires_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                request_url = excluded.request_url,
                submitted_at = excluded.submitted_at,
                display_title = excluded.display_title,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.request_url)
        .bind(record.submitted_at)
        .bind(&record.display_title)
        .bind(expires_at)
        .execute(&self.db.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, request_url, submitted_at, display_title
            FROM job_records
            WHERE id = ?1 AND expires_at > ?2
            "#,
        )
        .bind(id)
        .bind(self.clock.now())
        .fetch_optional(&self.db.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(JobRecord {
            id: row.get("id"),
            request_url: row.get("request_url"),
            submitted_at: row.get("submitted_at"),
            display_title: row.get("display_title"),
        }))
    }

    async fn set_title(&self, id: &str, title: &str) -> Result<bool, StoreError> {
        let r = sqlx::query(
            r#"
            UPDATE job_records
            SET display_title = ?1
            WHERE id = ?2 AND expires_at > ?3
            "#,
        )
        .bind(title)
        .bind(id)
        .bind(self.clock.now())
        .execute(&self.db.pool)
        .await?;

        Ok(r.rows_affected() > 0)
    }

    async fn push_recent(&self, id: &str, cap: usize) -> Result<(), StoreError> {
        // The transaction opens with a write, so concurrent pushers queue on
        // the write lock instead of racing a read-then-upgrade.
        let mut tx = self.db.pool.begin().await?;
        sqlx::query("DELETE FROM recent_jobs WHERE job_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO recent_jobs (job_id) VALUES (?1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            DELETE FROM recent_jobs
            WHERE seq NOT IN (
                SELECT seq FROM recent_jobs
                ORDER BY seq DESC
                LIMIT ?1
            )
            "#,
        )
        .bind(cap as i64)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn recent_ids(&self) -> Result<Vec<JobId>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT job_id
            FROM recent_jobs
            ORDER BY seq DESC
            "#,
        )
        .fetch_all(&self.db.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("job_id")).collect())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let r = sqlx::query("DELETE FROM job_records WHERE expires_at <= ?1")
            .bind(self.clock.now())
            .execute(&self.db.pool)
            .await?;
        Ok(r.rows_affected())
    }
}
