//! SQLite-backed job queue (table `queue_jobs`), shared by the server and workers.

use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use super::{JobIdSource, JobQueue};
use crate::clock::Clock;
use crate::db::Database;
use crate::error::StoreError;
use crate::types::{ClaimedJob, DownloadTask, JobId, JobStatus};

#[derive(Clone)]
pub struct SqliteJobQueue {
    db: Database,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn JobIdSource>,
    result_ttl_secs: i64,
}

impl SqliteJobQueue {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn JobIdSource>,
        result_ttl_secs: i64,
    ) -> Self {
        Self {
            db,
            clock,
            ids,
            result_ttl_secs,
        }
    }

    async fn end(&self, id: &str, state: JobStatus, error: Option<&str>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE queue_jobs
            SET state = ?1,
                ended_at = ?2,
                error = ?3
            WHERE id = ?4
            "#,
        )
        .bind(state.as_str())
        .bind(self.clock.now())
        .bind(error)
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn enqueue(&self, task: DownloadTask) -> Result<JobId, StoreError> {
        let id = self.ids.next_id();
        sqlx::query(
            r#"
            INSERT INTO queue_jobs (
                id, url, state, enqueued_at, started_at, ended_at, error
            ) VALUES (?1, ?2, ?3, ?4, NULL, NULL, NULL)
            "#,
        )
        .bind(&id)
        .bind(&task.url)
        .bind(JobStatus::Queued.as_str())
        .bind(self.clock.now())
        .execute(&self.db.pool)
        .await?;

        Ok(id)
    }

    async fn status(&self, id: &str) -> Result<Option<JobStatus>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT state
            FROM queue_jobs
            WHERE id = ?1
              AND (ended_at IS NULL OR ended_at + ?2 > ?3)
            "#,
        )
        .bind(id)
        .bind(self.result_ttl_secs)
        .bind(self.clock.now())
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row.map(|row| {
            let state: String = row.get("state");
            JobStatus::from_str(&state)
        }))
    }

    async fn claim_next(&self) -> Result<Option<ClaimedJob>, StoreError> {
        // Single statement: two workers can never claim the same row.
        let row = sqlx::query(
            r#"
            UPDATE queue_jobs
            SET state = 'running',
                started_at = ?1
            WHERE id = (
                SELECT id FROM queue_jobs
                WHERE state = 'queued'
                ORDER BY enqueued_at ASC, rowid ASC
                LIMIT 1
            )
            RETURNING id, url
            "#,
        )
        .bind(self.clock.now())
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(row.map(|row| ClaimedJob {
            id: row.get("id"),
            task: DownloadTask {
                url: row.get("url"),
            },
        }))
    }

    async fn error_of(&self, id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT error
            FROM queue_jobs
            WHERE id = ?1
              AND (ended_at IS NULL OR ended_at + ?2 > ?3)
            "#,
        )
        .bind(id)
        .bind(self.result_ttl_secs)
        .bind(self.clock.now())
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(row.and_then(|row| row.get("error")))
    }

    async fn mark_finished(&self, id: &str) -> Result<(), StoreError> {
        self.end(id, JobStatus::Finished, None).await
    }

    async fn mark_failed(&self, id: &str, message: &str) -> Result<(), StoreError> {
        self.end(id, JobStatus::Failed, Some(message)).await
    }

    async fn recover_running(&self) -> Result<u64, StoreError> {
        let r = sqlx::query(
            r#"
            UPDATE queue_jobs
            SET state = 'queued',
                started_at = NULL
            WHERE state = 'running'
            "#,
        )
        .execute(&self.db.pool)
        .await?;
        Ok(r.rows_affected())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let r = sqlx::query(
            r#"
            DELETE FROM queue_jobs
            WHERE ended_at IS NOT NULL
              AND ended_at + ?1 <= ?2
            "#,
        )
        .bind(self.result_ttl_secs)
        .bind(self.clock.now())
        .execute(&self.db.pool)
        .await?;
        Ok(r.rows_affected())
    }
}
