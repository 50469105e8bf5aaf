//! SQLite database shared by the record store and the job queue.
//!
//! Handles connection and migrations. Record store and queue operations live
//! in `store::sqlite` and `queue::sqlite`.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Handle to the SQLite database.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/vdq/vdq.db`. The HTTP server and any worker processes
/// open the same file.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: Pool<Sqlite>,
}

impl Database {
    /// Open (or create) the default database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vdq")?;
        let state_dir = xdg_dirs.get_state_home().join("vdq");
        Self::open_at(state_dir.join("vdq.db")).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // WAL lets the server read while a worker process writes.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open a private in-memory database (no disk I/O).
    pub async fn open_in_memory() -> Result<Self> {
        // Single connection that never idles out: every new in-memory
        // connection would be a different, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Database { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // - `queue_jobs` is the queue: live execution state per job id.
        // - `job_records` holds per-job metadata with an absolute expiry.
        // - `recent_jobs` is the bounded recency index; higher `seq` = newer.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue_jobs (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                state TEXT NOT NULL,
                enqueued_at INTEGER NOT NULL,
                started_at INTEGER,
                ended_at INTEGER,
                error TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS queue_jobs_state
            ON queue_jobs (state, enqueued_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_records (
                id TEXT PRIMARY KEY,
                request_url TEXT NOT NULL,
                submitted_at INTEGER NOT NULL,
                display_title TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recent_jobs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id TEXT NOT NULL UNIQUE
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
