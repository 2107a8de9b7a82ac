use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// What the worker did with a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "swipe_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Viewed,
    Applied,
    Skipped,
    Saved,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Viewed => "viewed",
            SwipeAction::Applied => "applied",
            SwipeAction::Skipped => "skipped",
            SwipeAction::Saved => "saved",
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = PostgresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewed" | "view" => Ok(SwipeAction::Viewed),
            "applied" | "apply" => Ok(SwipeAction::Applied),
            "skipped" | "skip" | "pass" => Ok(SwipeAction::Skipped),
            "saved" | "save" => Ok(SwipeAction::Saved),
            other => Err(PostgresError::InvalidInput(format!(
                "unknown swipe action: {}",
                other
            ))),
        }
    }
}

/// Record of a seen posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenJob {
    pub worker_id: String,
    pub job_id: String,
    pub action: SwipeAction,
    pub seen_at: chrono::DateTime<chrono::Utc>,
}

/// PostgreSQL client for the seen log
///
/// Keeps track of which postings a worker has already swiped on, so the
/// ranking pipeline can exclude them from later recommendations.
#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL at {}", redact_url(url));

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Record that a worker has swiped on a posting
    ///
    /// A repeated swipe on the same posting replaces the earlier action.
    pub async fn record_seen(
        &self,
        worker_id: &str,
        job_id: &str,
        action: SwipeAction,
    ) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO seen_jobs (worker_id, job_id, action, seen_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (worker_id, job_id)
            DO UPDATE SET
                action = EXCLUDED.action,
                seen_at = EXCLUDED.seen_at
        "#;

        sqlx::query(query)
            .bind(worker_id)
            .bind(job_id)
            .bind(action)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Recorded seen job: {} -> {} ({})", worker_id, job_id, action);

        Ok(())
    }

    /// Job ids the worker has already seen
    pub async fn get_seen_jobs(&self, worker_id: &str) -> Result<Vec<String>, PostgresError> {
        let query = r#"
            SELECT job_id
            FROM seen_jobs
            WHERE worker_id = $1
        "#;

        let rows = sqlx::query(query).bind(worker_id).fetch_all(&self.pool).await?;

        let seen_ids: Vec<String> = rows.iter().map(|row| row.get("job_id")).collect();

        tracing::debug!("Worker {} has seen {} jobs", worker_id, seen_ids.len());

        Ok(seen_ids)
    }

    /// Seen records, newest first
    pub async fn get_seen_jobs_paginated(
        &self,
        worker_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SeenJob>, PostgresError> {
        let query = r#"
            SELECT worker_id, job_id, action, seen_at
            FROM seen_jobs
            WHERE worker_id = $1
            ORDER BY seen_at DESC
            LIMIT $2 OFFSET $3
        "#;

        let rows = sqlx::query(query)
            .bind(worker_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(SeenJob {
                    worker_id: row.try_get("worker_id")?,
                    job_id: row.try_get("job_id")?,
                    action: row.try_get("action")?,
                    seen_at: row.try_get("seen_at")?,
                })
            })
            .collect()
    }

    /// Forget one swipe so the posting can be recommended again
    pub async fn remove_seen(&self, worker_id: &str, job_id: &str) -> Result<bool, PostgresError> {
        let query = r#"
            DELETE FROM seen_jobs
            WHERE worker_id = $1 AND job_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(worker_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear all seen jobs for a worker
    pub async fn clear_seen_jobs(&self, worker_id: &str) -> Result<u64, PostgresError> {
        let query = r#"
            DELETE FROM seen_jobs
            WHERE worker_id = $1
        "#;

        let result = sqlx::query(query).bind(worker_id).execute(&self.pool).await?;

        tracing::info!(
            "Cleared {} seen jobs for worker {}",
            result.rows_affected(),
            worker_id
        );

        Ok(result.rows_affected())
    }

    /// Per-action counts for a worker
    pub async fn get_seen_stats(&self, worker_id: &str) -> Result<SeenStats, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total_seen,
                COUNT(*) FILTER (WHERE action = 'viewed') as viewed,
                COUNT(*) FILTER (WHERE action = 'applied') as applied,
                COUNT(*) FILTER (WHERE action = 'skipped') as skipped,
                COUNT(*) FILTER (WHERE action = 'saved') as saved,
                MAX(seen_at) as last_seen_at
            FROM seen_jobs
            WHERE worker_id = $1
        "#;

        let row = sqlx::query(query).bind(worker_id).fetch_one(&self.pool).await?;

        Ok(SeenStats {
            worker_id: worker_id.to_string(),
            total_seen: row.try_get("total_seen")?,
            viewed: row.try_get("viewed")?,
            applied: row.try_get("applied")?,
            skipped: row.try_get("skipped")?,
            saved: row.try_get("saved")?,
            last_seen_at: row.try_get("last_seen_at")?,
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Statistics about a worker's seen log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenStats {
    pub worker_id: String,
    pub total_seen: i64,
    pub viewed: i64,
    pub applied: i64,
    pub skipped: i64,
    pub saved: i64,
    pub last_seen_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Drop the password from a connection string before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swipe_action_parsing() {
        assert_eq!("applied".parse::<SwipeAction>().unwrap(), SwipeAction::Applied);
        assert_eq!(" Skip ".parse::<SwipeAction>().unwrap(), SwipeAction::Skipped);
        assert_eq!("saved".parse::<SwipeAction>().unwrap(), SwipeAction::Saved);
        assert!(matches!(
            "superlike".parse::<SwipeAction>(),
            Err(PostgresError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_swipe_action_display() {
        assert_eq!(SwipeAction::Viewed.to_string(), "viewed");
        assert_eq!(
            serde_json::to_string(&SwipeAction::Applied).unwrap(),
            "\"applied\""
        );
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://app:secret@db:5432/helper_match"),
            "postgres://app:***@db:5432/helper_match"
        );
        assert_eq!(redact_url("postgres://db/helper_match"), "postgres://db/helper_match");
    }
}
