use std::collections::HashSet;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{JobPosting, Profile};
use crate::store::{InsertOutcome, JobStore, StoreError};

const PROFILE_COLUMNS: &str = "id, email, full_name, field_of_study, career_interests, bio, \
    COALESCE(job_notifications_enabled, true) AS job_notifications_enabled";

const POSTING_COLUMNS: &str = "id, job_title, job_description, requirements, employer_name, \
    employment_type, location, salary_range, external_url, \
    COALESCE(is_active, false) AS is_active, created_at";

/// `JobStore` over the platform's Postgres tables.
///
/// Requires a unique constraint on `job_notifications (student_id, job_id)`; the
/// insert-if-absent relies on it to stay atomic under concurrent sweeps.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> AnyResult<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn list_active_postings(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings \
             WHERE is_active = true AND ($1::timestamptz IS NULL OR created_at >= $1) \
             ORDER BY created_at DESC"
        );
        let postings = sqlx::query_as::<_, JobPosting>(&sql)
            .bind(created_after)
            .fetch_all(&self.pool)
            .await?;
        debug!("Loaded {} active postings", postings.len());
        Ok(postings)
    }

    async fn list_notifiable_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles \
             WHERE COALESCE(job_notifications_enabled, true) = true \
               AND (field_of_study IS NOT NULL OR career_interests IS NOT NULL)"
        );
        let profiles = sqlx::query_as::<_, Profile>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    async fn find_notification_records(
        &self,
        student_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        if job_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let sent: Vec<Uuid> = sqlx::query_scalar(
            "SELECT job_id FROM job_notifications WHERE student_id = $1 AND job_id = ANY($2)",
        )
        .bind(student_id)
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(sent.into_iter().collect())
    }

    async fn insert_notification_record(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_notifications (student_id, job_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, job_id) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }
}
