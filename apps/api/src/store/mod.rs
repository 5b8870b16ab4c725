//! Store — the platform's relational tables as seen by the recommendation and notification core.
//!
//! The core only depends on `JobStore`. `PgStore` is the production backend; tests use the
//! in-memory store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{JobPosting, Profile};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of an insert-if-absent on the notification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Returns `None` when the student has no profile.
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Active postings, newest first. With `created_after`, only postings created at or after it.
    async fn list_active_postings(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobPosting>, StoreError>;

    /// Opted-in profiles with a field of study or career interests on file.
    async fn list_notifiable_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// The subset of `job_ids` this student has already been notified about.
    async fn find_notification_records(
        &self,
        student_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError>;

    /// Atomic insert-if-absent of one (student, posting) record.
    async fn insert_notification_record(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> Result<InsertOutcome, StoreError>;
}
