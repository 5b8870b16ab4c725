//! In-memory `JobStore` for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::notification::NotificationRecord;
use crate::models::{JobPosting, Profile};
use crate::store::{InsertOutcome, JobStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    profiles: Mutex<Vec<Profile>>,
    postings: Mutex<Vec<JobPosting>>,
    records: Mutex<Vec<NotificationRecord>>,
    broken_lookups: Mutex<HashSet<Uuid>>,
    profile_scans: AtomicUsize,
}

impl MemoryStore {
    pub fn new(profiles: Vec<Profile>, postings: Vec<JobPosting>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            postings: Mutex::new(postings),
            ..Default::default()
        }
    }

    pub fn add_posting(&self, posting: JobPosting) {
        self.postings.lock().unwrap().push(posting);
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Number of `list_notifiable_profiles` calls so far.
    pub fn profile_scans(&self) -> usize {
        self.profile_scans.load(Ordering::SeqCst)
    }

    /// Makes record lookups for this student fail, as a flaky database would.
    pub fn break_lookups_for(&self, student_id: Uuid) {
        self.broken_lookups.lock().unwrap().insert(student_id);
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list_active_postings(
        &self,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<JobPosting>, StoreError> {
        let mut postings: Vec<JobPosting> = self
            .postings
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| created_after.map_or(true, |after| p.created_at >= after))
            .cloned()
            .collect();
        postings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(postings)
    }

    async fn list_notifiable_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        self.profile_scans.fetch_add(1, Ordering::SeqCst);
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles
            .iter()
            .filter(|p| p.notifications_enabled)
            .filter(|p| p.field_of_study.is_some() || p.career_interests.is_some())
            .cloned()
            .collect())
    }

    async fn find_notification_records(
        &self,
        student_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, StoreError> {
        if self.broken_lookups.lock().unwrap().contains(&student_id) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.student_id == student_id && job_ids.contains(&r.job_id))
            .map(|r| r.job_id)
            .collect())
    }

    async fn insert_notification_record(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> Result<InsertOutcome, StoreError> {
        // Check and insert under one lock, like ON CONFLICT DO NOTHING.
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.student_id == student_id && r.job_id == job_id)
        {
            return Ok(InsertOutcome::AlreadyExists);
        }
        records.push(NotificationRecord {
            student_id,
            job_id,
            created_at: Utc::now(),
        });
        Ok(InsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_is_idempotent_per_pair() {
        let store = MemoryStore::default();
        let (student, job) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(
            store.insert_notification_record(student, job).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_notification_record(student, job).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(store.records().len(), 1);
    }
}
