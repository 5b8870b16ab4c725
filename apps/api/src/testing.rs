//! Test fixtures and collaborator fakes shared by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{EmploymentType, JobPosting, Profile};
use crate::notifications::delivery::{DeliveryError, DeliveryService, EmailMessage};
use crate::recommendation::ranking::{RankingError, RankingRequest, RankingService};

/// Reference "now" for fixtures. Postings are created relative to it.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn profile(
    field_of_study: Option<&str>,
    career_interests: Option<&str>,
    bio: Option<&str>,
) -> Profile {
    let id = Uuid::new_v4();
    Profile {
        id,
        email: format!("{id}@example.com"),
        full_name: "Test Student".to_string(),
        field_of_study: field_of_study.map(str::to_string),
        career_interests: career_interests.map(str::to_string),
        bio: bio.map(str::to_string),
        notifications_enabled: true,
    }
}

/// An active internship created `minutes_ago` minutes before `base_time()`.
pub fn posting(title: &str, description: &str, minutes_ago: i64) -> JobPosting {
    JobPosting {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        requirements: None,
        employer_name: "Acme".to_string(),
        employment_type: EmploymentType::Internship,
        location: None,
        salary_range: None,
        external_url: None,
        is_active: true,
        created_at: base_time() - ChronoDuration::minutes(minutes_ago),
    }
}

/// A ranker that always gives the same answer and counts calls.
pub struct ScriptedRanker {
    response: Result<Vec<String>, RankingError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRanker {
    pub fn returning(ids: Vec<String>) -> Self {
        Self {
            response: Ok(ids),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: RankingError) -> Self {
        Self {
            response: Err(err),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RankingService for ScriptedRanker {
    async fn rank(&self, _request: &RankingRequest) -> Result<Vec<String>, RankingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// Records accepted messages; fails for configured recipients.
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl RecordingDelivery {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_for(&self, recipient: &str) {
        self.failing.lock().unwrap().insert(recipient.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryService for RecordingDelivery {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&message.to) {
            return Err(DeliveryError::Rejected {
                status: 500,
                message: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
