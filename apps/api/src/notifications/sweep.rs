//! Notification sweep — matches recent postings against opted-in students, sends one digest
//! per student with new matches, and records what was sent.
//!
//! Records are written only after the provider accepts a digest, so a failed dispatch is
//! retried by the next sweep (at-least-once). A recorded (student, posting) pair is never
//! sent again.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{JobPosting, Profile};
use crate::notifications::delivery::{DeliveryError, DeliveryService, EmailMessage};
use crate::notifications::digest::render_digest;
use crate::notifications::matcher::KeywordMatcher;
use crate::store::{InsertOutcome, JobStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Active postings created inside the window.
    pub new_postings: usize,
    /// Profiles considered (opted in, with a match signal).
    pub profiles_checked: usize,
    /// Profiles that received a digest.
    pub notified: usize,
    /// Profiles whose dispatch or record lookup failed; retried next sweep.
    pub failed: usize,
}

#[derive(Debug, Error)]
enum ProfileError {
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DeliveryError),

    #[error("record lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("digest rendering failed: {0}")]
    Render(#[from] askama::Error),
}

enum ProfileOutcome {
    Skipped,
    Notified { postings: usize },
}

/// Job-scoped sweeper; holds only injected handles.
pub struct NotificationSweeper {
    store: Arc<dyn JobStore>,
    delivery: Arc<dyn DeliveryService>,
    app_base_url: String,
    delivery_timeout: Duration,
}

impl NotificationSweeper {
    pub fn new(
        store: Arc<dyn JobStore>,
        delivery: Arc<dyn DeliveryService>,
        app_base_url: String,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            store,
            delivery,
            app_base_url,
            delivery_timeout,
        }
    }

    /// Runs one sweep over postings created at or after `window_start`.
    /// Only failures to load postings or profiles abort the sweep.
    pub async fn sweep(&self, window_start: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let postings = self.store.list_active_postings(Some(window_start)).await?;

        let mut report = SweepReport {
            new_postings: postings.len(),
            ..Default::default()
        };

        if postings.is_empty() {
            info!("No new postings since {window_start}, nothing to notify");
            return Ok(report);
        }

        let profiles: Vec<Profile> = self
            .store
            .list_notifiable_profiles()
            .await?
            .into_iter()
            .filter(Profile::has_match_signal)
            .collect();
        report.profiles_checked = profiles.len();

        for profile in &profiles {
            match self.notify_profile(profile, &postings).await {
                Ok(ProfileOutcome::Notified { postings }) => {
                    info!("Notified {} about {} postings", profile.email, postings);
                    report.notified += 1;
                }
                Ok(ProfileOutcome::Skipped) => {}
                Err(e) => {
                    warn!("Skipping profile {} this sweep: {e}", profile.id);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Sweep finished: {} new postings, {} profiles checked, {} notified, {} failed",
            report.new_postings, report.profiles_checked, report.notified, report.failed
        );
        Ok(report)
    }

    async fn notify_profile(
        &self,
        profile: &Profile,
        postings: &[JobPosting],
    ) -> Result<ProfileOutcome, ProfileError> {
        let matcher = KeywordMatcher::for_profile(profile);
        let matching: Vec<&JobPosting> = postings.iter().filter(|p| matcher.matches(p)).collect();
        if matching.is_empty() {
            return Ok(ProfileOutcome::Skipped);
        }

        let matching_ids: Vec<Uuid> = matching.iter().map(|p| p.id).collect();
        let already_sent = self
            .store
            .find_notification_records(profile.id, &matching_ids)
            .await?;

        // Keeps the newest-first order of `postings`.
        let new_matches: Vec<JobPosting> = matching
            .into_iter()
            .filter(|p| !already_sent.contains(&p.id))
            .cloned()
            .collect();
        if new_matches.is_empty() {
            debug!("Profile {} already notified about all matches", profile.id);
            return Ok(ProfileOutcome::Skipped);
        }

        let digest = render_digest(profile, &new_matches, &self.app_base_url)?;
        let message = EmailMessage {
            to: profile.email.clone(),
            subject: digest.subject,
            html: digest.html,
        };

        match tokio::time::timeout(self.delivery_timeout, self.delivery.send(&message)).await {
            Ok(result) => result?,
            Err(_) => return Err(DeliveryError::TimedOut.into()),
        }

        for posting in &new_matches {
            match self
                .store
                .insert_notification_record(profile.id, posting.id)
                .await
            {
                Ok(InsertOutcome::Inserted) => {}
                Ok(InsertOutcome::AlreadyExists) => {
                    debug!(
                        "Record for ({}, {}) written by a concurrent sweep",
                        profile.id, posting.id
                    );
                }
                // The digest is out; a missing record only risks a repeat next sweep.
                Err(e) => warn!(
                    "Failed to record notification ({}, {}): {e}",
                    profile.id, posting.id
                ),
            }
        }

        Ok(ProfileOutcome::Notified {
            postings: new_matches.len(),
        })
    }
}
