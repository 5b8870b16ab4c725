use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A student's stored attributes, read-only to the recommendation and notification paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub field_of_study: Option<String>,
    pub career_interests: Option<String>,
    pub bio: Option<String>,
    #[sqlx(rename = "job_notifications_enabled")]
    pub notifications_enabled: bool,
}

impl Profile {
    /// True when at least one of field of study, career interests or bio carries text.
    /// Profiles without it cannot be ranked meaningfully.
    pub fn has_ranking_signal(&self) -> bool {
        self.has_match_signal() || present(&self.bio)
    }

    /// True when field of study or career interests carries text.
    pub fn has_match_signal(&self) -> bool {
        present(&self.field_of_study) || present(&self.career_interests)
    }

    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            "there"
        } else {
            name
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
