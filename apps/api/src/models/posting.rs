use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Mirrors the `employment_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    Internship,
    PartTime,
    FullTime,
    GraduateProgram,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::Internship => "internship",
            EmploymentType::PartTime => "part_time",
            EmploymentType::FullTime => "full_time",
            EmploymentType::GraduateProgram => "graduate_program",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    #[sqlx(rename = "job_title")]
    pub title: String,
    #[sqlx(rename = "job_description")]
    pub description: String,
    pub requirements: Option<String>,
    pub employer_name: String,
    pub employment_type: EmploymentType,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    /// Set when the posting was imported from a third-party site.
    pub external_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
