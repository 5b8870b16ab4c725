use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// "This student has already been notified about this posting."
/// At most one row exists per (student_id, job_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRecord {
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub created_at: DateTime<Utc>,
}
