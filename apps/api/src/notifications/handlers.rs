//! Axum route handler for the notification sweep, called by an external scheduler.

use axum::{body::Bytes, extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::errors::AppError;
use crate::notifications::sweep::{NotificationSweeper, SweepReport};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SweepRequest {
    /// Postings created at or after this instant are considered.
    /// Defaults to now minus the configured sweep window.
    pub window_start: Option<DateTime<Utc>>,
}

/// POST /api/v1/notifications/sweep
///
/// The body is optional; a scheduler may POST with no body at all.
pub async fn handle_sweep(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SweepReport>, AppError> {
    let request: SweepRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SweepRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid sweep request: {e}")))?
    };

    let now = Utc::now();
    let window_start = match request.window_start {
        Some(start) => start,
        None => default_window_start(now, state.config.sweep_window_hours)?,
    };

    if window_start > now {
        return Err(AppError::Validation(
            "window_start cannot be in the future".to_string(),
        ));
    }

    let sweeper = NotificationSweeper::new(
        state.store.clone(),
        state.delivery.clone(),
        state.config.app_base_url.clone(),
        state.config.delivery_timeout,
    );
    let report = sweeper.sweep(window_start).await?;

    Ok(Json(report))
}

fn default_window_start(now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_hours(hours)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| AppError::Validation(format!("sweep window of {hours} hours is out of range")))
}
