use std::time::Duration;

use anyhow::{ensure, Context, Result};

/// Upper bound for `SWEEP_WINDOW_HOURS`: one year.
pub const MAX_SWEEP_WINDOW_HOURS: i64 = 24 * 365;

/// Service configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai_gateway_api_key: String,
    pub resend_api_key: String,
    /// Sender shown on notification digests.
    pub notify_from: String,
    /// Public URL of the job board, used for links inside digests.
    pub app_base_url: String,
    pub ranking_timeout: Duration,
    pub delivery_timeout: Duration,
    /// Default look-back window for a notification sweep.
    pub sweep_window_hours: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai_gateway_api_key: require_env("AI_GATEWAY_API_KEY")?,
            resend_api_key: require_env("RESEND_API_KEY")?,
            notify_from: optional_env("NOTIFY_FROM", "GoHire <onboarding@resend.dev>"),
            app_base_url: optional_env("APP_BASE_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            ranking_timeout: Duration::from_secs(parse_env("RANKING_TIMEOUT_SECS", 30)?),
            delivery_timeout: Duration::from_secs(parse_env("DELIVERY_TIMEOUT_SECS", 15)?),
            sweep_window_hours: validate_window_hours(parse_env("SWEEP_WINDOW_HOURS", 24)?)?,
            port: parse_env("PORT", 8080)?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_window_hours(hours: i64) -> Result<i64> {
    ensure!(
        (1..=MAX_SWEEP_WINDOW_HOURS).contains(&hours),
        "SWEEP_WINDOW_HOURS must be between 1 and {MAX_SWEEP_WINDOW_HOURS}, got {hours}"
    );
    Ok(hours)
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests; never touches the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/jobboard_test".to_string(),
            ai_gateway_api_key: "test-key".to_string(),
            resend_api_key: "test-key".to_string(),
            notify_from: "GoHire <test@example.com>".to_string(),
            app_base_url: "https://jobs.example.com".to_string(),
            ranking_timeout: Duration::from_secs(5),
            delivery_timeout: Duration::from_secs(5),
            sweep_window_hours: 24,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_hours_within_bounds_are_kept() {
        assert_eq!(validate_window_hours(24).unwrap(), 24);
        assert_eq!(validate_window_hours(1).unwrap(), 1);
        assert_eq!(
            validate_window_hours(MAX_SWEEP_WINDOW_HOURS).unwrap(),
            MAX_SWEEP_WINDOW_HOURS
        );
    }

    #[test]
    fn test_window_hours_out_of_bounds_are_rejected() {
        for hours in [0, -6, MAX_SWEEP_WINDOW_HOURS + 1, 10_000_000_000_000] {
            let err = validate_window_hours(hours).unwrap_err();
            assert!(err.to_string().contains("SWEEP_WINDOW_HOURS"));
        }
    }
}
