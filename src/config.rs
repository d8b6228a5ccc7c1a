use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

use crate::engine::rules::{
    AttendanceRules, DEFAULT_EARLY_LEAVE_THRESHOLD_MINUTES, DEFAULT_LATE_THRESHOLD_MINUTES,
    DEFAULT_OUT_OF_SHIFT_EARLY_WINDOW_MINUTES, MAX_THRESHOLD_MINUTES,
};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub qr_token_ttl: usize,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_qr_per_min: u32,

    pub api_prefix: String,

    pub attendance_rules: AttendanceRules,
    pub shift_cache_ttl: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Rule thresholds are minutes within one day.
fn threshold_minutes(key: &str, default: i32) -> Result<i32> {
    let value = parsed_or(key, default)?;
    if !(0..=MAX_THRESHOLD_MINUTES).contains(&value) {
        bail!("{key} must be between 0 and {MAX_THRESHOLD_MINUTES} minutes (got {value})");
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            qr_token_ttl: parsed_or("QR_TOKEN_TTL", 300)?, // default 5 min

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_qr_per_min: parsed_or("RATE_QR_PER_MIN", 60)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            attendance_rules: AttendanceRules {
                late_threshold_minutes: threshold_minutes(
                    "LATE_THRESHOLD_MINUTES",
                    DEFAULT_LATE_THRESHOLD_MINUTES,
                )?,
                early_leave_threshold_minutes: threshold_minutes(
                    "EARLY_LEAVE_THRESHOLD_MINUTES",
                    DEFAULT_EARLY_LEAVE_THRESHOLD_MINUTES,
                )?,
                out_of_shift_early_window_minutes: threshold_minutes(
                    "OUT_OF_SHIFT_EARLY_WINDOW_MINUTES",
                    DEFAULT_OUT_OF_SHIFT_EARLY_WINDOW_MINUTES,
                )?,
            },
            shift_cache_ttl: parsed_or("SHIFT_CACHE_TTL", 3600)?, // default 1 hour
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/hrm_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            qr_token_ttl: 300,
            rate_protected_per_min: 1000,
            rate_qr_per_min: 60,
            api_prefix: "/api".to_string(),
            attendance_rules: AttendanceRules::default(),
            shift_cache_ttl: 60,
        }
    }
}
