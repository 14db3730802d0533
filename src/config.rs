use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use chrono_tz::Tz;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub timezone: Tz,
    pub payment_verification_delay_ms: u64,
    pub payment_success_rate: f64,
    pub family_size_threshold: u32,
    pub small_household_fee: i64,
    pub large_household_fee: i64,
    pub attendance_window_start: NaiveTime,
    pub attendance_window_minutes: i64,
    pub location_poll_secs: u64,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://ecotrack.db?mode=rwc".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            payment_verification_delay_ms: 3000,
            payment_success_rate: 0.8,
            family_size_threshold: 4,
            small_household_fee: 50,
            large_household_fee: 75,
            attendance_window_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            attendance_window_minutes: 30,
            location_poll_secs: 30,
            log_dir: "./logs".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            timezone: parse_var("APP_TIMEZONE").unwrap_or(defaults.timezone),
            payment_verification_delay_ms: parse_var("PAYMENT_VERIFICATION_DELAY_MS")
                .unwrap_or(defaults.payment_verification_delay_ms),
            payment_success_rate: parse_var("PAYMENT_SUCCESS_RATE")
                .map(|rate: f64| rate.clamp(0.0, 1.0))
                .unwrap_or(defaults.payment_success_rate),
            family_size_threshold: parse_var("FAMILY_SIZE_THRESHOLD").unwrap_or(defaults.family_size_threshold),
            small_household_fee: parse_var("SMALL_HOUSEHOLD_FEE").unwrap_or(defaults.small_household_fee),
            large_household_fee: parse_var("LARGE_HOUSEHOLD_FEE").unwrap_or(defaults.large_household_fee),
            attendance_window_start: env::var("ATTENDANCE_WINDOW_START")
                .ok()
                .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
                .unwrap_or(defaults.attendance_window_start),
            attendance_window_minutes: parse_var("ATTENDANCE_WINDOW_MINUTES")
                .unwrap_or(defaults.attendance_window_minutes),
            location_poll_secs: parse_var("LOCATION_POLL_SECS").unwrap_or(defaults.location_poll_secs),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }

    /// Two-tier flat pricing on family size.
    pub fn monthly_fee_for(&self, family_size: u32) -> i64 {
        if family_size <= self.family_size_threshold {
            self.small_household_fee
        } else {
            self.large_household_fee
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
