//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CODEFORCES_API_URL, DEFAULT_CODEFORCES_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_ENVIRONMENT, DEFAULT_INACTIVITY_THRESHOLD_DAYS, DEFAULT_INLINE_SYNC_TIMEOUT_SECS,
    DEFAULT_MAIL_FROM_NAME, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SYNC_REQUEST_DELAY_MS, DEFAULT_SYNC_SCHEDULE, DEFAULT_SYNC_STUDENT_DELAY_MS,
    MAX_INACTIVITY_THRESHOLD_DAYS, PRODUCTION_ENVIRONMENT, SNAPSHOT_FRESHNESS_HOURS,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (development, staging, production)
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub codeforces: CodeforcesConfig,
    pub sync: SyncConfig,
    pub mail: MailConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Codeforces API client configuration
#[derive(Debug, Clone)]
pub struct CodeforcesConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

/// Sync pipeline configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Cron expression used until one is stored in the settings table
    pub default_schedule: String,
    /// Inactivity threshold written into a freshly created settings row
    pub default_inactivity_threshold_days: i32,
    pub request_delay_ms: u64,
    pub student_delay_ms: u64,
    /// Also pull per-contest standings to count unsolved problems
    pub count_unsolved: bool,
    /// Upper bound for the sync run inside a create or update request
    pub inline_timeout_secs: u64,
}

/// How reminder emails leave the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// Deliver through an SMTP relay
    Smtp,
    /// Only log the rendered message (development)
    Log,
}

/// Outbound mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub relay: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string()),
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            codeforces: CodeforcesConfig::from_env()?,
            sync: SyncConfig::from_env()?,
            mail: MailConfig::from_env()?,
        })
    }

    /// Whether the service runs in production
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_ENVIRONMENT
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "cftrack=info,tower_http=info".to_string()),
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl CodeforcesConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env::var("CODEFORCES_API_URL")
                .unwrap_or_else(|_| DEFAULT_CODEFORCES_API_URL.to_string()),
            timeout_secs: parse_var("CODEFORCES_TIMEOUT_SECS", DEFAULT_CODEFORCES_TIMEOUT_SECS)?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let default_inactivity_threshold_days = check_threshold(parse_var(
            "INACTIVITY_THRESHOLD_DAYS",
            DEFAULT_INACTIVITY_THRESHOLD_DAYS,
        )?)?;

        Ok(Self {
            default_schedule: env::var("SYNC_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SYNC_SCHEDULE.to_string()),
            default_inactivity_threshold_days,
            request_delay_ms: parse_var("SYNC_REQUEST_DELAY_MS", DEFAULT_SYNC_REQUEST_DELAY_MS)?,
            student_delay_ms: parse_var("SYNC_STUDENT_DELAY_MS", DEFAULT_SYNC_STUDENT_DELAY_MS)?,
            count_unsolved: parse_flag(env::var("SYNC_COUNT_UNSOLVED").ok().as_deref()),
            inline_timeout_secs: parse_var(
                "SYNC_INLINE_TIMEOUT_SECS",
                DEFAULT_INLINE_SYNC_TIMEOUT_SECS,
            )?,
        })
    }

    /// Pipeline options derived from this configuration
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            request_delay: Duration::from_millis(self.request_delay_ms),
            student_delay: Duration::from_millis(self.student_delay_ms),
            count_unsolved: self.count_unsolved,
            freshness: chrono::Duration::hours(SNAPSHOT_FRESHNESS_HOURS),
            inline_timeout: Duration::from_secs(self.inline_timeout_secs),
        }
    }

    /// Values the settings row is seeded with on first read
    pub fn settings_defaults(&self) -> SettingsDefaults {
        SettingsDefaults {
            sync_schedule: self.default_schedule.clone(),
            inactivity_threshold_days: self.default_inactivity_threshold_days,
        }
    }
}

/// Seed values for the settings row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDefaults {
    pub sync_schedule: String,
    pub inactivity_threshold_days: i32,
}

/// Runtime knobs for the sync pipeline
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Sleep between two platform calls for the same student
    pub request_delay: Duration,
    /// Sleep after each successfully synced student
    pub student_delay: Duration,
    pub count_unsolved: bool,
    /// Unforced syncs keep snapshots younger than this
    pub freshness: chrono::Duration,
    /// Deadline for the forced sync run while a request waits on it
    pub inline_timeout: Duration,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let transport = parse_transport(env::var("MAIL_TRANSPORT").ok().as_deref())?;
        let relay = env::var("SMTP_RELAY").ok().filter(|v| !v.is_empty());

        if transport == MailTransport::Smtp && relay.is_none() {
            return Err(ConfigError::Missing("SMTP_RELAY".to_string()));
        }

        let username = env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty());
        let from_address = env::var("MAIL_FROM_ADDRESS")
            .ok()
            .or_else(|| username.clone())
            .unwrap_or_else(|| "noreply@localhost".to_string());

        Ok(Self {
            transport,
            relay,
            username,
            password: env::var("SMTP_PASSWORD").ok(),
            from_address,
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| DEFAULT_MAIL_FROM_NAME.to_string()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

fn check_threshold(days: i32) -> Result<i32, ConfigError> {
    if (1..=MAX_INACTIVITY_THRESHOLD_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::InvalidValue("INACTIVITY_THRESHOLD_DAYS".to_string()))
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn parse_transport(raw: Option<&str>) -> Result<MailTransport, ConfigError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("log") => Ok(MailTransport::Log),
        Some("smtp") => Ok(MailTransport::Smtp),
        Some(_) => Err(ConfigError::InvalidValue("MAIL_TRANSPORT".to_string())),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
