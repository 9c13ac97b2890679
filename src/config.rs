use crate::domain::services::validity::CLOCK_DRIFT_FACTOR;
use std::env;
use std::str::FromStr;

pub const DEFAULT_TTL_SECONDS: u64 = 5;
pub const DEFAULT_RETRY_COUNT: u32 = 1;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Immutable lock tuning handed to the `LockManager` at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LockConfig {
    pub default_ttl_seconds: u64,
    /// Total attempts per acquire call, not additional retries
    pub retry_count: u32,
    /// Exclusive upper bound of the random sleep between attempts
    pub retry_delay_ms: u64,
    pub clock_drift_factor: f64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            clock_drift_factor: CLOCK_DRIFT_FACTOR,
        }
    }
}

impl LockConfig {
    pub fn acquire_options(&self) -> AcquireOptions {
        AcquireOptions {
            ttl_seconds: self.default_ttl_seconds,
            retry_count: self.retry_count,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

/// Per-call overrides for a single acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireOptions {
    pub ttl_seconds: u64,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
}

impl AcquireOptions {
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }
}

impl Default for AcquireOptions {
    fn default() -> Self {
        LockConfig::default().acquire_options()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store_url: String,
    pub default_ttl_seconds: u64,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    pub clock_drift_factor: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let store_url =
            env::var("LOCK_STORE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());

        let default_ttl_seconds = parse_var("LOCK_DEFAULT_TTL_SECONDS", DEFAULT_TTL_SECONDS)?;
        if default_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "LOCK_DEFAULT_TTL_SECONDS",
                value: "0".to_string(),
            });
        }

        let retry_count = parse_var("LOCK_RETRY_COUNT", DEFAULT_RETRY_COUNT)?;
        let retry_delay_ms = parse_var("LOCK_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?;

        let clock_drift_factor = parse_var("LOCK_CLOCK_DRIFT_FACTOR", CLOCK_DRIFT_FACTOR)?;
        if !(0.0..1.0).contains(&clock_drift_factor) {
            return Err(ConfigError::InvalidValue {
                name: "LOCK_CLOCK_DRIFT_FACTOR",
                value: clock_drift_factor.to_string(),
            });
        }

        Ok(Config {
            store_url,
            default_ttl_seconds,
            retry_count,
            retry_delay_ms,
            clock_drift_factor,
        })
    }

    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            default_ttl_seconds: self.default_ttl_seconds,
            retry_count: self.retry_count,
            retry_delay_ms: self.retry_delay_ms,
            clock_drift_factor: self.clock_drift_factor,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let parsed = raw.trim().parse();
            parsed.map_err(|_| ConfigError::InvalidValue { name, value: raw })
        }
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unsupported lock store URL: {0}")]
    UnsupportedStoreUrl(String),
}
