//! Validity-window arithmetic for single-instance Redlock.
//!
//! The store's expiry clock and ours are not the same clock, so the window we
//! hand to the caller is the TTL minus the time the acquire round-trip took,
//! minus a drift allowance proportional to the TTL.

/// Fraction of the TTL reserved for clock drift (1%).
pub const CLOCK_DRIFT_FACTOR: f64 = 0.01;

/// Store expiry resolution (1ms) plus a 1ms minimum drift for small TTLs.
pub const DRIFT_FLOOR_MILLIS: i64 = 2;

/// Largest TTL whose millisecond value fits the validity arithmetic.
pub const MAX_TTL_SECONDS: u64 = (i64::MAX / 1000) as u64;

pub fn ttl_millis(ttl_seconds: u64) -> i64 {
    (ttl_seconds as i64).saturating_mul(1000)
}

/// `floor(ttl_ms * drift_factor) + 2`
pub fn drift_millis(ttl_seconds: u64, drift_factor: f64) -> i64 {
    (ttl_millis(ttl_seconds) as f64 * drift_factor).floor() as i64 + DRIFT_FLOOR_MILLIS
}

pub fn validity_millis(ttl_seconds: u64, elapsed_millis: i64, drift_factor: f64) -> i64 {
    ttl_millis(ttl_seconds) - elapsed_millis - drift_millis(ttl_seconds, drift_factor)
}
