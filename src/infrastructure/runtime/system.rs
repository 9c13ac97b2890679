use crate::domain::errors::LockResult;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::token_generator::TokenGenerator;
use crate::shared::utils::generate_lock_token;
use chrono::Utc;

/// Wall clock backed by the system time
#[derive(Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Token generator drawing from the operating system RNG
#[derive(Clone, Default)]
pub struct OsTokenGenerator;

impl OsTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self) -> LockResult<String> {
        generate_lock_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_epoch_millis() {
        let before = Utc::now().timestamp_millis();
        let now = SystemClock::new().now_millis();
        let after = Utc::now().timestamp_millis();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_os_token_generator_produces_distinct_tokens() {
        let generator = OsTokenGenerator::new();
        assert_ne!(generator.generate().unwrap(), generator.generate().unwrap());
    }
}
