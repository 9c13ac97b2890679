use crate::domain::ports::lock_event_logger::LockEventLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub const DEFAULT_LOG_FILTER: &str = "oxilock=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a global
/// subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_target(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Reports lock events through `tracing`
#[derive(Clone, Default)]
pub struct TracingLockEventLogger;

impl TracingLockEventLogger {
    pub fn new() -> Self {
        Self
    }
}

impl LockEventLogger for TracingLockEventLogger {
    fn acquisition_failed(&self, resource: &str, ttl_seconds: u64) {
        tracing::warn!(
            event = "lock_acquisition_failed",
            resource = %resource,
            ttl_seconds,
            "Failed to acquire lock"
        );
    }
}
