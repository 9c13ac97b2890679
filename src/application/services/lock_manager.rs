use crate::application::services::lock_guard::{LockGuard, PendingRelease};
use crate::config::{AcquireOptions, LockConfig};
use crate::domain::entities::LockHandle;
use crate::domain::errors::{LockError, LockResult};
use crate::domain::ports::clock::Clock;
use crate::domain::ports::lock_event_logger::LockEventLogger;
use crate::domain::ports::lock_store::LockStore;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use crate::domain::ports::token_generator::TokenGenerator;
use crate::domain::services::validity::{validity_millis, MAX_TTL_SECONDS};
use crate::infrastructure::observability::TracingLockEventLogger;
use crate::infrastructure::runtime::system::{OsTokenGenerator, SystemClock};
use crate::infrastructure::runtime::tokio::{TokioTaskSpawner, TokioTimeService};
use futures::FutureExt;
use rand::Rng;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// Single-instance Redlock lock manager.
///
/// Holds no lock state of its own: mutual exclusion comes entirely from the
/// atomic primitives of the injected `LockStore`.
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn LockStore>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    time_service: Arc<dyn TimeService>,
    events: Arc<dyn LockEventLogger>,
    task_spawner: Arc<dyn TaskSpawner>,
    config: LockConfig,
}

impl LockManager {
    /// Manager with the production collaborators: OS randomness, system
    /// clock, Tokio sleeps and tracing events.
    pub fn new(store: Arc<dyn LockStore>, config: LockConfig) -> Self {
        Self {
            store,
            tokens: Arc::new(OsTokenGenerator::new()),
            clock: Arc::new(SystemClock::new()),
            time_service: Arc::new(TokioTimeService::new()),
            events: Arc::new(TracingLockEventLogger::new()),
            task_spawner: Arc::new(TokioTaskSpawner::new()),
            config,
        }
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_time_service(mut self, time_service: Arc<dyn TimeService>) -> Self {
        self.time_service = time_service;
        self
    }

    pub fn with_event_logger(mut self, events: Arc<dyn LockEventLogger>) -> Self {
        self.events = events;
        self
    }

    pub fn with_task_spawner(mut self, task_spawner: Arc<dyn TaskSpawner>) -> Self {
        self.task_spawner = task_spawner;
        self
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Acquire `resource` with the configured defaults.
    pub async fn acquire(&self, resource: &str) -> LockResult<LockHandle> {
        self.acquire_with(resource, self.config.acquire_options()).await
    }

    /// Acquire `resource`, making up to `options.retry_count` attempts.
    ///
    /// One token is generated per call and reused by every attempt. An attempt
    /// wins only if the store accepted the set and the remaining validity,
    /// net of the round-trip and drift allowance, is strictly positive.
    /// Store errors abort immediately and are never retried here. Dropping
    /// the returned future while a set is in flight releases the token in
    /// the background.
    pub async fn acquire_with(
        &self,
        resource: &str,
        options: AcquireOptions,
    ) -> LockResult<LockHandle> {
        if options.ttl_seconds == 0 || options.ttl_seconds > MAX_TTL_SECONDS {
            return Err(LockError::InvalidTtl(options.ttl_seconds));
        }

        let token = self.tokens.generate()?;
        let attempts = options.retry_count.max(1);
        let mut pending = PendingRelease::new(
            resource,
            &token,
            self.store.clone(),
            self.task_spawner.clone(),
        );

        for attempt in 1..=attempts {
            let start = self.clock.now_millis();
            pending.arm();
            let acquired = match self
                .store
                .set_if_absent_with_expiry(resource, &token, options.ttl_seconds)
                .await
            {
                Ok(acquired) => acquired,
                Err(e) => {
                    pending.disarm();
                    return Err(e);
                }
            };
            let elapsed = self.clock.now_millis() - start;
            let validity = validity_millis(
                options.ttl_seconds,
                elapsed,
                self.config.clock_drift_factor,
            );

            if acquired && validity > 0 {
                tracing::debug!(
                    resource = %resource,
                    attempt,
                    validity_millis = validity,
                    "Lock acquired"
                );
                pending.disarm();
                return Ok(LockHandle::new(resource, token, validity));
            }

            if acquired {
                // Set went through but the window is already spent
                self.discard_unusable(resource, &token).await;
            }
            pending.disarm();

            tracing::debug!(
                resource = %resource,
                attempt,
                attempts,
                acquired,
                validity_millis = validity,
                "Lock attempt failed"
            );

            if attempt < attempts {
                self.time_service
                    .sleep(retry_jitter(options.retry_delay_ms))
                    .await;
            }
        }

        self.events.acquisition_failed(resource, options.ttl_seconds);
        Err(LockError::AcquisitionFailed {
            resource: resource.to_string(),
        })
    }

    /// Acquire and wrap the handle in a guard that releases on drop.
    pub async fn acquire_guard(
        &self,
        resource: &str,
        options: AcquireOptions,
    ) -> LockResult<LockGuard> {
        let handle = self.acquire_with(resource, options).await?;
        Ok(LockGuard::new(
            handle,
            self.store.clone(),
            self.task_spawner.clone(),
        ))
    }

    /// Release the lock described by `handle`.
    ///
    /// Returns false if the lock had already expired or now belongs to
    /// another holder; nothing is deleted in that case.
    pub async fn release(&self, handle: &LockHandle) -> LockResult<bool> {
        let released = self
            .store
            .compare_and_delete(&handle.resource, &handle.token)
            .await?;

        if released {
            tracing::debug!(resource = %handle.resource, "Lock released");
        } else {
            tracing::debug!(
                resource = %handle.resource,
                "Lock already expired or taken over, nothing released"
            );
        }
        Ok(released)
    }

    /// Run `body` while holding `resource`.
    ///
    /// The lock is released exactly once whether `body` returns `Ok`, returns
    /// `Err`, panics, or the returned future is dropped before completion. If
    /// acquisition fails `body` is never called.
    pub async fn with_lock<T, E, F, Fut>(
        &self,
        resource: &str,
        ttl_seconds: Option<u64>,
        body: F,
    ) -> Result<T, E>
    where
        F: FnOnce(LockHandle) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let mut options = self.config.acquire_options();
        if let Some(ttl_seconds) = ttl_seconds {
            options = options.with_ttl(ttl_seconds);
        }

        let guard = self.acquire_guard(resource, options).await?;
        let outcome = AssertUnwindSafe(body(guard.handle().clone()))
            .catch_unwind()
            .await;
        let released = guard.release().await;

        match outcome {
            Ok(Ok(value)) => {
                released?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(release_err) = released {
                    tracing::warn!(
                        resource = %resource,
                        "Failed to release lock after critical section error: {}",
                        release_err
                    );
                }
                Err(err)
            }
            Err(panic) => {
                if let Err(release_err) = released {
                    tracing::warn!(
                        resource = %resource,
                        "Failed to release lock after critical section panic: {}",
                        release_err
                    );
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn discard_unusable(&self, resource: &str, token: &str) {
        if let Err(e) = self.store.compare_and_delete(resource, token).await {
            tracing::warn!(
                resource = %resource,
                "Failed to discard lock with spent validity window: {}",
                e
            );
        }
    }
}

/// Uniform random delay in `[0, bound_ms)` milliseconds
fn retry_jitter(bound_ms: u64) -> Duration {
    if bound_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..bound_ms))
}
