use async_trait::async_trait;
use oxilock::domain::ports::clock::Clock;
use oxilock::domain::ports::lock_event_logger::LockEventLogger;
use oxilock::domain::ports::lock_store::LockStore;
use oxilock::domain::ports::time_service::TimeService;
use oxilock::domain::ports::token_generator::TokenGenerator;
use oxilock::{InMemoryLockStore, LockConfig, LockError, LockManager, LockResult};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clock that advances by a fixed step on every reading
pub struct SteppingClock {
    now: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(step: i64) -> Self {
        Self {
            now: AtomicI64::new(1_700_000_000_000),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// Records requested sleeps without sleeping
#[derive(Default)]
pub struct RecordingTimeService {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingTimeService {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimeService for RecordingTimeService {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct RecordingEventLogger {
    pub failures: Mutex<Vec<(String, u64)>>,
}

impl RecordingEventLogger {
    pub fn failures(&self) -> Vec<(String, u64)> {
        self.failures.lock().unwrap().clone()
    }
}

impl LockEventLogger for RecordingEventLogger {
    fn acquisition_failed(&self, resource: &str, ttl_seconds: u64) {
        self.failures
            .lock()
            .unwrap()
            .push((resource.to_string(), ttl_seconds));
    }
}

/// Hands out `token-1`, `token-2`, ... and counts calls
#[derive(Default)]
pub struct SequentialTokenGenerator {
    pub calls: AtomicUsize,
}

impl SequentialTokenGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenGenerator for SequentialTokenGenerator {
    fn generate(&self) -> LockResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{}", n))
    }
}

pub struct NoEntropyTokenGenerator;

impl TokenGenerator for NoEntropyTokenGenerator {
    fn generate(&self) -> LockResult<String> {
        Err(LockError::RandomnessUnavailable(
            "getrandom: entropy source unavailable".to_string(),
        ))
    }
}

/// In-memory store that counts calls and can report the key as held for the
/// first `busy_attempts` sets.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryLockStore,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
    busy_attempts: usize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn busy_for(busy_attempts: usize) -> Self {
        Self {
            busy_attempts,
            ..Self::default()
        }
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LockStore for RecordingStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool> {
        let attempt = self.sets.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.busy_attempts {
            return Ok(false);
        }
        self.inner
            .set_if_absent_with_expiry(key, value, ttl_seconds)
            .await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.compare_and_delete(key, expected).await
    }
}

/// Store whose backend is unreachable
#[derive(Default)]
pub struct UnreachableStore {
    pub calls: AtomicUsize,
}

impl UnreachableStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LockStore for UnreachableStore {
    async fn set_if_absent_with_expiry(&self, _: &str, _: &str, _: u64) -> LockResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LockError::StoreCommunication("connection refused".to_string()))
    }

    async fn compare_and_delete(&self, _: &str, _: &str) -> LockResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LockError::StoreCommunication("connection refused".to_string()))
    }
}

/// Applies every set immediately but delays the reply, like a store whose
/// response is still on the wire when the caller gives up.
pub struct SlowReplyStore {
    pub inner: InMemoryLockStore,
    reply_delay: Duration,
}

impl SlowReplyStore {
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            inner: InMemoryLockStore::new(),
            reply_delay,
        }
    }
}

#[async_trait]
impl LockStore for SlowReplyStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool> {
        let acquired = self
            .inner
            .set_if_absent_with_expiry(key, value, ttl_seconds)
            .await?;
        tokio::time::sleep(self.reply_delay).await;
        Ok(acquired)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool> {
        self.inner.compare_and_delete(key, expected).await
    }
}

/// A manager wired to fakes, plus handles to inspect them
pub struct Harness {
    pub manager: LockManager,
    pub store: Arc<RecordingStore>,
    pub tokens: Arc<SequentialTokenGenerator>,
    pub sleeper: Arc<RecordingTimeService>,
    pub events: Arc<RecordingEventLogger>,
}

impl Harness {
    /// Every clock reading advances 10ms, so each attempt takes 10ms
    pub fn new(store: RecordingStore) -> Self {
        Self::with_config(store, LockConfig::default(), 10)
    }

    pub fn with_config(store: RecordingStore, config: LockConfig, clock_step: i64) -> Self {
        let store = Arc::new(store);
        let tokens = Arc::new(SequentialTokenGenerator::default());
        let sleeper = Arc::new(RecordingTimeService::default());
        let events = Arc::new(RecordingEventLogger::default());

        let manager = LockManager::new(store.clone(), config)
            .with_token_generator(tokens.clone())
            .with_clock(Arc::new(SteppingClock::new(clock_step)))
            .with_time_service(sleeper.clone())
            .with_event_logger(events.clone());

        Self {
            manager,
            store,
            tokens,
            sleeper,
            events,
        }
    }
}

/// Wait for background work spawned on the runtime to settle
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Holds spawned futures so a test can run them when it chooses
#[derive(Default)]
pub struct CollectingSpawner {
    pub tasks: Mutex<Vec<futures::future::BoxFuture<'static, ()>>>,
}

impl CollectingSpawner {
    pub fn take(&self) -> Vec<futures::future::BoxFuture<'static, ()>> {
        std::mem::take(&mut *self.tasks.lock().unwrap())
    }
}

impl oxilock::domain::ports::task_spawner::TaskSpawner for CollectingSpawner {
    fn spawn(&self, future: futures::future::BoxFuture<'static, ()>) {
        self.tasks.lock().unwrap().push(future);
    }
}
