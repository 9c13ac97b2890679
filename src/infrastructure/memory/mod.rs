use crate::domain::errors::{LockError, LockResult};
use crate::domain::ports::lock_store::LockStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local lock store.
///
/// Both primitives run under one mutex, which makes them atomic for every
/// `LockManager` sharing this instance. Expired entries are treated as absent
/// and are pruned whenever a new key is set.
#[derive(Clone, Default)]
pub struct InMemoryLockStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current live value of `key`, if any
    pub fn get(&self, key: &str) -> LockResult<Option<String>> {
        let entries = self.lock_entries()?;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    /// Force `key = value` regardless of current state. Used to simulate a
    /// takeover by another holder.
    pub fn force_set(&self, key: &str, value: &str, ttl_seconds: u64) -> LockResult<()> {
        let expires_at = expiry(Instant::now(), ttl_seconds)?;
        let mut entries = self.lock_entries()?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    /// Number of live entries
    pub fn len(&self) -> LockResult<usize> {
        let now = Instant::now();
        let entries = self.lock_entries()?;
        Ok(entries.values().filter(|e| e.expires_at > now).count())
    }

    pub fn is_empty(&self) -> LockResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop entries whose TTL has passed. Returns the number removed.
    pub fn purge_expired(&self) -> LockResult<usize> {
        let mut entries = self.lock_entries()?;
        Ok(prune(&mut entries, Instant::now()))
    }

    fn lock_entries(&self) -> LockResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| LockError::StoreCommunication("In-memory lock store poisoned".to_string()))
    }
}

fn expiry(now: Instant, ttl_seconds: u64) -> LockResult<Instant> {
    now.checked_add(Duration::from_secs(ttl_seconds))
        .ok_or(LockError::InvalidTtl(ttl_seconds))
}

fn prune(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool> {
        let now = Instant::now();
        let expires_at = expiry(now, ttl_seconds)?;
        let mut entries = self.lock_entries()?;

        if let Some(existing) = entries.get(key) {
            if existing.expires_at > now {
                return Ok(false);
            }
        }

        prune(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool> {
        let mut entries = self.lock_entries()?;
        let now = Instant::now();

        let matches = entries
            .get(key)
            .map(|entry| entry.expires_at > now && entry.value == expected)
            .unwrap_or(false);

        if matches {
            entries.remove(key);
        }
        Ok(matches)
    }
}
