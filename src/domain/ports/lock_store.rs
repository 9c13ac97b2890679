use crate::domain::errors::LockResult;
use async_trait::async_trait;

/// The two atomic primitives the lock protocol needs from a key-value backend.
///
/// Both operations must be a single atomic step at the store. A separate
/// read followed by a write is not an acceptable implementation.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Create `key = value` with the given expiry, only if `key` is absent.
    /// Returns true if the key was set.
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool>;

    /// Delete `key` only if its current value equals `expected`.
    /// Returns true if the key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool>;
}
