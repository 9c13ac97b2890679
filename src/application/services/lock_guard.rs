use crate::domain::entities::LockHandle;
use crate::domain::errors::LockResult;
use crate::domain::ports::lock_store::LockStore;
use crate::domain::ports::task_spawner::TaskSpawner;
use std::sync::Arc;

/// Scoped ownership of an acquired lock.
///
/// Call `release` to give the lock back and observe the outcome. A guard that
/// is dropped unreleased (early return, cancelled task) hands the
/// compare-and-delete to the task spawner instead.
pub struct LockGuard {
    handle: LockHandle,
    store: Arc<dyn LockStore>,
    task_spawner: Arc<dyn TaskSpawner>,
    armed: bool,
}

impl LockGuard {
    pub(crate) fn new(
        handle: LockHandle,
        store: Arc<dyn LockStore>,
        task_spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            handle,
            store,
            task_spawner,
            armed: true,
        }
    }

    pub fn handle(&self) -> &LockHandle {
        &self.handle
    }

    pub fn resource(&self) -> &str {
        &self.handle.resource
    }

    pub fn validity_millis(&self) -> i64 {
        self.handle.validity_millis
    }

    /// Release the lock now. Returns false if it had already expired or
    /// been taken over.
    pub async fn release(mut self) -> LockResult<bool> {
        let released = self
            .store
            .compare_and_delete(&self.handle.resource, &self.handle.token)
            .await;
        // Disarm only after the store call completes; a cancelled release
        // still falls back to the background path.
        self.armed = false;
        released
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        tracing::debug!(resource = %self.handle.resource, "Lock guard dropped, releasing in background");
        spawn_release(
            self.task_spawner.as_ref(),
            self.store.clone(),
            self.handle.resource.clone(),
            self.handle.token.clone(),
        );
    }
}

/// Covers the window in which a set may have reached the store but its
/// outcome has not been seen yet. Dropped while armed, it releases `token`
/// in the background.
pub(crate) struct PendingRelease {
    resource: String,
    token: String,
    store: Arc<dyn LockStore>,
    task_spawner: Arc<dyn TaskSpawner>,
    armed: bool,
}

impl PendingRelease {
    pub(crate) fn new(
        resource: &str,
        token: &str,
        store: Arc<dyn LockStore>,
        task_spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            resource: resource.to_string(),
            token: token.to_string(),
            store,
            task_spawner,
            armed: false,
        }
    }

    pub(crate) fn arm(&mut self) {
        self.armed = true;
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingRelease {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        tracing::debug!(resource = %self.resource, "Acquire cancelled mid-attempt, releasing in background");
        spawn_release(
            self.task_spawner.as_ref(),
            self.store.clone(),
            std::mem::take(&mut self.resource),
            std::mem::take(&mut self.token),
        );
    }
}

fn spawn_release(
    task_spawner: &dyn TaskSpawner,
    store: Arc<dyn LockStore>,
    resource: String,
    token: String,
) {
    task_spawner.spawn(Box::pin(async move {
        match store.compare_and_delete(&resource, &token).await {
            Ok(true) => {
                tracing::debug!(resource = %resource, "Background lock release completed");
            }
            Ok(false) => {
                tracing::debug!(
                    resource = %resource,
                    "Lock already expired or taken over before background release"
                );
            }
            Err(e) => {
                tracing::warn!(resource = %resource, "Background lock release failed: {}", e);
            }
        }
    }));
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("handle", &self.handle)
            .field("armed", &self.armed)
            .finish()
    }
}
