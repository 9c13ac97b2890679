/// Sink for the structured events the lock manager reports.
pub trait LockEventLogger: Send + Sync {
    /// Emitted once when every acquisition attempt for `resource` failed.
    fn acquisition_failed(&self, resource: &str, ttl_seconds: u64);
}
