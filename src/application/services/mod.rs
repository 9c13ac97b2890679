pub mod lock_guard;
pub mod lock_manager;

pub use lock_guard::LockGuard;
pub use lock_manager::LockManager;
