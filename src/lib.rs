//! Single-instance Redlock over a shared key-value store.
//!
//! ```rust,no_run
//! use oxilock::{bootstrap, Config, LockError};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let locks = bootstrap::build_lock_manager(&config).await?;
//!
//! let total = locks
//!     .with_lock("billing:nightly", Some(30), |handle| async move {
//!         tracing::info!(validity_millis = handle.validity_millis, "running nightly billing");
//!         Ok::<_, LockError>(42)
//!     })
//!     .await?;
//! # let _ = total;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::services::{LockGuard, LockManager};
pub use config::{AcquireOptions, Config, ConfigError, LockConfig};
pub use domain::entities::LockHandle;
pub use domain::errors::{LockError, LockResult};
pub use infrastructure::memory::InMemoryLockStore;
pub use infrastructure::persistence::{Database, DatabaseLockStore};
pub use infrastructure::redis::RedisLockStore;
