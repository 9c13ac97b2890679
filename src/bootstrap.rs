use crate::application::services::LockManager;
use crate::config::{Config, ConfigError};
use crate::domain::ports::lock_store::LockStore;
use crate::infrastructure::persistence::{Database, DatabaseLockStore};
use crate::infrastructure::redis::RedisLockStore;
use std::sync::Arc;

/// Connect the lock store named by `store_url`.
///
/// `redis://` and `rediss://` select Redis; `sqlite:` selects the SQL table
/// store, creating the table if needed.
pub async fn connect_store(store_url: &str) -> Result<Arc<dyn LockStore>, Box<dyn std::error::Error>> {
    if store_url.starts_with("redis://") || store_url.starts_with("rediss://") {
        let store = RedisLockStore::connect(store_url).await?;
        return Ok(Arc::new(store));
    }

    if store_url.starts_with("sqlite:") {
        let db = Database::connect(store_url).await?;
        let store = DatabaseLockStore::new(db);
        store.ensure_schema().await?;
        tracing::info!("Lock table ready");
        return Ok(Arc::new(store));
    }

    Err(ConfigError::UnsupportedStoreUrl(store_url.to_string()).into())
}

pub async fn build_lock_manager(config: &Config) -> Result<LockManager, Box<dyn std::error::Error>> {
    let store = connect_store(&config.store_url).await?;
    let lock_config = config.lock_config();

    tracing::info!(
        default_ttl_seconds = lock_config.default_ttl_seconds,
        retry_count = lock_config.retry_count,
        retry_delay_ms = lock_config.retry_delay_ms,
        "Lock manager initialized"
    );

    Ok(LockManager::new(store, lock_config))
}
