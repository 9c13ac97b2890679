use crate::domain::errors::LockResult;
use crate::domain::ports::lock_store::LockStore;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;

/// Deletes KEYS[1] only while it still holds ARGV[1]. Runs atomically on the server.
pub const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

/// Lock store over a single Redis instance.
///
/// Acquire is `SET key value NX EX ttl`; release is `RELEASE_SCRIPT`.
#[derive(Clone)]
pub struct RedisLockStore {
    connection: ConnectionManager,
    release_script: Script,
}

impl RedisLockStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            release_script: Script::new(RELEASE_SCRIPT),
        }
    }

    pub async fn connect(redis_url: &str) -> LockResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        tracing::info!("Lock store connected to Redis");
        Ok(Self::new(connection))
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool> {
        let mut connection = self.connection.clone();

        // Nil reply when the key already exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut connection)
            .await?;

        Ok(reply.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool> {
        let mut connection = self.connection.clone();

        let deleted: i64 = self
            .release_script
            .key(key)
            .arg(expected)
            .invoke_async(&mut connection)
            .await?;

        Ok(deleted > 0)
    }
}
