use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    /// Every attempt ran out without a positive validity window.
    #[error("Failed to acquire lock for resource {resource}")]
    AcquisitionFailed { resource: String },
    #[error("Lock store communication error: {0}")]
    StoreCommunication(String),
    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),
    #[error("Invalid lock TTL: {0} seconds (must be positive)")]
    InvalidTtl(u64),
}

impl LockError {
    /// Contention outcome: the resource is held by someone else.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, LockError::AcquisitionFailed { .. })
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, LockError::StoreCommunication(_))
    }
}

impl From<sqlx::Error> for LockError {
    fn from(err: sqlx::Error) -> Self {
        LockError::StoreCommunication(format!("Database error: {}", err))
    }
}

impl From<redis::RedisError> for LockError {
    fn from(err: redis::RedisError) -> Self {
        LockError::StoreCommunication(format!("Redis error: {}", err))
    }
}

pub type LockResult<T> = Result<T, LockError>;
