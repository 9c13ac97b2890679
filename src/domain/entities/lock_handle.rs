use serde::{Deserialize, Serialize};

/// Proof of a successful acquisition.
///
/// `validity_millis` is computed once, at acquisition time, and is never
/// refreshed. The holder must finish its critical section inside that budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHandle {
    pub resource: String,
    pub token: String,
    pub validity_millis: i64,
}

impl LockHandle {
    pub fn new(resource: impl Into<String>, token: impl Into<String>, validity_millis: i64) -> Self {
        Self {
            resource: resource.into(),
            token: token.into(),
            validity_millis,
        }
    }

    /// True while the validity window computed at acquisition was positive
    pub fn is_valid(&self) -> bool {
        self.validity_millis > 0
    }
}
