use crate::domain::errors::LockResult;

pub trait TokenGenerator: Send + Sync {
    /// Produce a practically unique, printable ownership token.
    ///
    /// Must fail with `RandomnessUnavailable` rather than fall back to a
    /// weaker entropy source.
    fn generate(&self) -> LockResult<String>;
}
