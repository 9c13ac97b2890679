pub mod system;
pub mod tokio;
