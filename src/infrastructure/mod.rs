pub mod memory;
pub mod observability;
pub mod persistence;
pub mod redis;
pub mod runtime;
