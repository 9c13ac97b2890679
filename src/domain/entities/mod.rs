pub mod lock_handle;

pub use lock_handle::*;
