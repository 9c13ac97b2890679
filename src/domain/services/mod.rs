pub mod validity;

pub use validity::*;
