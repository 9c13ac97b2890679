pub mod clock;
pub mod lock_event_logger;
pub mod lock_store;
pub mod task_spawner;
pub mod time_service;
pub mod token_generator;
