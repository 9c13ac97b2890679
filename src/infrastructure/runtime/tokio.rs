use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct TokioTaskSpawner;

impl TokioTaskSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl TaskSpawner for TokioTaskSpawner {
    fn spawn(&self, future: BoxFuture<'static, ()>) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(future);
            }
            Err(_) => {
                tracing::warn!("No Tokio runtime available, dropping background task");
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct TokioTimeService;

impl TokioTimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeService for TokioTimeService {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
