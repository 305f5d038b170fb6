mod inmemory;
mod postgres;

pub use inmemory::InMemoryTimeoutNotificationRepo;
pub use postgres::PostgresTimeoutNotificationRepo;
use relance_domain::{TimeoutNotification, ID};

/// Append-only audit sink for sent timeout notifications
#[async_trait::async_trait]
pub trait ITimeoutNotificationRepo: Send + Sync {
    async fn insert(&self, notification: &TimeoutNotification) -> anyhow::Result<()>;
    async fn find_by_task(&self, task_id: &ID) -> Vec<TimeoutNotification>;
}
