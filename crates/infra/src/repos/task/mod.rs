mod inmemory;
mod postgres;

pub use inmemory::InMemoryTaskRepo;
pub use postgres::PostgresTaskRepo;
use relance_domain::{Task, ID};

#[async_trait::async_trait]
pub trait ITaskRepo: Send + Sync {
    async fn insert(&self, task: &Task) -> anyhow::Result<()>;
    async fn save(&self, task: &Task) -> anyhow::Result<()>;
    async fn find(&self, task_id: &ID) -> Option<Task>;
    async fn delete(&self, task_id: &ID) -> Option<Task>;
    /// All tasks eligible for the timeout sweep: active and with both a
    /// closure and a timeout time of day configured
    async fn find_active_with_timeout(&self) -> anyhow::Result<Vec<Task>>;
}
