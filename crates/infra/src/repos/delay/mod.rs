mod inmemory;
mod postgres;

pub use inmemory::InMemoryDelayRepo;
pub use postgres::PostgresDelayRepo;
use crate::repos::shared::repo::DeleteResult;
use relance_domain::{Delay, ID};

#[async_trait::async_trait]
pub trait IDelayRepo: Send + Sync {
    async fn insert(&self, delay: &Delay) -> anyhow::Result<()>;
    async fn save(&self, delay: &Delay) -> anyhow::Result<()>;
    async fn find_by_task(&self, task_id: &ID) -> Vec<Delay>;
    async fn find_by_task_and_user(&self, task_id: &ID, user_id: &ID) -> Option<Delay>;
    async fn delete_by_task(&self, task_id: &ID) -> anyhow::Result<DeleteResult>;
}
