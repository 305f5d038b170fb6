use super::IDelayRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use relance_domain::{Delay, ID};

pub struct InMemoryDelayRepo {
    delays: std::sync::Mutex<Vec<Delay>>,
}

impl InMemoryDelayRepo {
    pub fn new() -> Self {
        Self {
            delays: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IDelayRepo for InMemoryDelayRepo {
    async fn insert(&self, delay: &Delay) -> anyhow::Result<()> {
        insert(delay, &self.delays);
        Ok(())
    }

    async fn save(&self, delay: &Delay) -> anyhow::Result<()> {
        save(delay, &self.delays);
        Ok(())
    }

    async fn find_by_task(&self, task_id: &ID) -> Vec<Delay> {
        find_by(&self.delays, |d| d.task_id == *task_id)
    }

    async fn find_by_task_and_user(&self, task_id: &ID, user_id: &ID) -> Option<Delay> {
        let mut delays = find_by(&self.delays, |d| {
            d.task_id == *task_id && d.user_id == *user_id
        });
        if delays.is_empty() {
            return None;
        }
        Some(delays.remove(0))
    }

    async fn delete_by_task(&self, task_id: &ID) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.delays, |d| d.task_id == *task_id))
    }
}
