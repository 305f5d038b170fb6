use super::ITaskRepo;
use crate::repos::shared::inmemory_repo::*;
use relance_domain::{Task, ID};

pub struct InMemoryTaskRepo {
    tasks: std::sync::Mutex<Vec<Task>>,
}

impl InMemoryTaskRepo {
    pub fn new() -> Self {
        Self {
            tasks: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for InMemoryTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        insert(task, &self.tasks);
        Ok(())
    }

    async fn save(&self, task: &Task) -> anyhow::Result<()> {
        save(task, &self.tasks);
        Ok(())
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        find(task_id, &self.tasks)
    }

    async fn delete(&self, task_id: &ID) -> Option<Task> {
        delete(task_id, &self.tasks)
    }

    async fn find_active_with_timeout(&self) -> anyhow::Result<Vec<Task>> {
        Ok(find_by(&self.tasks, |t| {
            t.status && t.has_timeout_configured()
        }))
    }
}
