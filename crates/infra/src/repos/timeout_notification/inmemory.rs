use super::ITimeoutNotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use relance_domain::{TimeoutNotification, ID};

pub struct InMemoryTimeoutNotificationRepo {
    notifications: std::sync::Mutex<Vec<TimeoutNotification>>,
}

impl InMemoryTimeoutNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ITimeoutNotificationRepo for InMemoryTimeoutNotificationRepo {
    async fn insert(&self, notification: &TimeoutNotification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn find_by_task(&self, task_id: &ID) -> Vec<TimeoutNotification> {
        find_by(&self.notifications, |n| n.task_id == *task_id)
    }
}
