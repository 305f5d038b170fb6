use crate::shared::entity::{Entity, ID};

/// Append-only audit record of a timeout notification that was actually
/// sent to a user. Never consulted by the scanner when making decisions.
#[derive(Debug, Clone)]
pub struct TimeoutNotification {
    pub id: ID,
    pub task_id: ID,
    pub user_id: ID,
    pub description: String,
    pub created: i64,
}

impl TimeoutNotification {
    pub fn new(task_id: ID, user_id: ID, description: String, now: i64) -> Self {
        Self {
            id: Default::default(),
            task_id,
            user_id,
            description,
            created: now,
        }
    }
}

impl Entity for TimeoutNotification {
    fn id(&self) -> &ID {
        &self.id
    }
}
