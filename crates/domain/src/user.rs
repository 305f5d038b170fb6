use crate::shared::entity::{Entity, ID};

/// The projection of a user the notification dispatcher needs: a display
/// name and, when the user registered a device, the push destination
/// token. Authentication and role management live outside this service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub device_token: Option<String>,
}

impl User {
    pub fn new(name: String) -> Self {
        Self {
            id: Default::default(),
            name,
            device_token: None,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
