use relance_domain::{User, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub id: ID,
    pub name: String,
    pub device_token: Option<String>,
}

impl UserDTO {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            device_token: user.device_token.clone(),
        }
    }
}
