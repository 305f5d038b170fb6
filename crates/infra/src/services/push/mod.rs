mod fcm;
mod inmemory;

pub use fcm::FcmNotifier;
pub use inmemory::{InMemoryNotifier, SentPush};
use std::collections::HashMap;
use tracing::warn;

/// A push notification as handed to the transport. The `data` payload is
/// opaque pass-through metadata for the client app.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// Boundary to the push-notification transport. One delivery attempt per
/// call; the provider message id is returned on success.
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Whether a transport is configured at all. Dispatching against a
    /// disabled notifier is a logged no-op, never an error.
    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, device_token: &str, message: &PushMessage) -> anyhow::Result<String>;
}

/// Stand-in used when no transport credentials are configured
pub struct DisabledNotifier;

#[async_trait::async_trait]
impl INotifier for DisabledNotifier {
    fn enabled(&self) -> bool {
        false
    }

    async fn send(&self, _device_token: &str, _message: &PushMessage) -> anyhow::Result<String> {
        warn!("Push notification transport is not configured, dropping message");
        Err(anyhow::Error::msg("Push notification transport disabled"))
    }
}
