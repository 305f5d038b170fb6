use super::{INotifier, PushMessage};
use std::sync::Mutex;

/// A delivery recorded by the [`InMemoryNotifier`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentPush {
    pub device_token: String,
    pub message: PushMessage,
}

/// Records deliveries instead of performing them. Used in tests; tokens
/// registered with [`InMemoryNotifier::fail_for`] simulate a transport
/// rejection for that recipient only.
pub struct InMemoryNotifier {
    sent: Mutex<Vec<SentPush>>,
    failing_tokens: Mutex<Vec<String>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing_tokens: Mutex::new(vec![]),
        }
    }

    pub fn fail_for(&self, device_token: &str) {
        self.failing_tokens
            .lock()
            .unwrap()
            .push(device_token.to_string());
    }

    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send(&self, device_token: &str, message: &PushMessage) -> anyhow::Result<String> {
        if self
            .failing_tokens
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == device_token)
        {
            return Err(anyhow::Error::msg("Simulated delivery failure"));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentPush {
            device_token: device_token.to_string(),
            message: message.clone(),
        });
        Ok(format!("message-{}", sent.len()))
    }
}
