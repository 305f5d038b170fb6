use super::{INotifier, PushMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Push delivery through Firebase Cloud Messaging
pub struct FcmNotifier {
    client: Client,
    server_key: String,
}

impl FcmNotifier {
    pub fn new(server_key: String) -> Self {
        Self {
            client: Client::new(),
            server_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct FcmSendRequest<'a> {
    to: &'a str,
    notification: FcmNotificationPart<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotificationPart<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmSendResponse {
    success: i64,
    failure: i64,
    results: Vec<FcmSendResult>,
}

#[derive(Debug, Deserialize)]
struct FcmSendResult {
    message_id: Option<String>,
    error: Option<String>,
}

#[async_trait::async_trait]
impl INotifier for FcmNotifier {
    async fn send(&self, device_token: &str, message: &PushMessage) -> anyhow::Result<String> {
        let request = FcmSendRequest {
            to: device_token,
            notification: FcmNotificationPart {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        let res = self
            .client
            .post(FCM_SEND_URL)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<FcmSendResponse>()
            .await?;

        if res.failure > 0 || res.success == 0 {
            let provider_error = res
                .results
                .into_iter()
                .find_map(|r| r.error)
                .unwrap_or_else(|| "Unknown".to_string());
            error!("FCM rejected message delivery: {}", provider_error);
            return Err(anyhow::Error::msg(format!(
                "FCM rejected message delivery: {}",
                provider_error
            )));
        }

        res.results
            .into_iter()
            .find_map(|r| r.message_id)
            .ok_or_else(|| anyhow::Error::msg("FCM response missing message id"))
    }
}
