use relance_utils::create_random_secret;
use tracing::{info, warn};

const ADMIN_API_KEY_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Secret key that protects the administrative routes
    pub admin_api_key: String,
    /// Server key for the push-notification transport. When absent, the
    /// notifier is disabled and every dispatch becomes a logged no-op.
    pub fcm_server_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let admin_api_key = match std::env::var("ADMIN_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find ADMIN_API_KEY environment variable. Going to create one.");
                let key = create_random_secret(ADMIN_API_KEY_LEN);
                info!("Admin api key was generated and set to: {}", key);
                key
            }
        };

        let fcm_server_key = match std::env::var("FCM_SERVER_KEY") {
            Ok(key) => Some(key),
            Err(_) => {
                warn!("Did not find FCM_SERVER_KEY environment variable. Timeout notifications will not be delivered.");
                None
            }
        };

        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        Self {
            port,
            admin_api_key,
            fcm_server_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
