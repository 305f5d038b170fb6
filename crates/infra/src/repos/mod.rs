mod delay;
mod shared;
mod task;
mod timeout_notification;
mod user;

use delay::{InMemoryDelayRepo, PostgresDelayRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use task::{InMemoryTaskRepo, PostgresTaskRepo};
use timeout_notification::{InMemoryTimeoutNotificationRepo, PostgresTimeoutNotificationRepo};
use tracing::info;
use user::{InMemoryUserRepo, PostgresUserRepo};

pub use delay::IDelayRepo;
pub use shared::repo::DeleteResult;
pub use task::ITaskRepo;
pub use timeout_notification::ITimeoutNotificationRepo;
pub use user::IUserRepo;

#[derive(Clone)]
pub struct Repos {
    pub tasks: Arc<dyn ITaskRepo>,
    pub delays: Arc<dyn IDelayRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub timeout_notifications: Arc<dyn ITimeoutNotificationRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            tasks: Arc::new(PostgresTaskRepo::new(pool.clone())),
            delays: Arc::new(PostgresDelayRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            timeout_notifications: Arc::new(PostgresTimeoutNotificationRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            tasks: Arc::new(InMemoryTaskRepo::new()),
            delays: Arc::new(InMemoryDelayRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            timeout_notifications: Arc::new(InMemoryTimeoutNotificationRepo::new()),
        }
    }
}
