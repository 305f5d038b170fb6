use super::ITimeoutNotificationRepo;
use relance_domain::{TimeoutNotification, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresTimeoutNotificationRepo {
    pool: PgPool,
}

impl PostgresTimeoutNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TimeoutNotificationRaw {
    notification_uid: Uuid,
    task_uid: Uuid,
    user_uid: Uuid,
    description: String,
    created: i64,
}

impl Into<TimeoutNotification> for TimeoutNotificationRaw {
    fn into(self) -> TimeoutNotification {
        TimeoutNotification {
            id: self.notification_uid.into(),
            task_id: self.task_uid.into(),
            user_id: self.user_uid.into(),
            description: self.description,
            created: self.created,
        }
    }
}

#[async_trait::async_trait]
impl ITimeoutNotificationRepo for PostgresTimeoutNotificationRepo {
    async fn insert(&self, notification: &TimeoutNotification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO timeout_notifications
            (notification_uid, task_uid, user_uid, description, created)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.task_id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(&notification.description)
        .bind(notification.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_task(&self, task_id: &ID) -> Vec<TimeoutNotification> {
        sqlx::query_as::<_, TimeoutNotificationRaw>(
            r#"
            SELECT * FROM timeout_notifications
            WHERE task_uid = $1
            ORDER BY created ASC
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find timeout notifications for task with id: {}. DB error: {:?}",
                task_id, e
            );
            vec![]
        })
        .into_iter()
        .map(|notification| notification.into())
        .collect()
    }
}
