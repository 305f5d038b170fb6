use super::IDelayRepo;
use crate::repos::shared::repo::DeleteResult;
use relance_domain::{Delay, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresDelayRepo {
    pool: PgPool,
}

impl PostgresDelayRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DelayRaw {
    delay_uid: Uuid,
    task_uid: Uuid,
    user_uid: Uuid,
    rest_time: i64,
    rest_max: i64,
    next_alarm_at: Option<i64>,
    alarm_count: i64,
    last_alarm_at: Option<i64>,
}

impl Into<Delay> for DelayRaw {
    fn into(self) -> Delay {
        Delay {
            id: self.delay_uid.into(),
            task_id: self.task_uid.into(),
            user_id: self.user_uid.into(),
            rest_time: self.rest_time,
            rest_max: self.rest_max,
            next_alarm_at: self.next_alarm_at,
            alarm_count: self.alarm_count,
            last_alarm_at: self.last_alarm_at,
        }
    }
}

#[async_trait::async_trait]
impl IDelayRepo for PostgresDelayRepo {
    async fn insert(&self, delay: &Delay) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO task_delays
            (delay_uid, task_uid, user_uid, rest_time, rest_max, next_alarm_at,
             alarm_count, last_alarm_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(delay.id.inner_ref())
        .bind(delay.task_id.inner_ref())
        .bind(delay.user_id.inner_ref())
        .bind(delay.rest_time)
        .bind(delay.rest_max)
        .bind(delay.next_alarm_at)
        .bind(delay.alarm_count)
        .bind(delay.last_alarm_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, delay: &Delay) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE task_delays
            SET rest_time = $2,
                rest_max = $3,
                next_alarm_at = $4,
                alarm_count = $5,
                last_alarm_at = $6
            WHERE delay_uid = $1
            "#,
        )
        .bind(delay.id.inner_ref())
        .bind(delay.rest_time)
        .bind(delay.rest_max)
        .bind(delay.next_alarm_at)
        .bind(delay.alarm_count)
        .bind(delay.last_alarm_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_task(&self, task_id: &ID) -> Vec<Delay> {
        sqlx::query_as::<_, DelayRaw>(
            r#"
            SELECT * FROM task_delays
            WHERE task_uid = $1
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find delays for task with id: {}. DB error: {:?}",
                task_id, e
            );
            vec![]
        })
        .into_iter()
        .map(|delay| delay.into())
        .collect()
    }

    async fn find_by_task_and_user(&self, task_id: &ID, user_id: &ID) -> Option<Delay> {
        sqlx::query_as::<_, DelayRaw>(
            r#"
            SELECT * FROM task_delays
            WHERE task_uid = $1 AND user_uid = $2
            "#,
        )
        .bind(task_id.inner_ref())
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to find delay for task: {} and user: {}. DB error: {:?}",
                task_id, user_id, e
            );
            None
        })
        .map(|delay| delay.into())
    }

    async fn delete_by_task(&self, task_id: &ID) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM task_delays
            WHERE task_uid = $1
            "#,
        )
        .bind(task_id.inner_ref())
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
