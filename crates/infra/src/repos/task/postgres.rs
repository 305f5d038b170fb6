use super::ITaskRepo;
use relance_domain::{Task, TaskFrequency, TaskSchedule, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresTaskRepo {
    pool: PgPool,
}

impl PostgresTaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn frequency_to_str(frequency: TaskFrequency) -> &'static str {
    match frequency {
        TaskFrequency::Daily => "daily",
        TaskFrequency::Weekly => "weekly",
        TaskFrequency::Monthly => "monthly",
        TaskFrequency::Yearly => "yearly",
    }
}

fn frequency_from_str(frequency: &str) -> Option<TaskFrequency> {
    match frequency {
        "daily" => Some(TaskFrequency::Daily),
        "weekly" => Some(TaskFrequency::Weekly),
        "monthly" => Some(TaskFrequency::Monthly),
        "yearly" => Some(TaskFrequency::Yearly),
        _ => None,
    }
}

#[derive(Debug, FromRow)]
struct TaskRaw {
    task_uid: Uuid,
    name: String,
    status: bool,
    period_start: i64,
    period_end: i64,
    frequency: Option<String>,
    time_cloture: Option<String>,
    time_out: Option<String>,
    timezone: String,
    rest_time: i64,
    rest_max: i64,
    assignees: serde_json::Value,
    timeout_notified_at: Option<i64>,
    notified_deadline: Option<i64>,
    created: i64,
    updated: i64,
}

impl Into<Task> for TaskRaw {
    fn into(self) -> Task {
        let assignees: Vec<Uuid> = serde_json::from_value(self.assignees).unwrap_or_default();
        Task {
            id: self.task_uid.into(),
            name: self.name,
            status: self.status,
            schedule: TaskSchedule {
                period_start: self.period_start,
                period_end: self.period_end,
                frequency: self.frequency.as_deref().and_then(frequency_from_str),
                time_cloture: self.time_cloture.and_then(|t| t.parse().ok()),
                time_out: self.time_out.and_then(|t| t.parse().ok()),
                timezone: self.timezone.parse().unwrap_or(chrono_tz::UTC),
            },
            rest_time: self.rest_time,
            rest_max: self.rest_max,
            assignees: assignees
                .into_iter()
                .map(ID::from)
                .collect::<Vec<_>>()
                .into(),
            timeout_notified_at: self.timeout_notified_at,
            notified_deadline: self.notified_deadline,
            created: self.created,
            updated: self.updated,
        }
    }
}

fn assignee_uids(task: &Task) -> Vec<Uuid> {
    task.assignees
        .ids()
        .iter()
        .map(|id| *id.inner_ref())
        .collect()
}

#[async_trait::async_trait]
impl ITaskRepo for PostgresTaskRepo {
    async fn insert(&self, task: &Task) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks
            (task_uid, name, status, period_start, period_end, frequency, time_cloture,
             time_out, timezone, rest_time, rest_max, assignees, timeout_notified_at,
             notified_deadline, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(task.id.inner_ref())
        .bind(&task.name)
        .bind(task.status)
        .bind(task.schedule.period_start)
        .bind(task.schedule.period_end)
        .bind(task.schedule.frequency.map(frequency_to_str))
        .bind(task.schedule.time_cloture.map(|t| t.to_string()))
        .bind(task.schedule.time_out.map(|t| t.to_string()))
        .bind(task.schedule.timezone.name())
        .bind(task.rest_time)
        .bind(task.rest_max)
        .bind(Json(assignee_uids(task)))
        .bind(task.timeout_notified_at)
        .bind(task.notified_deadline)
        .bind(task.created)
        .bind(task.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, task: &Task) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET name = $2,
                status = $3,
                period_start = $4,
                period_end = $5,
                frequency = $6,
                time_cloture = $7,
                time_out = $8,
                timezone = $9,
                rest_time = $10,
                rest_max = $11,
                assignees = $12,
                timeout_notified_at = $13,
                notified_deadline = $14,
                updated = $15
            WHERE task_uid = $1
            "#,
        )
        .bind(task.id.inner_ref())
        .bind(&task.name)
        .bind(task.status)
        .bind(task.schedule.period_start)
        .bind(task.schedule.period_end)
        .bind(task.schedule.frequency.map(frequency_to_str))
        .bind(task.schedule.time_cloture.map(|t| t.to_string()))
        .bind(task.schedule.time_out.map(|t| t.to_string()))
        .bind(task.schedule.timezone.name())
        .bind(task.rest_time)
        .bind(task.rest_max)
        .bind(Json(assignee_uids(task)))
        .bind(task.timeout_notified_at)
        .bind(task.notified_deadline)
        .bind(task.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, task_id: &ID) -> Option<Task> {
        sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks
            WHERE task_uid = $1
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to find task with id: {}. DB error: {:?}", task_id, e);
            None
        })
        .map(|task| task.into())
    }

    async fn delete(&self, task_id: &ID) -> Option<Task> {
        sqlx::query_as::<_, TaskRaw>(
            r#"
            DELETE FROM tasks
            WHERE task_uid = $1
            RETURNING *
            "#,
        )
        .bind(task_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!(
                "Unable to delete task with id: {}. DB error: {:?}",
                task_id, e
            );
            None
        })
        .map(|task| task.into())
    }

    async fn find_active_with_timeout(&self) -> anyhow::Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, TaskRaw>(
            r#"
            SELECT * FROM tasks
            WHERE status = TRUE
            AND time_cloture IS NOT NULL
            AND time_out IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks.into_iter().map(|task| task.into()).collect())
    }
}
