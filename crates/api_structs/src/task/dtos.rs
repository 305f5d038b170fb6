use relance_domain::{Task, TaskFrequency, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDTO {
    pub id: ID,
    pub name: String,
    pub status: bool,
    pub period_start: i64,
    pub period_end: i64,
    pub frequency: Option<TaskFrequency>,
    pub time_cloture: Option<TimeOfDay>,
    pub time_out: Option<TimeOfDay>,
    pub timezone: String,
    pub rest_time: i64,
    pub rest_max: i64,
    pub assignees: Vec<ID>,
    pub timeout_notified_at: Option<i64>,
}

impl TaskDTO {
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            status: task.status,
            period_start: task.schedule.period_start,
            period_end: task.schedule.period_end,
            frequency: task.schedule.frequency,
            time_cloture: task.schedule.time_cloture,
            time_out: task.schedule.time_out,
            timezone: task.schedule.timezone.name().to_string(),
            rest_time: task.rest_time,
            rest_max: task.rest_max,
            assignees: task.assignees.ids().to_vec(),
            timeout_notified_at: task.timeout_notified_at,
        }
    }
}
