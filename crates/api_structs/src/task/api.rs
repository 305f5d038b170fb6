use crate::dtos::TaskDTO;
use chrono_tz::Tz;
use relance_domain::{Assignees, Task, TaskFrequency, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task: TaskDTO,
}

impl TaskResponse {
    pub fn new(task: Task) -> Self {
        Self {
            task: TaskDTO::new(&task),
        }
    }
}

/// Assignees are accepted either as a proper list of ids or as a legacy
/// free-form text from which id-looking tokens are extracted
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AssigneesRequest {
    Ids(Vec<ID>),
    Text(String),
}

impl From<AssigneesRequest> for Assignees {
    fn from(req: AssigneesRequest) -> Self {
        match req {
            AssigneesRequest::Ids(ids) => Assignees::new(ids),
            AssigneesRequest::Text(text) => Assignees::parse(&text),
        }
    }
}

pub mod create_task {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub period_start: i64,
        pub period_end: i64,
        #[serde(default)]
        pub frequency: Option<TaskFrequency>,
        #[serde(default)]
        pub time_cloture: Option<TimeOfDay>,
        #[serde(default)]
        pub time_out: Option<TimeOfDay>,
        #[serde(default)]
        pub timezone: Option<Tz>,
        pub rest_time: i64,
        pub rest_max: i64,
        #[serde(default)]
        pub assignees: Option<AssigneesRequest>,
    }

    pub type APIResponse = TaskResponse;
}

pub mod get_task {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub task_id: ID,
    }

    pub type APIResponse = TaskResponse;
}

pub mod delete_task {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub task_id: ID,
    }

    pub type APIResponse = TaskResponse;
}
