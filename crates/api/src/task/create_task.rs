use crate::error::RelanceError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono_tz::Tz;
use relance_api_structs::create_task::*;
use relance_domain::{Assignees, Task, TaskFrequency, TaskSchedule, TimeOfDay};
use relance_infra::Context;

pub async fn create_task_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, RelanceError> {
    protect_admin_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = CreateTaskUseCase {
        name: body.name,
        period_start: body.period_start,
        period_end: body.period_end,
        frequency: body.frequency,
        time_cloture: body.time_cloture,
        time_out: body.time_out,
        timezone: body.timezone.unwrap_or(chrono_tz::UTC),
        rest_time: body.rest_time,
        rest_max: body.rest_max,
        assignees: body.assignees.map(|a| a.into()).unwrap_or_default(),
    };

    execute(usecase, &ctx)
        .await
        .map(|task| HttpResponse::Created().json(APIResponse::new(task)))
        .map_err(RelanceError::from)
}

#[derive(Debug)]
pub struct CreateTaskUseCase {
    pub name: String,
    pub period_start: i64,
    pub period_end: i64,
    pub frequency: Option<TaskFrequency>,
    pub time_cloture: Option<TimeOfDay>,
    pub time_out: Option<TimeOfDay>,
    pub timezone: Tz,
    pub rest_time: i64,
    pub rest_max: i64,
    pub assignees: Assignees,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidPeriod,
    InvalidRestConfiguration,
    StorageError,
}

impl From<UseCaseError> for RelanceError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidPeriod => {
                Self::BadClientData("The period end must not be before the period start".into())
            }
            UseCaseError::InvalidRestConfiguration => Self::BadClientData(
                "The rest duration and the maximum number of rests must not be negative".into(),
            ),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateTaskUseCase {
    type Response = Task;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateTask";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        if self.period_end < self.period_start {
            return Err(UseCaseError::InvalidPeriod);
        }
        if self.rest_time < 0 || self.rest_max < 0 {
            return Err(UseCaseError::InvalidRestConfiguration);
        }

        let schedule = TaskSchedule {
            period_start: self.period_start,
            period_end: self.period_end,
            frequency: self.frequency,
            time_cloture: self.time_cloture,
            time_out: self.time_out,
            timezone: self.timezone,
        };
        let mut task = Task::new(
            self.name.clone(),
            schedule,
            self.rest_time,
            self.rest_max,
            ctx.sys.get_timestamp_millis(),
        );
        task.assignees = self.assignees.clone();

        ctx.repos
            .tasks
            .insert(&task)
            .await
            .map(|_| task)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn usecase_factory() -> CreateTaskUseCase {
        CreateTaskUseCase {
            name: "weekly inventory".into(),
            period_start: 0,
            period_end: 1000 * 60 * 60 * 24 * 30,
            frequency: Some(TaskFrequency::Weekly),
            time_cloture: Some("17:00".parse().unwrap()),
            time_out: Some("18:00".parse().unwrap()),
            timezone: chrono_tz::UTC,
            rest_time: 1000 * 60 * 15,
            rest_max: 2,
            assignees: Default::default(),
        }
    }

    #[actix_web::main]
    #[test]
    async fn creates_task() {
        let ctx = Context::create_inmemory();

        let mut usecase = usecase_factory();
        let res = usecase.execute(&ctx).await;

        assert!(res.is_ok());
        let task = res.unwrap();
        assert!(task.status);
        assert!(task.has_timeout_configured());
        assert!(ctx.repos.tasks.find(&task.id).await.is_some());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_inverted_period() {
        let ctx = Context::create_inmemory();

        let mut usecase = usecase_factory();
        usecase.period_end = usecase.period_start - 1;

        assert!(usecase.execute(&ctx).await.is_err());
    }

    #[actix_web::main]
    #[test]
    async fn rejects_negative_rest_configuration() {
        let ctx = Context::create_inmemory();

        let mut usecase = usecase_factory();
        usecase.rest_max = -1;

        assert!(usecase.execute(&ctx).await.is_err());
    }
}
