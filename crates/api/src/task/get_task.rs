use crate::error::RelanceError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use relance_api_structs::get_task::*;
use relance_domain::{Task, ID};
use relance_infra::Context;

pub async fn get_task_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, RelanceError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = GetTaskUseCase {
        task_id: path_params.task_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|task| HttpResponse::Ok().json(APIResponse::new(task)))
        .map_err(RelanceError::from)
}

#[derive(Debug)]
pub struct GetTaskUseCase {
    pub task_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for RelanceError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(task_id) => {
                Self::NotFound(format!("The task with id: {}, was not found.", task_id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetTaskUseCase {
    type Response = Task;

    type Error = UseCaseError;

    const NAME: &'static str = "GetTask";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .tasks
            .find(&self.task_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.task_id.clone()))
    }
}
