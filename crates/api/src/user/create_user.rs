use crate::error::RelanceError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use relance_api_structs::create_user::*;
use relance_domain::User;
use relance_infra::Context;

pub async fn create_user_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, RelanceError> {
    protect_admin_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = CreateUserUseCase {
        name: body.name,
        device_token: body.device_token,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| HttpResponse::Created().json(APIResponse::new(user)))
        .map_err(RelanceError::from)
}

#[derive(Debug)]
pub struct CreateUserUseCase {
    pub name: String,
    pub device_token: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyName,
    StorageError,
}

impl From<UseCaseError> for RelanceError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyName => Self::BadClientData("The name must not be empty".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUserUseCase {
    type Response = User;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateUser";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        if self.name.trim().is_empty() {
            return Err(UseCaseError::EmptyName);
        }

        let mut user = User::new(self.name.clone());
        user.device_token = self.device_token.clone();

        ctx.repos
            .users
            .insert(&user)
            .await
            .map(|_| user)
            .map_err(|_| UseCaseError::StorageError)
    }
}
