use crate::error::RelanceError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use relance_api_structs::set_device_token::*;
use relance_domain::{User, ID};
use relance_infra::Context;

pub async fn set_device_token_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, RelanceError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SetDeviceTokenUseCase {
        user_id: path_params.user_id.clone(),
        device_token: body.0.device_token,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| HttpResponse::Ok().json(APIResponse::new(user)))
        .map_err(RelanceError::from)
}

/// Registers (or clears) the push destination of a user
#[derive(Debug)]
pub struct SetDeviceTokenUseCase {
    pub user_id: ID,
    pub device_token: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for RelanceError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(user_id) => {
                Self::NotFound(format!("The user with id: {}, was not found.", user_id))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetDeviceTokenUseCase {
    type Response = User;

    type Error = UseCaseError;

    const NAME: &'static str = "SetDeviceToken";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let mut user = ctx
            .repos
            .users
            .find(&self.user_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.user_id.clone()))?;

        user.device_token = self.device_token.clone();

        ctx.repos
            .users
            .save(&user)
            .await
            .map(|_| user)
            .map_err(|_| UseCaseError::StorageError)
    }
}
