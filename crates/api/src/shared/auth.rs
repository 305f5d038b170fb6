use crate::error::RelanceError;
use actix_web::HttpRequest;
use relance_infra::Context;

const API_KEY_HEADER: &str = "x-api-key";

fn parse_api_key(http_req: &HttpRequest) -> Option<&str> {
    http_req.headers().get(API_KEY_HEADER)?.to_str().ok()
}

/// Protects administrative routes with the api key from the configuration
pub fn protect_admin_route(http_req: &HttpRequest, ctx: &Context) -> Result<(), RelanceError> {
    match parse_api_key(http_req) {
        Some(key) if key == ctx.config.admin_api_key => Ok(()),
        Some(_) => Err(RelanceError::Unauthorized(
            "Invalid api key provided".into(),
        )),
        None => Err(RelanceError::Unauthorized(format!(
            "Missing api key header: {}",
            API_KEY_HEADER
        ))),
    }
}
