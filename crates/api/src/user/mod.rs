mod create_user;
mod set_device_token;

use actix_web::web;
use create_user::create_user_controller;
use set_device_token::set_device_token_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/user", web::post().to(create_user_controller));
    cfg.route(
        "/user/{user_id}/device",
        web::put().to(set_device_token_controller),
    );
}
