mod create_task;
mod delete_task;
mod get_task;

use actix_web::web;
use create_task::create_task_controller;
use delete_task::delete_task_controller;
use get_task::get_task_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/task", web::post().to(create_task_controller));
    cfg.route("/task/{task_id}", web::get().to(get_task_controller));
    cfg.route("/task/{task_id}", web::delete().to(delete_task_controller));
}
