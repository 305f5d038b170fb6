pub mod check_task_timeouts;
mod dispatcher;
mod ledger;

use actix_web::web;
use check_task_timeouts::run_timeout_scan_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/timeout/scan", web::post().to(run_timeout_scan_controller));
}
