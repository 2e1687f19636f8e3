mod close_poll;

use actix_web::web;
use close_poll::close_poll_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/admin/polls/{poll_id}/close",
        web::post().to(close_poll_controller),
    );
}
