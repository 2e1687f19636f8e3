mod broadcast;
mod send_due;

use actix_web::web;
use broadcast::broadcast_event_reminder_controller;
use send_due::trigger_reminders_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/jobs/send-reminders",
        web::post().to(trigger_reminders_controller),
    );
    cfg.route(
        "/admin/events/{event_id}/broadcast",
        web::post().to(broadcast_event_reminder_controller),
    );
}
