use crate::error::ClubError;
use crate::shared::auth::protect_admin_route;
use crate::shared::dispatch::{send_to_recipients, DispatchSummary, MessageKind};
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::prelude::*;
use clubnight_api_structs::trigger_reminders::APIResponse;
use clubnight_domain::due_offsets;
use clubnight_infra::ClubContext;
use tracing::info;

/// Entry point for the external scheduler. The trigger carries no payload
/// and gets a 200 with a summary no matter what happened inside; problems
/// are logged, not thrown back at the cron.
pub async fn trigger_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<ClubContext>,
) -> Result<HttpResponse, ClubError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SendDueRemindersUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|summaries| {
            HttpResponse::Ok().json(APIResponse::new(
                summaries.into_iter().map(|s| s.into_dto()).collect(),
            ))
        })
        .map_err(|_| ClubError::InternalError)
}

/// One sweep: recompute every upcoming event's instant in the club zone,
/// pick the offsets currently inside their window, and dispatch to whoever
/// has not been covered yet.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = Vec<DispatchSummary>;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &ClubContext) -> Result<Self::Response, Self::Error> {
        let now = Utc.timestamp_millis(ctx.sys.get_timestamp_millis());
        let events = ctx.repos.events.find_upcoming().await;

        let mut summaries = Vec::new();
        for event in events {
            let instant = event.instant(ctx.config.club_timezone);
            let due = due_offsets(
                instant,
                now,
                &ctx.config.reminder_offsets,
                ctx.config.reminder_window,
            );
            for offset in due {
                let recipients = ctx.repos.users.find_reminder_eligible().await;
                let summary = send_to_recipients(
                    ctx,
                    &event,
                    &recipients,
                    &offset.label,
                    MessageKind::Reminder,
                )
                .await;
                info!(
                    "Reminder sweep for event {} offset {}: {} sent, {} skipped, {} failed",
                    event.id, offset.label, summary.sent, summary.skipped, summary.failed
                );
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{member, test_context, upcoming_event};
    use chrono::Duration;
    use clubnight_domain::EventStatus;
    use clubnight_infra::{RecordingSmsSender, StaticSys};
    use std::sync::Arc;

    /// 2024-06-07 18:00 America/Chicago == 23:00 UTC
    fn event_instant() -> DateTime<Utc> {
        Utc.ymd(2024, 6, 7).and_hms(23, 0, 0)
    }

    fn at(instant: DateTime<Utc>) -> Arc<StaticSys> {
        Arc::new(StaticSys(instant.timestamp_millis()))
    }

    #[actix_web::test]
    async fn sends_at_the_24h_mark_to_eligible_members_only() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();
        ctx.sys = at(event_instant() - Duration::hours(24) + Duration::minutes(3));

        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;
        let mut opted_out = member(&ctx, "bob", "+13125550002").await;
        opted_out.sms_opted_out_at = Some(1);
        ctx.repos.users.save(&opted_out).await.unwrap();

        let summaries = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].reminder_type, "24h");
        assert_eq!(summaries[0].sent, 1);
        assert_eq!(sms.sent_to(), vec!["+13125550001".to_string()]);
    }

    #[actix_web::test]
    async fn outside_any_window_nothing_is_due() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();
        ctx.sys = at(event_instant() - Duration::hours(30));

        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        let summaries = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert!(summaries.is_empty());
        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn repeated_sweeps_inside_the_window_send_once() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        // Two sweeps five minutes apart, both inside the 15-minute window
        ctx.sys = at(event_instant() - Duration::hours(24) + Duration::minutes(3));
        execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        ctx.sys = at(event_instant() - Duration::hours(24) + Duration::minutes(8));
        let summaries = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();

        assert_eq!(summaries[0].sent, 0);
        assert_eq!(summaries[0].skipped, 1);
        assert_eq!(sms.sent.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn cancelled_events_drop_out_of_the_sweep() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();
        ctx.sys = at(event_instant() - Duration::hours(24) + Duration::minutes(3));

        let mut event = upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        event.status = EventStatus::Cancelled;
        ctx.repos.events.save(&event).await.unwrap();

        let summaries = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert!(summaries.is_empty());
        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn both_offsets_fire_for_one_event_at_different_sweeps() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        ctx.sys = at(event_instant() - Duration::hours(24) + Duration::minutes(3));
        execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        ctx.sys = at(event_instant() - Duration::hours(2) + Duration::minutes(3));
        execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();

        let sent = sms.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
    }
}
