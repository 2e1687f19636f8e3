use crate::error::ClubError;
use crate::shared::auth::protect_admin_route;
use crate::shared::dispatch::{send_to_recipients, DispatchSummary, MessageKind};
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use clubnight_api_structs::broadcast_event_reminder::{APIResponse, PathParams, RequestBody};
use clubnight_domain::{RsvpFilter, RsvpStatus, User, ID};
use clubnight_infra::ClubContext;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

pub async fn broadcast_event_reminder_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Form<RequestBody>,
    ctx: web::Data<ClubContext>,
) -> Result<HttpResponse, ClubError> {
    protect_admin_route(&http_req, &ctx)?;

    let body = body.into_inner();
    let usecase = BroadcastEventReminderUseCase {
        event_id: path_params.event_id,
        rsvp_filter: body.rsvp_status,
        user_id: body.user_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(APIResponse::new(summary.into_dto())))
        .map_err(ClubError::from)
}

/// Admin-triggered "send it now" outside the scheduled offsets. Reuses the
/// sweep's eligibility and idempotency machinery, but under a one-off
/// reminder-type token so it never collides with scheduled reminders or
/// earlier broadcasts.
#[derive(Debug)]
pub struct BroadcastEventReminderUseCase {
    pub event_id: ID,
    pub rsvp_filter: Option<RsvpFilter>,
    pub user_id: Option<ID>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EventNotFound(ID),
    EventNotUpcoming(ID),
    UserNotFound(ID),
    UserNotReachable(ID),
}

impl From<UseCaseError> for ClubError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(event_id) => {
                Self::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
            UseCaseError::EventNotUpcoming(event_id) => Self::BadClientData(format!(
                "The event with id: {} is not upcoming, nothing to send.",
                event_id
            )),
            UseCaseError::UserNotFound(user_id) => {
                Self::NotFound(format!("The member with id: {}, was not found.", user_id))
            }
            UseCaseError::UserNotReachable(user_id) => Self::BadClientData(format!(
                "The member with id: {} cannot receive SMS (inactive, opted out or no phone).",
                user_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for BroadcastEventReminderUseCase {
    type Response = DispatchSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "BroadcastEventReminder";

    async fn execute(&mut self, ctx: &ClubContext) -> Result<Self::Response, Self::Error> {
        let event = ctx
            .repos
            .events
            .find(&self.event_id)
            .await
            .ok_or(UseCaseError::EventNotFound(self.event_id))?;
        if !event.is_upcoming() {
            return Err(UseCaseError::EventNotUpcoming(event.id));
        }

        let recipients: Vec<User> = match self.user_id {
            Some(user_id) => {
                let user = ctx
                    .repos
                    .users
                    .find(&user_id)
                    .await
                    .ok_or(UseCaseError::UserNotFound(user_id))?;
                if !user.is_reminder_eligible() {
                    return Err(UseCaseError::UserNotReachable(user_id));
                }
                vec![user]
            }
            None => {
                let eligible = ctx.repos.users.find_reminder_eligible().await;
                match self.rsvp_filter {
                    Some(filter) => {
                        let statuses: HashMap<ID, RsvpStatus> = ctx
                            .repos
                            .rsvps
                            .find_by_event(&event.id)
                            .await
                            .into_iter()
                            .map(|rsvp| (rsvp.user_id, rsvp.status))
                            .collect();
                        eligible
                            .into_iter()
                            .filter(|user| filter.matches(statuses.get(&user.id).copied()))
                            .collect()
                    }
                    None => eligible,
                }
            }
        };

        let token = format!("adhoc-{}", Uuid::new_v4());
        let summary =
            send_to_recipients(ctx, &event, &recipients, &token, MessageKind::Reminder).await;
        info!(
            "Broadcast {} for event {}: {} sent, {} skipped, {} failed",
            token, event.id, summary.sent, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{member, test_context, upcoming_event};
    use clubnight_domain::RsvpUpdate;
    use clubnight_infra::RecordingSmsSender;
    use std::sync::Arc;

    fn broadcast(
        event_id: ID,
        rsvp_filter: Option<RsvpFilter>,
        user_id: Option<ID>,
    ) -> BroadcastEventReminderUseCase {
        BroadcastEventReminderUseCase {
            event_id,
            rsvp_filter,
            user_id,
        }
    }

    async fn rsvp(ctx: &clubnight_infra::ClubContext, event_id: ID, user_id: ID, status: RsvpStatus) {
        ctx.repos
            .rsvps
            .upsert(&RsvpUpdate {
                event_id,
                user_id,
                status,
                comments: None,
                via_calendar: false,
            })
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn pending_filter_targets_members_without_an_answer() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        let alice = member(&ctx, "alice", "+13125550001").await;
        let _bob = member(&ctx, "bob", "+13125550002").await;
        rsvp(&ctx, event.id, alice.id, RsvpStatus::Yes).await;

        let summary = execute(
            broadcast(event.id, Some(RsvpFilter::Pending), None),
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(sms.sent_to(), vec!["+13125550002".to_string()]);
    }

    #[actix_web::test]
    async fn yes_filter_targets_confirmed_members() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        let alice = member(&ctx, "alice", "+13125550001").await;
        let bob = member(&ctx, "bob", "+13125550002").await;
        rsvp(&ctx, event.id, alice.id, RsvpStatus::Yes).await;
        rsvp(&ctx, event.id, bob.id, RsvpStatus::No).await;

        let summary = execute(broadcast(event.id, Some(RsvpFilter::Yes), None), &ctx)
            .await
            .unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(sms.sent_to(), vec!["+13125550001".to_string()]);
    }

    #[actix_web::test]
    async fn single_recipient_broadcast() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        let alice = member(&ctx, "alice", "+13125550001").await;
        member(&ctx, "bob", "+13125550002").await;

        let summary = execute(broadcast(event.id, None, Some(alice.id)), &ctx)
            .await
            .unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(sms.sent_to(), vec!["+13125550001".to_string()]);
    }

    #[actix_web::test]
    async fn two_broadcasts_are_not_deduplicated_against_each_other() {
        let mut ctx = test_context();
        let sms = Arc::new(RecordingSmsSender::new());
        ctx.sms = sms.clone();

        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        execute(broadcast(event.id, None, None), &ctx).await.unwrap();
        let second = execute(broadcast(event.id, None, None), &ctx).await.unwrap();

        // Fresh token each time: the second broadcast sends again
        assert_eq!(second.sent, 1);
        assert_eq!(sms.sent.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn unreachable_single_recipient_is_an_error() {
        let ctx = test_context();
        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        let mut alice = member(&ctx, "alice", "+13125550001").await;
        alice.sms_opted_out_at = Some(1);
        ctx.repos.users.save(&alice).await.unwrap();

        let res = execute(broadcast(event.id, None, Some(alice.id)), &ctx).await;
        assert!(matches!(res, Err(UseCaseError::UserNotReachable(_))));
    }

    #[actix_web::test]
    async fn broadcasting_a_cancelled_event_is_rejected() {
        let ctx = test_context();
        let mut event = upcoming_event(&ctx, 2024, 6, 7).await;
        event.status = clubnight_domain::EventStatus::Cancelled;
        ctx.repos.events.save(&event).await.unwrap();

        let res = execute(broadcast(event.id, None, None), &ctx).await;
        assert!(matches!(res, Err(UseCaseError::EventNotUpcoming(_))));
    }
}
