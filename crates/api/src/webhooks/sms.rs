use crate::error::ClubError;
use crate::shared::auth::protect_sms_webhook;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::prelude::*;
use clubnight_api_structs::dtos::InboundSmsForm;
use clubnight_api_structs::receive_sms;
use clubnight_domain::{
    normalize_phone, parse_sms_reply, timezone, window_start, RsvpStatus, RsvpUpdate, SmsIntent,
};
use clubnight_infra::ClubContext;
use tracing::{info, warn};

const RATE_LIMIT_SCOPE: &str = "sms-webhook";
const RATE_LIMIT_WINDOW_MILLIS: i64 = 60 * 1000;

const HELP_TEXT: &str =
    "Clubnight: reply YES or NO to RSVP for the next dinner, or STOP to opt out of reminders.";

pub async fn receive_sms_controller(
    http_req: HttpRequest,
    payload: web::Bytes,
    ctx: web::Data<ClubContext>,
) -> Result<HttpResponse, ClubError> {
    // The signature covers every form parameter, so the raw pairs are
    // needed before any structured view of the body.
    let params: Vec<(String, String)> = serde_urlencoded::from_bytes(&payload)
        .map_err(|_| ClubError::BadClientData("Request body is not form encoded".into()))?;
    protect_sms_webhook(&http_req, &ctx, &params)?;

    let form = InboundSmsForm::from_pairs(&params)
        .ok_or_else(|| ClubError::BadClientData("Missing required From or Body field".into()))?;

    if over_rate_limit(&ctx, &form.from).await {
        warn!("Rate limiting inbound SMS from {}", form.from);
        return Ok(twiml(None));
    }

    let usecase = ProcessSmsReplyUseCase {
        from: form.from,
        body: form.body,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| twiml(outcome.message.as_deref()))
        .map_err(ClubError::from)
}

fn twiml(message: Option<&str>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/xml")
        .body(receive_sms::twiml_response(message))
}

async fn over_rate_limit(ctx: &ClubContext, sender: &str) -> bool {
    let now = ctx.sys.get_timestamp_millis();
    let window = window_start(now, RATE_LIMIT_WINDOW_MILLIS);
    let count = match ctx
        .repos
        .rate_limits
        .increment(
            RATE_LIMIT_SCOPE,
            sender,
            window,
            window + 2 * RATE_LIMIT_WINDOW_MILLIS,
        )
        .await
    {
        Ok(count) => count,
        Err(e) => {
            // Counting failures must not take the webhook down with them
            warn!("Rate limit counter unavailable: {:?}", e);
            return false;
        }
    };
    if count == 1 {
        let _ = ctx.repos.rate_limits.purge_expired(now).await;
    }
    count > ctx.config.sms_rate_limit_per_minute
}

#[derive(Debug)]
pub struct ProcessSmsReplyUseCase {
    pub from: String,
    pub body: String,
}

#[derive(Debug)]
pub struct SmsReplyOutcome {
    /// Rendered into the TwiML response; None sends no reply message.
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    UnknownSender(String),
    StorageError,
}

impl From<UseCaseError> for ClubError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UnknownSender(phone) => {
                Self::NotFound(format!("No member with number {}", phone))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessSmsReplyUseCase {
    type Response = SmsReplyOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "ProcessSmsReply";

    async fn execute(&mut self, ctx: &ClubContext) -> Result<Self::Response, Self::Error> {
        let phone = normalize_phone(&self.from).unwrap_or_else(|| self.from.clone());
        let mut user = ctx
            .repos
            .users
            .find_by_phone(&phone)
            .await
            .ok_or_else(|| UseCaseError::UnknownSender(phone.clone()))?;

        let status = match parse_sms_reply(&self.body) {
            Some(SmsIntent::OptOut) => {
                user.sms_opted_out_at = Some(ctx.sys.get_timestamp_millis());
                ctx.repos
                    .users
                    .save(&user)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;
                info!("Member {} opted out of SMS reminders", user.id);
                return Ok(SmsReplyOutcome {
                    message: Some(
                        "You're unsubscribed from Clubnight reminders. Reply HELP for help."
                            .to_string(),
                    ),
                });
            }
            Some(SmsIntent::Yes) => RsvpStatus::Yes,
            Some(SmsIntent::No) => RsvpStatus::No,
            Some(SmsIntent::Help) | None => {
                return Ok(SmsReplyOutcome {
                    message: Some(HELP_TEXT.to_string()),
                });
            }
        };

        let now = Utc.timestamp_millis(ctx.sys.get_timestamp_millis());
        let today = now
            .with_timezone(&ctx.config.club_timezone)
            .date()
            .naive_local();
        let event = match ctx.repos.events.find_next_upcoming(today).await {
            Some(event) => event,
            None => {
                return Ok(SmsReplyOutcome {
                    message: Some(
                        "There's no upcoming dinner to RSVP for right now.".to_string(),
                    ),
                });
            }
        };

        let result = ctx
            .repos
            .rsvps
            .upsert(&RsvpUpdate {
                event_id: event.id,
                user_id: user.id,
                status,
                comments: None,
                via_calendar: false,
            })
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        info!(
            "SMS rsvp {} for member {} on event {} ({})",
            status,
            user.id,
            event.id,
            if result.was_created() {
                "created"
            } else {
                "updated"
            }
        );

        let day = day_phrase(timezone::relative_day_label(
            event.event_date,
            now,
            ctx.config.club_timezone,
        ));
        let message = match status {
            RsvpStatus::Yes => format!(
                "You're in for {} {}. See you there!",
                event.restaurant_name, day
            ),
            _ => format!(
                "Got it, you're out for {} {}. Reply YES if plans change.",
                event.restaurant_name, day
            ),
        };
        Ok(SmsReplyOutcome {
            message: Some(message),
        })
    }
}

fn day_phrase(label: String) -> String {
    if label == "today" || label == "tomorrow" {
        label
    } else {
        format!("on {}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{member, test_context, upcoming_event};
    use clubnight_infra::StaticSys;
    use std::sync::Arc;

    fn reply(from: &str, body: &str) -> ProcessSmsReplyUseCase {
        ProcessSmsReplyUseCase {
            from: from.into(),
            body: body.into(),
        }
    }

    #[actix_web::test]
    async fn unknown_sender_is_not_found() {
        let ctx = test_context();
        let res = execute(reply("+13125550999", "YES"), &ctx).await;
        assert!(matches!(res, Err(UseCaseError::UnknownSender(_))));
    }

    #[actix_web::test]
    async fn yes_reply_rsvps_to_the_next_upcoming_event() {
        let mut ctx = test_context();
        // 2024-06-01 12:00 CDT
        ctx.sys = Arc::new(StaticSys(1_717_261_200_000));
        let _later_event = upcoming_event(&ctx, 2024, 6, 14).await;
        let next = upcoming_event(&ctx, 2024, 6, 7).await;
        let alice = member(&ctx, "alice", "+13125550001").await;

        let outcome = execute(reply("+13125550001", "YES"), &ctx).await.unwrap();
        assert!(outcome.message.unwrap().contains("You're in for"));

        let rsvp = ctx.repos.rsvps.find(&next.id, &alice.id).await.unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Yes);
        assert!(!rsvp.updated_via_calendar);
    }

    #[actix_web::test]
    async fn no_reply_updates_in_place() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(1_717_261_200_000));
        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        let alice = member(&ctx, "alice", "+13125550001").await;

        execute(reply("+13125550001", "YES"), &ctx).await.unwrap();
        execute(reply("+13125550001", "No thanks"), &ctx)
            .await
            .unwrap();

        let rsvps = ctx.repos.rsvps.find_by_event(&event.id).await;
        assert_eq!(rsvps.len(), 1);
        assert_eq!(rsvps[0].status, RsvpStatus::No);
        assert_eq!(rsvps[0].user_id, alice.id);
    }

    #[actix_web::test]
    async fn stop_reply_sets_opt_out_timestamp() {
        let mut ctx = test_context();
        ctx.sys = Arc::new(StaticSys(1_717_261_200_000));
        let alice = member(&ctx, "alice", "+13125550001").await;
        assert!(alice.is_reminder_eligible());

        let outcome = execute(reply("+13125550001", "STOP"), &ctx).await.unwrap();
        assert!(outcome.message.unwrap().contains("unsubscribed"));

        let alice = ctx.repos.users.find(&alice.id).await.unwrap();
        assert_eq!(alice.sms_opted_out_at, Some(1_717_261_200_000));
        assert!(!alice.is_reminder_eligible());
    }

    #[actix_web::test]
    async fn unrecognized_text_gets_help_and_changes_nothing() {
        let ctx = test_context();
        let event = upcoming_event(&ctx, 2024, 6, 7).await;
        member(&ctx, "alice", "+13125550001").await;

        let outcome = execute(reply("+13125550001", "what time again?"), &ctx)
            .await
            .unwrap();
        assert_eq!(outcome.message.as_deref(), Some(HELP_TEXT));
        assert!(ctx.repos.rsvps.find_by_event(&event.id).await.is_empty());
    }

    #[actix_web::test]
    async fn yes_without_upcoming_event_is_a_friendly_noop() {
        let ctx = test_context();
        member(&ctx, "alice", "+13125550001").await;
        let outcome = execute(reply("+13125550001", "YES"), &ctx).await.unwrap();
        assert!(outcome.message.unwrap().contains("no upcoming dinner"));
    }
}
