use super::legacy;
use crate::error::ClubError;
use crate::shared::auth::protect_email_webhook;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use clubnight_api_structs::dtos::{InboundEmailBody, InboundEmailData, RsvpDTO};
use clubnight_api_structs::receive_email::{APIResponse, AckResponse};
use clubnight_domain::{CalendarReplyParser, Rsvp, RsvpUpdate, ID};
use clubnight_infra::ClubContext;
use tracing::info;

const PROCESSED_EVENT_TYPE: &str = "email.received";

pub async fn receive_email_controller(
    http_req: HttpRequest,
    payload: web::Bytes,
    ctx: web::Data<ClubContext>,
) -> Result<HttpResponse, ClubError> {
    // The signature is over the raw body; parse only after it verifies.
    protect_email_webhook(&http_req, &ctx, &payload)?;

    let body: InboundEmailBody = serde_json::from_slice(&payload)
        .map_err(|_| ClubError::BadClientData("Request body is not valid JSON".into()))?;

    if body.event_type != PROCESSED_EVENT_TYPE {
        return Ok(HttpResponse::Ok().json(AckResponse::new("Event type ignored")));
    }

    let usecase = ProcessCalendarReplyUseCase { email: body.data };

    execute(usecase, &ctx)
        .await
        .map(|outcome| match outcome {
            CalendarReplyOutcome::NoActionableData => {
                // Deliberately neutral: a hostile relay learns nothing
                // about why its payload did not parse.
                HttpResponse::Ok().json(AckResponse::new("No actionable data found"))
            }
            CalendarReplyOutcome::Reconciled(rsvp) => {
                HttpResponse::Ok().json(APIResponse::new(RsvpDTO::new(rsvp)))
            }
        })
        .map_err(ClubError::from)
}

#[derive(Debug)]
pub struct ProcessCalendarReplyUseCase {
    pub email: InboundEmailData,
}

#[derive(Debug)]
pub enum CalendarReplyOutcome {
    NoActionableData,
    Reconciled(Rsvp),
}

#[derive(Debug)]
pub enum UseCaseError {
    EventNotFound(ID),
    UnknownSender(String),
    StorageError,
}

impl From<UseCaseError> for ClubError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EventNotFound(event_id) => {
                Self::NotFound(format!("The event with id: {}, was not found.", event_id))
            }
            UseCaseError::UnknownSender(from) => {
                Self::NotFound(format!("No member matching sender {}", from))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessCalendarReplyUseCase {
    type Response = CalendarReplyOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "ProcessCalendarReply";

    async fn execute(&mut self, ctx: &ClubContext) -> Result<Self::Response, Self::Error> {
        let parser = CalendarReplyParser::new(&ctx.config.reply_email_domain);
        let reply = match parser.parse(&self.email.text, &self.email.html, &self.email.subject) {
            Some(reply) => reply,
            None => return Ok(CalendarReplyOutcome::NoActionableData),
        };

        let event_id = legacy::redirect_event_id(reply.event_id);
        let event = ctx
            .repos
            .events
            .find(&event_id)
            .await
            .ok_or(UseCaseError::EventNotFound(event_id))?;
        if !event.is_upcoming() {
            // Stragglers answering a completed or cancelled dinner; there
            // is nothing to reconcile into.
            return Ok(CalendarReplyOutcome::NoActionableData);
        }

        let user = match reply.recipient_id {
            Some(recipient_id) => ctx.repos.users.find(&recipient_id).await,
            None => {
                let sender = sender_address(&self.email.from);
                ctx.repos.users.find_by_email(sender).await
            }
        }
        .ok_or_else(|| UseCaseError::UnknownSender(self.email.from.clone()))?;

        let result = ctx
            .repos
            .rsvps
            .upsert(&RsvpUpdate {
                event_id: event.id,
                user_id: user.id,
                status: reply.partstat.to_rsvp_status(),
                comments: None,
                via_calendar: true,
            })
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        info!(
            "Calendar reply {} reconciled for member {} on event {} ({})",
            reply.partstat.as_str(),
            user.id,
            event.id,
            if result.was_created() {
                "created"
            } else {
                "updated"
            }
        );

        Ok(CalendarReplyOutcome::Reconciled(result.rsvp().clone()))
    }
}

/// "Pat Doe <pat@example.com>" -> "pat@example.com"
fn sender_address(from: &str) -> &str {
    match (from.rfind('<'), from.rfind('>')) {
        (Some(start), Some(end)) if start < end => &from[start + 1..end],
        _ => from.trim(),
    }
}
