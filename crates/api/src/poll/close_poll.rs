use crate::error::ClubError;
use crate::shared::auth::protect_admin_route;
use crate::shared::dispatch::{send_to_recipients, MessageKind};
use crate::shared::usecase::{execute, Subscriber, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::prelude::*;
use clubnight_api_structs::close_poll::{APIResponse, PathParams, RequestBody};
use clubnight_domain::{default_event_time, timezone, Event, EventStatus, NewEvent, ID};
use clubnight_infra::{ClubContext, PollCloseOutcome};
use tracing::{error, info};

pub async fn close_poll_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Form<RequestBody>,
    ctx: web::Data<ClubContext>,
) -> Result<HttpResponse, ClubError> {
    protect_admin_route(&http_req, &ctx)?;

    let body = body.into_inner();
    let usecase = ClosePollUseCase {
        poll_id: path_params.poll_id,
        winning_restaurant_id: body.winning_restaurant_id,
        winning_date_option_id: body.winning_date_option_id,
        event_time: body.event_time,
        send_invites: body.send_invites.unwrap_or(false),
    };

    execute(usecase, &ctx)
        .await
        .map(|closed| HttpResponse::Created().json(APIResponse::new(closed.event)))
        .map_err(ClubError::from)
}

/// The one-way `active -> closed` transition. Everything the admin picked
/// is re-validated here against fresh state; the winning counts in
/// particular are recomputed, never taken from the request.
#[derive(Debug)]
pub struct ClosePollUseCase {
    pub poll_id: ID,
    pub winning_restaurant_id: ID,
    pub winning_date_option_id: ID,
    pub event_time: Option<NaiveTime>,
    pub send_invites: bool,
}

#[derive(Debug)]
pub struct ClosedPoll {
    pub event: Event,
    pub send_invites: bool,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    PollNotFound(ID),
    AlreadyClosed(ID),
    RestaurantNotFound(ID),
    DateOptionNotFound(ID),
    DateOptionOutsidePoll(ID),
    ZeroVotes(&'static str),
    DateNotInFuture,
    MissingAddressForInvites,
    StorageError,
}

impl From<UseCaseError> for ClubError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::PollNotFound(poll_id) => {
                Self::NotFound(format!("The poll with id: {}, was not found.", poll_id))
            }
            UseCaseError::AlreadyClosed(poll_id) => Self::Conflict(format!(
                "The poll with id: {} is already closed.",
                poll_id
            )),
            UseCaseError::RestaurantNotFound(id) => {
                Self::NotFound(format!("The restaurant with id: {}, was not found.", id))
            }
            UseCaseError::DateOptionNotFound(id) => {
                Self::NotFound(format!("The date option with id: {}, was not found.", id))
            }
            UseCaseError::DateOptionOutsidePoll(id) => Self::BadClientData(format!(
                "The date option with id: {} does not belong to this poll.",
                id
            )),
            UseCaseError::ZeroVotes(which) => Self::BadClientData(format!(
                "Cannot close the poll: the chosen {} has no votes.",
                which
            )),
            UseCaseError::DateNotInFuture => Self::BadClientData(
                "Cannot close the poll: the chosen date is not in the future.".into(),
            ),
            UseCaseError::MissingAddressForInvites => Self::BadClientData(
                "Cannot send invites: the chosen restaurant has no address on file.".into(),
            ),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ClosePollUseCase {
    type Response = ClosedPoll;

    type Error = UseCaseError;

    const NAME: &'static str = "ClosePoll";

    async fn execute(&mut self, ctx: &ClubContext) -> Result<Self::Response, Self::Error> {
        let poll = ctx
            .repos
            .polls
            .find(&self.poll_id)
            .await
            .ok_or(UseCaseError::PollNotFound(self.poll_id))?;
        if poll.status != clubnight_domain::PollStatus::Active {
            return Err(UseCaseError::AlreadyClosed(poll.id));
        }

        let restaurant = ctx
            .repos
            .polls
            .find_restaurant(&self.winning_restaurant_id)
            .await
            .ok_or(UseCaseError::RestaurantNotFound(self.winning_restaurant_id))?;
        let date_option = ctx
            .repos
            .polls
            .find_date_option(&self.winning_date_option_id)
            .await
            .ok_or(UseCaseError::DateOptionNotFound(self.winning_date_option_id))?;
        if date_option.poll_id != poll.id {
            return Err(UseCaseError::DateOptionOutsidePoll(date_option.id));
        }

        // Counts from earlier in the admin's request cycle are stale by
        // now; only counts computed here may gate the close.
        let restaurant_votes = ctx
            .repos
            .polls
            .restaurant_vote_count(&poll.id, &restaurant.id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if restaurant_votes == 0 {
            return Err(UseCaseError::ZeroVotes("restaurant"));
        }
        let date_votes = ctx
            .repos
            .polls
            .date_vote_count(&poll.id, &date_option.id)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if date_votes == 0 {
            return Err(UseCaseError::ZeroVotes("date"));
        }

        let event_time = self.event_time.unwrap_or_else(default_event_time);
        let now = Utc.timestamp_millis(ctx.sys.get_timestamp_millis());
        let instant =
            timezone::civil_to_instant(date_option.date, event_time, ctx.config.club_timezone);
        if instant <= now {
            return Err(UseCaseError::DateNotInFuture);
        }

        if self.send_invites && restaurant.address.is_none() {
            return Err(UseCaseError::MissingAddressForInvites);
        }

        let new_event = NewEvent {
            restaurant_name: restaurant.name.clone(),
            restaurant_address: restaurant.address.clone(),
            event_date: date_option.date,
            event_time,
            status: EventStatus::Upcoming,
        };
        let outcome = ctx
            .repos
            .polls
            .close_with_event(
                &poll.id,
                &restaurant.id,
                &date_option.id,
                &new_event,
            )
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        match outcome {
            PollCloseOutcome::Closed(event) => {
                info!(
                    "Poll {} closed: {} on {} becomes event {}",
                    poll.id, restaurant.name, date_option.date, event.id
                );
                Ok(ClosedPoll {
                    event,
                    send_invites: self.send_invites,
                })
            }
            // Lost the race against a concurrent close
            PollCloseOutcome::AlreadyClosed => Err(UseCaseError::AlreadyClosed(poll.id)),
        }
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(SendInvitesOnPollClosed {})]
    }
}

/// Fires the invite fan-out after a successful close, off the request
/// path. Losing or duplicating the task is fine: the dispatch itself is
/// idempotent under the `invite-<event>` token, and its failure must never
/// unwind a committed poll closure.
pub struct SendInvitesOnPollClosed {}

#[async_trait::async_trait(?Send)]
impl Subscriber<ClosePollUseCase> for SendInvitesOnPollClosed {
    async fn notify(&self, closed: &ClosedPoll, ctx: &ClubContext) {
        if !closed.send_invites {
            return;
        }
        let ctx = ctx.clone();
        let event = closed.event.clone();
        actix_web::rt::spawn(async move {
            let recipients = ctx.repos.users.find_reminder_eligible().await;
            let token = format!("invite-{}", event.id);
            let summary =
                send_to_recipients(&ctx, &event, &recipients, &token, MessageKind::Invite).await;
            if summary.failed > 0 {
                error!(
                    "Invite dispatch for event {}: {} of {} sends failed",
                    event.id,
                    summary.failed,
                    summary.failed + summary.sent
                );
            } else {
                info!(
                    "Invite dispatch for event {}: {} sent, {} skipped",
                    event.id, summary.sent, summary.skipped
                );
            }
        });
    }
}
