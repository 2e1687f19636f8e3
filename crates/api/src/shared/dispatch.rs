use chrono::prelude::*;
use clubnight_api_structs::dtos::DispatchSummaryDTO;
use clubnight_domain::{timezone, Event, ReminderRecord, RsvpStatus, User, ID};
use clubnight_infra::ClubContext;
use std::collections::HashSet;
use tracing::{error, warn};

/// Outcome of one "send to recipient set" run.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSummary {
    pub event_id: ID,
    pub reminder_type: String,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchSummary {
    fn new(event_id: ID, reminder_type: &str) -> Self {
        Self {
            event_id,
            reminder_type: reminder_type.to_string(),
            sent: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn into_dto(self) -> DispatchSummaryDTO {
        DispatchSummaryDTO {
            event_id: self.event_id,
            reminder_type: self.reminder_type,
            sent: self.sent,
            skipped: self.skipped,
            failed: self.failed,
        }
    }
}

/// The message copy a recipient gets. Invites and reminders share the send
/// path and differ only in the leading line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageKind {
    Reminder,
    Invite,
}

/// Sends one message per recipient and records each confirmed send.
///
/// Recipients already holding a `ReminderRecord` for (event, type) are
/// skipped, so re-running is safe. The order per recipient is send, then
/// record: a crash in between can produce one duplicate send on the next
/// run, never a silently skipped member. A failed send leaves no record
/// behind and does not stop the rest of the batch.
pub async fn send_to_recipients(
    ctx: &ClubContext,
    event: &Event,
    recipients: &[User],
    reminder_type: &str,
    kind: MessageKind,
) -> DispatchSummary {
    let mut summary = DispatchSummary::new(event.id, reminder_type);
    let now = Utc.timestamp_millis(ctx.sys.get_timestamp_millis());
    let already_sent: HashSet<ID> = ctx
        .repos
        .reminder_records
        .find_sent_user_ids(&event.id, reminder_type)
        .await
        .into_iter()
        .collect();

    for user in recipients {
        if already_sent.contains(&user.id) {
            summary.skipped += 1;
            continue;
        }

        let phone = match &user.phone {
            Some(phone) => phone,
            None => {
                summary.skipped += 1;
                continue;
            }
        };

        let rsvp_status = ctx
            .repos
            .rsvps
            .find(&event.id, &user.id)
            .await
            .map(|rsvp| rsvp.status);
        let message = render_message(event, rsvp_status, now, ctx, kind);

        match ctx.sms.send(phone, &message).await {
            Ok(()) => {
                summary.sent += 1;
                let record = ReminderRecord::new(event.id, user.id, reminder_type);
                if let Err(e) = ctx.repos.reminder_records.insert_if_absent(&record).await {
                    // The member was reached; the missing record only
                    // risks one duplicate on the next run.
                    error!(
                        "Sent reminder but failed to record it for event {} user {} type {}: {:?}",
                        event.id, user.id, reminder_type, e
                    );
                }
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    "Failed to send reminder for event {} to user {}: {:?}",
                    event.id, user.id, e
                );
            }
        }
    }

    summary
}

fn render_message(
    event: &Event,
    rsvp_status: Option<RsvpStatus>,
    now: DateTime<Utc>,
    ctx: &ClubContext,
    kind: MessageKind,
) -> String {
    let tz = ctx.config.club_timezone;
    let day = timezone::relative_day_label(event.event_date, now, tz);
    let time = timezone::format_event_time(event.event_time);
    let lead = match kind {
        MessageKind::Reminder => "Reminder",
        MessageKind::Invite => "You're invited",
    };
    format!(
        "{}: dinner {} at {} at {}. Your RSVP: {}. \
         Reply YES or NO to RSVP, HELP for help or STOP to opt out.",
        lead,
        day,
        time,
        event.restaurant_name,
        RsvpStatus::label(rsvp_status)
    )
}
