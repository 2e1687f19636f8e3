mod event;
mod poll;
mod rate_limit;
mod reminder;
mod reply;
mod rsvp;
mod shared;
pub mod timezone;
pub mod window;
mod user;

pub use event::{Event, EventStatus, NewEvent};
pub use poll::{Poll, PollDateOption, PollStatus, Restaurant};
pub use rate_limit::{window_start, RateLimitCounter};
pub use reminder::ReminderRecord;
pub use reply::{parse_sms_reply, CalendarReply, CalendarReplyParser, Partstat, SmsIntent};
pub use rsvp::{Rsvp, RsvpFilter, RsvpStatus, RsvpUpdate};
pub use shared::entity::{Entity, ID};
pub use timezone::default_event_time;
pub use user::{normalize_phone, NewUser, User, UserStatus};
pub use window::{due_offsets, ReminderOffset};
