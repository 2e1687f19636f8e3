use crate::shared::entity::ID;

/// Proof that a reminder went out to one member for one event.
///
/// The row's existence is the whole dedup mechanism: the dispatcher inserts
/// it only after a confirmed send, with insert-if-absent semantics, and
/// never updates it. `reminder_type` is a fixed offset label like "24h" or
/// a one-off token for ad-hoc broadcasts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderRecord {
    pub event_id: ID,
    pub user_id: ID,
    pub reminder_type: String,
}

impl ReminderRecord {
    pub fn new(event_id: ID, user_id: ID, reminder_type: impl Into<String>) -> Self {
        Self {
            event_id,
            user_id,
            reminder_type: reminder_type.into(),
        }
    }
}
