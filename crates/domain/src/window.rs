use chrono::{DateTime, Duration, Utc};

/// A named lead time before an event at which a reminder goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderOffset {
    /// Stable label, doubles as the `ReminderRecord` reminder-type.
    pub label: String,
    pub lead: Duration,
}

impl ReminderOffset {
    pub fn new(label: impl Into<String>, lead: Duration) -> Self {
        Self {
            label: label.into(),
            lead,
        }
    }

    pub fn hours(label: impl Into<String>, hours: i64) -> Self {
        Self::new(label, Duration::hours(hours))
    }
}

/// Which offsets are due for an event right now.
///
/// An offset is due iff `lead - window < event_instant - now <= lead`. A
/// sweep cadence no larger than the window cannot step over the interval,
/// and the half-open edges keep adjacent windows from both claiming a
/// boundary sweep; sweeps landing in the same window are collapsed by the
/// `ReminderRecord` dedup downstream.
pub fn due_offsets<'a>(
    event_instant: DateTime<Utc>,
    now: DateTime<Utc>,
    offsets: &'a [ReminderOffset],
    window: Duration,
) -> Vec<&'a ReminderOffset> {
    let diff = event_instant - now;
    offsets
        .iter()
        .filter(|offset| offset.lead - window < diff && diff <= offset.lead)
        .collect()
}
