use crate::shared::entity::{Entity, ID};
use crate::timezone;
use chrono::prelude::*;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A scheduled club dinner, produced by closing a poll or created directly
/// by an admin.
///
/// Only the civil date and time-of-day are stored. The absolute instant
/// depends on the club zone's offset for that calendar date, so it is
/// recomputed on every use instead of being persisted as UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: ID,
    pub restaurant_name: String,
    pub restaurant_address: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub status: EventStatus,
}

/// An `Event` waiting for the datastore to assign its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub restaurant_name: String,
    pub restaurant_address: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub status: EventStatus,
}

impl NewEvent {
    pub fn with_id(self, id: ID) -> Event {
        Event {
            id,
            restaurant_name: self.restaurant_name,
            restaurant_address: self.restaurant_address,
            event_date: self.event_date,
            event_time: self.event_time,
            status: self.status,
        }
    }
}

impl Event {
    /// The absolute instant this event starts at in the club zone.
    pub fn instant(&self, tz: Tz) -> DateTime<Utc> {
        timezone::civil_to_instant(self.event_date, self.event_time, tz)
    }

    pub fn is_upcoming(&self) -> bool {
        self.status == EventStatus::Upcoming
    }
}

impl Entity for Event {
    fn id(&self) -> ID {
        self.id
    }
}

/// Reminders stop as soon as an event leaves `Upcoming`; rows are never
/// deleted for that purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid event status: {}", s)),
        }
    }
}
