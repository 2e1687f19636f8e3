use chrono::{NaiveDate, NaiveTime};
use clubnight_domain::{Event, EventStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDTO {
    pub id: ID,
    pub restaurant_name: String,
    pub restaurant_address: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub status: EventStatus,
}

impl EventDTO {
    pub fn new(event: Event) -> Self {
        Self {
            id: event.id,
            restaurant_name: event.restaurant_name,
            restaurant_address: event.restaurant_address,
            event_date: event.event_date,
            event_time: event.event_time,
            status: event.status,
        }
    }
}
