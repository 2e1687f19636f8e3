use crate::dtos::EventDTO;
use chrono::NaiveTime;
use clubnight_domain::{Event, ID};
use serde::{Deserialize, Serialize};

pub mod close_poll {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub poll_id: ID,
    }

    /// Form body from the admin UI. The winners are re-validated
    /// server-side against freshly computed vote counts; nothing in this
    /// body is trusted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestBody {
        pub winning_restaurant_id: ID,
        pub winning_date_option_id: ID,
        /// Event start if the admin picked one; defaults to 18:00.
        pub event_time: Option<NaiveTime>,
        pub send_invites: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub event: EventDTO,
    }

    impl APIResponse {
        pub fn new(event: Event) -> Self {
            Self {
                event: EventDTO::new(event),
            }
        }
    }
}
