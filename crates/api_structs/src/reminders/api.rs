use crate::dtos::DispatchSummaryDTO;
use clubnight_domain::{RsvpFilter, ID};
use serde::{Deserialize, Serialize};

pub mod trigger_reminders {
    use super::*;

    /// The scheduled trigger carries no payload; the response summarizes
    /// what the sweep did so the trigger's logs show it.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub dispatched: Vec<DispatchSummaryDTO>,
    }

    impl APIResponse {
        pub fn new(dispatched: Vec<DispatchSummaryDTO>) -> Self {
            Self { dispatched }
        }
    }
}

pub mod broadcast_event_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    /// Form body from the admin UI. Scope the broadcast by current RSVP
    /// status, or to a single member; neither means every eligible member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestBody {
        pub rsvp_status: Option<RsvpFilter>,
        pub user_id: Option<ID>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub summary: DispatchSummaryDTO,
    }

    impl APIResponse {
        pub fn new(summary: DispatchSummaryDTO) -> Self {
            Self { summary }
        }
    }
}
