use clubnight_domain::{Rsvp, RsvpStatus, ID};
use serde::{Deserialize, Serialize};

/// The fields of interest in the provider's form-encoded SMS webhook body.
/// The raw pairs stay around separately because the signature covers every
/// parameter, not just these.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundSmsForm {
    pub from: String,
    pub body: String,
    pub message_sid: Option<String>,
}

impl InboundSmsForm {
    pub fn from_pairs(pairs: &[(String, String)]) -> Option<Self> {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        Some(Self {
            from: get("From")?,
            body: get("Body")?,
            message_sid: get("MessageSid"),
        })
    }
}

/// Inbound email webhook body: `{ type, data: { from, subject, text, html } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEmailBody {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: InboundEmailData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEmailData {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpDTO {
    pub event_id: ID,
    pub user_id: ID,
    pub status: RsvpStatus,
    pub comments: Option<String>,
    pub updated_via_calendar: bool,
}

impl RsvpDTO {
    pub fn new(rsvp: Rsvp) -> Self {
        Self {
            event_id: rsvp.event_id,
            user_id: rsvp.user_id,
            status: rsvp.status,
            comments: rsvp.comments,
            updated_via_calendar: rsvp.updated_via_calendar,
        }
    }
}
