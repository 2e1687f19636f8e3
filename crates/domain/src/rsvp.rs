use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// One member's answer for one event. Uniqueness per (event, user) is an
/// invariant enforced by the datastore.
#[derive(Debug, Clone, PartialEq)]
pub struct Rsvp {
    pub event_id: ID,
    pub user_id: ID,
    pub status: RsvpStatus,
    pub comments: Option<String>,
    /// Set when an admin manually corrected this row. A later reply from
    /// the member through any channel clears it again; the member's own
    /// answer wins.
    pub admin_override: bool,
    pub overridden_by: Option<ID>,
    pub overridden_at: Option<i64>,
    /// Provenance: true when the latest write came in through the
    /// calendar-reply channel rather than SMS or a manual edit.
    pub updated_via_calendar: bool,
}

/// A member response on its way into the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub struct RsvpUpdate {
    pub event_id: ID,
    pub user_id: ID,
    pub status: RsvpStatus,
    pub comments: Option<String>,
    pub via_calendar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
        }
    }

    /// Human label for message rendering. A missing row renders "Pending".
    pub fn label(status: Option<RsvpStatus>) -> &'static str {
        match status {
            Some(Self::Yes) => "Yes",
            Some(Self::No) => "No",
            Some(Self::Maybe) => "Maybe",
            None => "Pending",
        }
    }
}

impl Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "maybe" => Ok(Self::Maybe),
            _ => Err(anyhow::anyhow!("Invalid rsvp status: {}", s)),
        }
    }
}

/// Recipient scoping for ad-hoc broadcasts: a concrete answer, or members
/// who have not answered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpFilter {
    Yes,
    No,
    Maybe,
    Pending,
}

impl RsvpFilter {
    pub fn matches(&self, status: Option<RsvpStatus>) -> bool {
        match (self, status) {
            (Self::Yes, Some(RsvpStatus::Yes)) => true,
            (Self::No, Some(RsvpStatus::No)) => true,
            (Self::Maybe, Some(RsvpStatus::Maybe)) => true,
            (Self::Pending, None) => true,
            _ => false,
        }
    }
}
