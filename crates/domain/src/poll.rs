use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A round of voting over candidate restaurants and dates. Closing it is
/// one-way and produces the `Event` the reminder machinery keys off of.
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    pub id: ID,
    pub status: PollStatus,
    pub winning_restaurant_id: Option<ID>,
    pub winning_date_option_id: Option<ID>,
    pub created_event_id: Option<ID>,
}

impl Entity for Poll {
    fn id(&self) -> ID {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Closed,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }
}

impl Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PollStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(anyhow::anyhow!("Invalid poll status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: ID,
    pub name: String,
    pub address: Option<String>,
}

impl Entity for Restaurant {
    fn id(&self) -> ID {
        self.id
    }
}

/// A candidate date members can vote on within one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollDateOption {
    pub id: ID,
    pub poll_id: ID,
    pub date: NaiveDate,
}

impl Entity for PollDateOption {
    fn id(&self) -> ID {
        self.id
    }
}
