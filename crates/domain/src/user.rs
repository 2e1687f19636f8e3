use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A club member.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
    /// Canonical E.164 number, or None when the member never supplied a
    /// usable one.
    pub phone: Option<String>,
    pub sms_opt_in: bool,
    /// Millis timestamp of the STOP reply. None means opted in.
    pub sms_opted_out_at: Option<i64>,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub sms_opt_in: bool,
    pub sms_opted_out_at: Option<i64>,
    pub status: UserStatus,
}

impl NewUser {
    pub fn with_id(self, id: ID) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            sms_opt_in: self.sms_opt_in,
            sms_opted_out_at: self.sms_opted_out_at,
            status: self.status,
        }
    }
}

impl User {
    /// Reminder recipients must be active, opted in, not opted out and
    /// reachable by phone.
    pub fn is_reminder_eligible(&self) -> bool {
        self.status == UserStatus::Active
            && self.sms_opt_in
            && self.sms_opted_out_at.is_none()
            && self.phone.is_some()
    }
}

impl Entity for User {
    fn id(&self) -> ID {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Invited,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
            Self::Inactive => "inactive",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "invited" => Ok(Self::Invited),
            "inactive" => Ok(Self::Inactive),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Normalizes a phone number to canonical `+1XXXXXXXXXX` form.
///
/// Accepts ten digits, eleven digits with a leading country code `1`, or an
/// already canonical number in any common formatting. Anything else is not
/// a number we can deliver to and becomes None.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => Some(format!("+1{}", digits)),
        11 if digits.starts_with('1') => Some(format!("+{}", digits)),
        _ => None,
    }
}
