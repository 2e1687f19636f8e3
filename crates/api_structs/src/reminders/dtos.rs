use clubnight_domain::ID;
use serde::{Deserialize, Serialize};

/// Outcome of one "send to recipient set" run for one (event, type) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummaryDTO {
    pub event_id: ID,
    pub reminder_type: String,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}
