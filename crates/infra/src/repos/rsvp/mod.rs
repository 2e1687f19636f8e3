mod inmemory;
mod postgres;

use clubnight_domain::{Rsvp, RsvpUpdate, ID};
pub use inmemory::InMemoryRsvpRepo;
pub use postgres::PostgresRsvpRepo;

/// Whether the reconciling upsert created a fresh row or replaced the
/// answer in an existing one; downstream activity logging cares.
#[derive(Debug, Clone, PartialEq)]
pub enum RsvpWriteResult {
    Created(Rsvp),
    Updated(Rsvp),
}

impl RsvpWriteResult {
    pub fn rsvp(&self) -> &Rsvp {
        match self {
            Self::Created(rsvp) => rsvp,
            Self::Updated(rsvp) => rsvp,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[async_trait::async_trait]
pub trait IRsvpRepo: Send + Sync {
    /// Reconciles a member response into the single row per (event, user).
    ///
    /// Updates replace the status (and comments when supplied), clear any
    /// admin-override markers and restamp the provenance flag. Uniqueness
    /// is enforced by the datastore, not re-checked by callers.
    async fn upsert(&self, update: &RsvpUpdate) -> anyhow::Result<RsvpWriteResult>;
    /// Full-row write used by admin corrections; sets override markers
    /// verbatim.
    async fn save(&self, rsvp: &Rsvp) -> anyhow::Result<()>;
    async fn find(&self, event_id: &ID, user_id: &ID) -> Option<Rsvp>;
    async fn find_by_event(&self, event_id: &ID) -> Vec<Rsvp>;
}
