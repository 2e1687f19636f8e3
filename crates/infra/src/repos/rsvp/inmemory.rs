use super::{IRsvpRepo, RsvpWriteResult};
use clubnight_domain::{Rsvp, RsvpUpdate, ID};
use std::sync::Mutex;

pub struct InMemoryRsvpRepo {
    rsvps: Mutex<Vec<Rsvp>>,
}

impl InMemoryRsvpRepo {
    pub fn new() -> Self {
        Self {
            rsvps: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IRsvpRepo for InMemoryRsvpRepo {
    async fn upsert(&self, update: &RsvpUpdate) -> anyhow::Result<RsvpWriteResult> {
        let mut rsvps = self.rsvps.lock().unwrap();
        if let Some(existing) = rsvps
            .iter_mut()
            .find(|r| r.event_id == update.event_id && r.user_id == update.user_id)
        {
            existing.status = update.status;
            if update.comments.is_some() {
                existing.comments = update.comments.clone();
            }
            existing.admin_override = false;
            existing.overridden_by = None;
            existing.overridden_at = None;
            existing.updated_via_calendar = update.via_calendar;
            return Ok(RsvpWriteResult::Updated(existing.clone()));
        }

        let rsvp = Rsvp {
            event_id: update.event_id,
            user_id: update.user_id,
            status: update.status,
            comments: update.comments.clone(),
            admin_override: false,
            overridden_by: None,
            overridden_at: None,
            updated_via_calendar: update.via_calendar,
        };
        rsvps.push(rsvp.clone());
        Ok(RsvpWriteResult::Created(rsvp))
    }

    async fn save(&self, rsvp: &Rsvp) -> anyhow::Result<()> {
        let mut rsvps = self.rsvps.lock().unwrap();
        if let Some(existing) = rsvps
            .iter_mut()
            .find(|r| r.event_id == rsvp.event_id && r.user_id == rsvp.user_id)
        {
            *existing = rsvp.clone();
        } else {
            rsvps.push(rsvp.clone());
        }
        Ok(())
    }

    async fn find(&self, event_id: &ID, user_id: &ID) -> Option<Rsvp> {
        self.rsvps
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.event_id == *event_id && r.user_id == *user_id)
            .cloned()
    }

    async fn find_by_event(&self, event_id: &ID) -> Vec<Rsvp> {
        self.rsvps
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.event_id == *event_id)
            .cloned()
            .collect()
    }
}
