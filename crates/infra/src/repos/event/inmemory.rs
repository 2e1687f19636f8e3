use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use clubnight_domain::{Event, NewEvent, ID};
use std::sync::atomic::AtomicI64;
use std::sync::Mutex;

pub struct InMemoryEventRepo {
    events: Mutex<Vec<Event>>,
    id_seq: AtomicI64,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            id_seq: AtomicI64::new(1),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, event: &NewEvent) -> anyhow::Result<Event> {
        let event = event.clone().with_id(next_id(&self.id_seq));
        insert(&event, &self.events);
        Ok(event)
    }

    async fn save(&self, event: &Event) -> anyhow::Result<()> {
        save(event, &self.events);
        Ok(())
    }

    async fn find(&self, event_id: &ID) -> Option<Event> {
        find(event_id, &self.events)
    }

    async fn find_upcoming(&self) -> Vec<Event> {
        let mut upcoming = find_by(&self.events, |event: &Event| event.is_upcoming());
        upcoming.sort_by_key(|event| (event.event_date, event.event_time));
        upcoming
    }

    async fn find_next_upcoming(&self, on_or_after: NaiveDate) -> Option<Event> {
        let mut candidates = find_by(&self.events, |event: &Event| {
            event.is_upcoming() && event.event_date >= on_or_after
        });
        candidates.sort_by_key(|event| (event.event_date, event.event_time));
        candidates.into_iter().next()
    }
}
