use super::IReminderRecordRepo;
use clubnight_domain::{ReminderRecord, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRecordRepo {
    records: Mutex<Vec<ReminderRecord>>,
}

impl InMemoryReminderRecordRepo {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRecordRepo for InMemoryReminderRecordRepo {
    async fn insert_if_absent(&self, record: &ReminderRecord) -> anyhow::Result<bool> {
        let mut records = self.records.lock().unwrap();
        let exists = records.iter().any(|r| {
            r.event_id == record.event_id
                && r.user_id == record.user_id
                && r.reminder_type == record.reminder_type
        });
        if exists {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn exists(&self, event_id: &ID, user_id: &ID, reminder_type: &str) -> bool {
        self.records.lock().unwrap().iter().any(|r| {
            r.event_id == *event_id && r.user_id == *user_id && r.reminder_type == reminder_type
        })
    }

    async fn find_sent_user_ids(&self, event_id: &ID, reminder_type: &str) -> Vec<ID> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.event_id == *event_id && r.reminder_type == reminder_type)
            .map(|r| r.user_id)
            .collect()
    }
}
