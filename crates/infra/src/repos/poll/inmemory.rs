use super::{IPollRepo, PollCloseOutcome};
use crate::repos::event::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use clubnight_domain::{NewEvent, Poll, PollDateOption, PollStatus, Restaurant, ID};
use std::sync::atomic::AtomicI64;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct VoteRow {
    poll_id: ID,
    target_id: ID,
    user_id: ID,
}

/// Shares the event repo so a close lands the created event where the rest
/// of the code will look for it. The postgres implementation does the same
/// in one transaction.
pub struct InMemoryPollRepo {
    polls: Mutex<Vec<Poll>>,
    restaurants: Mutex<Vec<Restaurant>>,
    date_options: Mutex<Vec<PollDateOption>>,
    restaurant_votes: Mutex<Vec<VoteRow>>,
    date_votes: Mutex<Vec<VoteRow>>,
    event_repo: Arc<dyn IEventRepo>,
    id_seq: AtomicI64,
}

impl InMemoryPollRepo {
    pub fn new(event_repo: Arc<dyn IEventRepo>) -> Self {
        Self {
            polls: Mutex::new(Vec::new()),
            restaurants: Mutex::new(Vec::new()),
            date_options: Mutex::new(Vec::new()),
            restaurant_votes: Mutex::new(Vec::new()),
            date_votes: Mutex::new(Vec::new()),
            event_repo,
            id_seq: AtomicI64::new(1),
        }
    }

    fn record_vote(&self, votes: &Mutex<Vec<VoteRow>>, vote: VoteRow) {
        let mut votes = votes.lock().unwrap();
        if let Some(existing) = votes
            .iter_mut()
            .find(|v| v.poll_id == vote.poll_id && v.user_id == vote.user_id)
        {
            existing.target_id = vote.target_id;
        } else {
            votes.push(vote);
        }
    }

    fn count_votes(&self, votes: &Mutex<Vec<VoteRow>>, poll_id: &ID, target_id: &ID) -> i64 {
        votes
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.poll_id == *poll_id && v.target_id == *target_id)
            .count() as i64
    }
}

#[async_trait::async_trait]
impl IPollRepo for InMemoryPollRepo {
    async fn insert(&self) -> anyhow::Result<Poll> {
        let poll = Poll {
            id: next_id(&self.id_seq),
            status: PollStatus::Active,
            winning_restaurant_id: None,
            winning_date_option_id: None,
            created_event_id: None,
        };
        insert(&poll, &self.polls);
        Ok(poll)
    }

    async fn find(&self, poll_id: &ID) -> Option<Poll> {
        find(poll_id, &self.polls)
    }

    async fn insert_restaurant(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> anyhow::Result<Restaurant> {
        let restaurant = Restaurant {
            id: next_id(&self.id_seq),
            name: name.to_string(),
            address: address.map(Into::into),
        };
        insert(&restaurant, &self.restaurants);
        Ok(restaurant)
    }

    async fn find_restaurant(&self, restaurant_id: &ID) -> Option<Restaurant> {
        find(restaurant_id, &self.restaurants)
    }

    async fn insert_date_option(
        &self,
        poll_id: &ID,
        date: NaiveDate,
    ) -> anyhow::Result<PollDateOption> {
        let option = PollDateOption {
            id: next_id(&self.id_seq),
            poll_id: *poll_id,
            date,
        };
        insert(&option, &self.date_options);
        Ok(option)
    }

    async fn find_date_option(&self, option_id: &ID) -> Option<PollDateOption> {
        find(option_id, &self.date_options)
    }

    async fn add_restaurant_vote(
        &self,
        poll_id: &ID,
        restaurant_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()> {
        self.record_vote(
            &self.restaurant_votes,
            VoteRow {
                poll_id: *poll_id,
                target_id: *restaurant_id,
                user_id: *user_id,
            },
        );
        Ok(())
    }

    async fn add_date_vote(
        &self,
        poll_id: &ID,
        option_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()> {
        self.record_vote(
            &self.date_votes,
            VoteRow {
                poll_id: *poll_id,
                target_id: *option_id,
                user_id: *user_id,
            },
        );
        Ok(())
    }

    async fn restaurant_vote_count(
        &self,
        poll_id: &ID,
        restaurant_id: &ID,
    ) -> anyhow::Result<i64> {
        Ok(self.count_votes(&self.restaurant_votes, poll_id, restaurant_id))
    }

    async fn date_vote_count(&self, poll_id: &ID, option_id: &ID) -> anyhow::Result<i64> {
        Ok(self.count_votes(&self.date_votes, poll_id, option_id))
    }

    async fn close_with_event(
        &self,
        poll_id: &ID,
        winning_restaurant_id: &ID,
        winning_date_option_id: &ID,
        event: &NewEvent,
    ) -> anyhow::Result<PollCloseOutcome> {
        // The status re-check happens under the poll lock, mirroring the
        // transactional re-check in the postgres implementation.
        {
            let mut polls = self.polls.lock().unwrap();
            let poll = polls
                .iter_mut()
                .find(|p| p.id == *poll_id)
                .ok_or_else(|| anyhow::anyhow!("Poll {} does not exist", poll_id))?;
            if poll.status != PollStatus::Active {
                return Ok(PollCloseOutcome::AlreadyClosed);
            }
            poll.status = PollStatus::Closed;
            poll.winning_restaurant_id = Some(*winning_restaurant_id);
            poll.winning_date_option_id = Some(*winning_date_option_id);
        }

        let created = self.event_repo.insert(event).await?;

        let mut polls = self.polls.lock().unwrap();
        if let Some(poll) = polls.iter_mut().find(|p| p.id == *poll_id) {
            poll.created_event_id = Some(created.id);
        }
        Ok(PollCloseOutcome::Closed(created))
    }
}
