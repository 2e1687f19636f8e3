mod inmemory;
mod postgres;

use chrono::NaiveDate;
use clubnight_domain::{Event, NewEvent, Poll, PollDateOption, Restaurant, ID};
pub use inmemory::InMemoryPollRepo;
pub use postgres::PostgresPollRepo;

/// Result of the transactional poll close. `AlreadyClosed` is the loser of
/// a concurrent double-close; exactly one caller gets `Closed`.
#[derive(Debug, Clone, PartialEq)]
pub enum PollCloseOutcome {
    Closed(Event),
    AlreadyClosed,
}

/// Polls with their candidate restaurants, date options and votes.
/// Restaurant and date-option CRUD lives in the admin screens; this repo
/// carries what the closing transition and its tests need.
#[async_trait::async_trait]
pub trait IPollRepo: Send + Sync {
    async fn insert(&self) -> anyhow::Result<Poll>;
    async fn find(&self, poll_id: &ID) -> Option<Poll>;

    async fn insert_restaurant(
        &self,
        name: &str,
        address: Option<&str>,
    ) -> anyhow::Result<Restaurant>;
    async fn find_restaurant(&self, restaurant_id: &ID) -> Option<Restaurant>;

    async fn insert_date_option(
        &self,
        poll_id: &ID,
        date: NaiveDate,
    ) -> anyhow::Result<PollDateOption>;
    async fn find_date_option(&self, option_id: &ID) -> Option<PollDateOption>;

    /// One restaurant vote per (poll, user); a second vote replaces the
    /// first.
    async fn add_restaurant_vote(
        &self,
        poll_id: &ID,
        restaurant_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()>;
    async fn add_date_vote(
        &self,
        poll_id: &ID,
        option_id: &ID,
        user_id: &ID,
    ) -> anyhow::Result<()>;

    /// Vote counts are always recomputed from the rows, scoped to the
    /// given poll. Callers must not reuse counts computed earlier in a
    /// request.
    async fn restaurant_vote_count(&self, poll_id: &ID, restaurant_id: &ID)
        -> anyhow::Result<i64>;
    async fn date_vote_count(&self, poll_id: &ID, option_id: &ID) -> anyhow::Result<i64>;

    /// Atomically: re-check the poll is still active, mark it closed with
    /// the winning refs, insert the event, and stamp the created event id.
    /// The status re-check inside the transaction is what makes concurrent
    /// double-closing produce one winner.
    async fn close_with_event(
        &self,
        poll_id: &ID,
        winning_restaurant_id: &ID,
        winning_date_option_id: &ID,
        event: &NewEvent,
    ) -> anyhow::Result<PollCloseOutcome>;
}
