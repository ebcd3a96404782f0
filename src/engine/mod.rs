//! Poll aggregation: poll lifecycle, ballots, tallies and winners.
//!
//! Nothing here caches a tally. Every read goes back to the [`PollStore`] and
//! recomputes from the ballots it returns, so a mutation is visible to the next
//! read without any invalidation step.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{PollError, PollResult},
    models::Poll,
    store::PollStore,
};

mod ballots;
mod lifecycle;
mod tally;
mod winners;

pub use lifecycle::{validate_new_poll, MAX_CANDIDATES, MIN_CANDIDATES};
pub use tally::tally;
pub use winners::resolve_winners;

#[derive(Clone)]
pub struct PollEngine {
    store: Arc<dyn PollStore>,
}

impl PollEngine {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PollStore> {
        &self.store
    }

    async fn require_poll(&self, poll_id: Uuid) -> PollResult<Poll> {
        self.store
            .get_poll(poll_id)
            .await?
            .ok_or(PollError::PollNotFound)
    }
}
