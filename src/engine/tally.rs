use uuid::Uuid;

use super::PollEngine;
use crate::{
    error::PollResult,
    models::{Ballot, CandidateCount, Poll, Standings, Tally},
};

/// Counts, for each candidate of `poll`, the ballots that select it.
///
/// Ballots of other polls and labels outside the candidate list are ignored.
/// An abstaining ballot counts for nobody.
pub fn tally(poll: &Poll, ballots: &[Ballot]) -> Tally {
    let ballots: Vec<&Ballot> = ballots.iter().filter(|b| b.poll_id == poll.id).collect();
    let counts = poll
        .candidates
        .iter()
        .map(|candidate| CandidateCount {
            candidate: candidate.clone(),
            count: ballots.iter().filter(|b| b.has_selected(candidate)).count() as i64,
        })
        .collect();

    Tally {
        poll_id: poll.id,
        counts,
        ballots: ballots.len(),
    }
}

impl PollEngine {
    /// Recomputes the tally from the poll's current ballots.
    pub async fn compute_tally(&self, poll_id: Uuid) -> PollResult<Tally> {
        let poll = self.require_poll(poll_id).await?;
        let ballots = self.store.ballots_for_poll(poll_id).await?;
        Ok(tally(&poll, &ballots))
    }

    /// Poll, tally and winners taken from the same ballot snapshot.
    pub async fn standings(&self, poll_id: Uuid) -> PollResult<Standings> {
        let poll = self.require_poll(poll_id).await?;
        let ballots = self.store.ballots_for_poll(poll_id).await?;
        let tally = tally(&poll, &ballots);
        let winners = super::resolve_winners(&tally);
        Ok(Standings {
            poll,
            tally,
            winners,
        })
    }
}
