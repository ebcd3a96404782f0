use uuid::Uuid;

use super::PollEngine;
use crate::{error::PollResult, models::Tally};

/// Candidates tied for the highest count, in candidate order.
///
/// Empty while no candidate has any support. Ties are returned whole, no
/// candidate is preferred over another.
pub fn resolve_winners(tally: &Tally) -> Vec<String> {
    let max_count = tally.max_count();
    if max_count == 0 {
        return Vec::new();
    }
    tally
        .counts
        .iter()
        .filter(|c| c.count == max_count)
        .map(|c| c.candidate.clone())
        .collect()
}

impl PollEngine {
    pub async fn winners(&self, poll_id: Uuid) -> PollResult<Vec<String>> {
        let tally = self.compute_tally(poll_id).await?;
        Ok(resolve_winners(&tally))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::test_support::{engine, standup},
        models::CandidateCount,
    };

    fn tally_of(counts: &[(&str, i64)]) -> Tally {
        Tally {
            poll_id: Uuid::nil(),
            counts: counts
                .iter()
                .map(|(candidate, count)| CandidateCount {
                    candidate: candidate.to_string(),
                    count: *count,
                })
                .collect(),
            ballots: 0,
        }
    }

    #[test]
    fn ties_are_all_reported() {
        let tally = tally_of(&[("X", 3), ("Y", 3), ("Z", 1)]);
        assert_eq!(resolve_winners(&tally), vec!["X", "Y"]);
    }

    #[test]
    fn single_leader() {
        let tally = tally_of(&[("X", 0), ("Y", 2), ("Z", 1)]);
        assert_eq!(resolve_winners(&tally), vec!["Y"]);
    }

    #[test]
    fn no_support_means_no_winner() {
        let tally = tally_of(&[("X", 0), ("Y", 0)]);
        assert!(resolve_winners(&tally).is_empty());
    }

    #[actix_rt::test]
    async fn fresh_poll_has_no_winner() {
        let engine = engine();
        let poll = standup(&engine).await;
        assert!(engine.winners(poll.id).await.unwrap().is_empty());
    }
}
