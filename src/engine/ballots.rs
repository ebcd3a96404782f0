use std::collections::HashSet;

use uuid::Uuid;

use super::PollEngine;
use crate::{
    error::{PollError, PollResult},
    models::{Ballot, Poll, SelectionMode},
};

/// Checks every selection against the poll and returns the set in candidate
/// order, without duplicates.
fn normalize_selections(poll: &Poll, selections: &[String]) -> PollResult<Vec<String>> {
    let mut chosen = HashSet::with_capacity(selections.len());
    for selection in selections {
        let selection = selection.trim();
        if !poll.has_candidate(selection) {
            return Err(PollError::InvalidSelection(selection.to_string()));
        }
        chosen.insert(selection);
    }
    Ok(poll
        .candidates
        .iter()
        .filter(|c| chosen.contains(c.as_str()))
        .cloned()
        .collect())
}

/// Selections after toggling `candidate` on a ballot that currently holds
/// `current`.
fn toggled(current: &[String], candidate: &str, mode: SelectionMode) -> Vec<String> {
    if current.iter().any(|c| c == candidate) {
        return current
            .iter()
            .filter(|c| *c != candidate)
            .cloned()
            .collect();
    }
    match mode {
        SelectionMode::Multi => {
            let mut next = current.to_vec();
            next.push(candidate.to_string());
            next
        }
        SelectionMode::Single => vec![candidate.to_string()],
    }
}

impl PollEngine {
    /// Stores `selections` as the participant's ballot, replacing any earlier
    /// one. Casting the same selections again leaves the tally unchanged.
    pub async fn cast_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
        selections: &[String],
        mode: SelectionMode,
    ) -> PollResult<Ballot> {
        let poll = self.require_poll(poll_id).await?;
        let selections = normalize_selections(&poll, selections)?;
        if mode == SelectionMode::Single && selections.len() > 1 {
            return Err(PollError::TooManySelections);
        }

        let ballot = self
            .store
            .upsert_ballot(poll_id, participant_id, selections)
            .await?
            .ok_or(PollError::PollNotFound)?;
        log::info!(
            "ballot of {} on poll {} now selects {:?}",
            participant_id,
            poll_id,
            ballot.selections
        );
        Ok(ballot)
    }

    /// Flips `candidate` on the participant's ballot.
    ///
    /// A selected candidate is withdrawn, leaving the other selections as they
    /// are in either mode. An unselected one is added in `Multi` mode or
    /// replaces the whole selection in `Single` mode.
    pub async fn toggle_selection(
        &self,
        poll_id: Uuid,
        participant_id: &str,
        candidate: &str,
        mode: SelectionMode,
    ) -> PollResult<Ballot> {
        let poll = self.require_poll(poll_id).await?;
        let candidate = candidate.trim();
        if !poll.has_candidate(candidate) {
            return Err(PollError::InvalidSelection(candidate.to_string()));
        }

        let current = self
            .store
            .get_ballot(poll_id, participant_id)
            .await?
            .map(|b| b.selections)
            .unwrap_or_default();
        let withdrawing = current.iter().any(|c| c == candidate);
        let next = toggled(&current, candidate, mode);

        // a withdrawal only shrinks the ballot, so the single selection limit
        // does not apply to what is left
        let cast_mode = if withdrawing {
            SelectionMode::Multi
        } else {
            mode
        };
        self.cast_ballot(poll_id, participant_id, &next, cast_mode)
            .await
    }

    /// Empties the participant's ballot. The record stays, counting for nobody.
    pub async fn withdraw_ballot(&self, poll_id: Uuid, participant_id: &str) -> PollResult<Ballot> {
        self.cast_ballot(poll_id, participant_id, &[], SelectionMode::Multi)
            .await
    }

    pub async fn get_ballot(&self, poll_id: Uuid, participant_id: &str) -> PollResult<Ballot> {
        self.require_poll(poll_id).await?;
        self.store
            .get_ballot(poll_id, participant_id)
            .await?
            .ok_or(PollError::BallotNotFound)
    }

    pub async fn ballots_for_poll(&self, poll_id: Uuid) -> PollResult<Vec<Ballot>> {
        self.require_poll(poll_id).await?;
        Ok(self.store.ballots_for_poll(poll_id).await?)
    }

    pub async fn ballots_for_participant(&self, participant_id: &str) -> PollResult<Vec<Ballot>> {
        Ok(self.store.ballots_for_participant(participant_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{engine, standup, strings};

    #[actix_rt::test]
    async fn later_cast_replaces_earlier_one() {
        let engine = engine();
        let poll = standup(&engine).await;

        engine
            .cast_ballot(poll.id, "alice", &strings(&["Mon 9am"]), SelectionMode::Multi)
            .await
            .unwrap();
        engine
            .cast_ballot(poll.id, "alice", &strings(&["Tue 9am"]), SelectionMode::Multi)
            .await
            .unwrap();

        let ballots = engine.ballots_for_poll(poll.id).await.unwrap();
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots[0].participant_id, "alice");
        assert_eq!(ballots[0].selections, strings(&["Tue 9am"]));
    }

    #[actix_rt::test]
    async fn selections_are_trimmed_deduplicated_and_ordered() {
        let engine = engine();
        let poll = standup(&engine).await;

        let ballot = engine
            .cast_ballot(
                poll.id,
                "alice",
                &strings(&["Tue 9am", " Mon 9am", "Tue 9am "]),
                SelectionMode::Multi,
            )
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["Mon 9am", "Tue 9am"]));
    }

    #[actix_rt::test]
    async fn unknown_candidate_is_rejected_and_nothing_is_written() {
        let engine = engine();
        let poll = standup(&engine).await;

        let result = engine
            .cast_ballot(poll.id, "alice", &strings(&["Mon 9am", "Sun 3am"]), SelectionMode::Multi)
            .await;
        assert!(matches!(result, Err(PollError::InvalidSelection(c)) if c == "Sun 3am"));
        assert!(matches!(
            engine.get_ballot(poll.id, "alice").await,
            Err(PollError::BallotNotFound)
        ));
    }

    #[actix_rt::test]
    async fn cast_on_missing_poll_fails() {
        let engine = engine();
        let result = engine
            .cast_ballot(Uuid::new_v4(), "alice", &[], SelectionMode::Multi)
            .await;
        assert!(matches!(result, Err(PollError::PollNotFound)));
    }

    #[actix_rt::test]
    async fn single_mode_rejects_several_selections() {
        let engine = engine();
        let poll = standup(&engine).await;
        let result = engine
            .cast_ballot(poll.id, "alice", &strings(&["Mon 9am", "Tue 9am"]), SelectionMode::Single)
            .await;
        assert!(matches!(result, Err(PollError::TooManySelections)));
    }

    #[actix_rt::test]
    async fn multi_toggle_adds_and_withdraws() {
        let engine = engine();
        let poll = standup(&engine).await;

        let ballot = engine
            .toggle_selection(poll.id, "alice", "Mon 9am", SelectionMode::Multi)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["Mon 9am"]));

        let ballot = engine
            .toggle_selection(poll.id, "alice", "Tue 9am", SelectionMode::Multi)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["Mon 9am", "Tue 9am"]));

        let ballot = engine
            .toggle_selection(poll.id, "alice", "Mon 9am", SelectionMode::Multi)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["Tue 9am"]));
    }

    #[actix_rt::test]
    async fn single_toggle_replaces_and_withdraws() {
        let engine = engine();
        let poll = standup(&engine).await;

        engine
            .toggle_selection(poll.id, "alice", "Mon 9am", SelectionMode::Single)
            .await
            .unwrap();
        let ballot = engine
            .toggle_selection(poll.id, "alice", "Tue 9am", SelectionMode::Single)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["Tue 9am"]));

        let ballot = engine
            .toggle_selection(poll.id, "alice", "Tue 9am", SelectionMode::Single)
            .await
            .unwrap();
        assert!(ballot.is_abstention());
    }

    #[actix_rt::test]
    async fn single_toggle_withdraws_from_a_multi_select_ballot() {
        let engine = engine();
        let poll = engine
            .create_poll("Offsite", None, &strings(&["A", "B", "C"]), "organizer")
            .await
            .unwrap();
        engine
            .cast_ballot(poll.id, "alice", &strings(&["A", "B", "C"]), SelectionMode::Multi)
            .await
            .unwrap();

        let ballot = engine
            .toggle_selection(poll.id, "alice", "A", SelectionMode::Single)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["B", "C"]));

        // picking a new candidate in single mode still collapses the ballot
        let ballot = engine
            .toggle_selection(poll.id, "alice", "A", SelectionMode::Single)
            .await
            .unwrap();
        assert_eq!(ballot.selections, strings(&["A"]));
    }

    #[actix_rt::test]
    async fn cast_racing_a_delete_leaves_no_ballot() {
        let engine = engine();
        let poll = standup(&engine).await;
        engine.delete_poll(poll.id, "organizer").await.unwrap();

        // the write step of a cast whose poll lookup happened before the delete
        let written = engine
            .store()
            .upsert_ballot(poll.id, "alice", strings(&["Mon 9am"]))
            .await
            .unwrap();
        assert!(written.is_none());
        assert!(engine.ballots_for_participant("alice").await.unwrap().is_empty());

        let result = engine
            .cast_ballot(poll.id, "alice", &strings(&["Mon 9am"]), SelectionMode::Multi)
            .await;
        assert!(matches!(result, Err(PollError::PollNotFound)));
    }

    #[actix_rt::test]
    async fn toggle_unknown_candidate_fails() {
        let engine = engine();
        let poll = standup(&engine).await;
        let result = engine
            .toggle_selection(poll.id, "alice", "Sat 1am", SelectionMode::Multi)
            .await;
        assert!(matches!(result, Err(PollError::InvalidSelection(_))));
    }

    #[actix_rt::test]
    async fn withdraw_keeps_an_empty_ballot() {
        let engine = engine();
        let poll = standup(&engine).await;
        engine
            .cast_ballot(poll.id, "alice", &strings(&["Mon 9am"]), SelectionMode::Multi)
            .await
            .unwrap();

        engine.withdraw_ballot(poll.id, "alice").await.unwrap();

        let ballot = engine.get_ballot(poll.id, "alice").await.unwrap();
        assert!(ballot.is_abstention());
    }

    #[actix_rt::test]
    async fn participant_ballots_span_polls() {
        let engine = engine();
        let first = standup(&engine).await;
        let second = standup(&engine).await;
        engine
            .cast_ballot(first.id, "alice", &strings(&["Mon 9am"]), SelectionMode::Multi)
            .await
            .unwrap();
        engine
            .cast_ballot(second.id, "alice", &strings(&["Tue 9am"]), SelectionMode::Multi)
            .await
            .unwrap();
        engine
            .cast_ballot(second.id, "bob", &strings(&["Tue 9am"]), SelectionMode::Multi)
            .await
            .unwrap();

        let ballots = engine.ballots_for_participant("alice").await.unwrap();
        assert_eq!(ballots.len(), 2);
        assert!(ballots.iter().all(|b| b.participant_id == "alice"));
    }
}
