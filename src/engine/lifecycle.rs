use uuid::Uuid;

use super::PollEngine;
use crate::{
    error::{PollError, PollResult, ValidationError},
    models::{NewPoll, Poll},
};

pub const MIN_CANDIDATES: usize = 2;
pub const MAX_CANDIDATES: usize = 5;

/// Trims the input and checks the shape of a poll before it is stored.
///
/// Blank candidates are dropped and duplicates collapse onto their first
/// occurrence, so the bounds apply to the distinct labels that remain.
pub fn validate_new_poll(
    title: &str,
    description: Option<&str>,
    candidates: &[String],
    owner_id: &str,
) -> Result<NewPoll, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    let mut distinct: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() || distinct.iter().any(|c| c == candidate) {
            continue;
        }
        distinct.push(candidate.to_string());
    }

    if distinct.len() < MIN_CANDIDATES {
        return Err(ValidationError::TooFewCandidates {
            count: distinct.len(),
            min: MIN_CANDIDATES,
        });
    }
    if distinct.len() > MAX_CANDIDATES {
        return Err(ValidationError::TooManyCandidates {
            count: distinct.len(),
            max: MAX_CANDIDATES,
        });
    }

    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(NewPoll {
        title: title.to_string(),
        description,
        candidates: distinct,
        owner_id: owner_id.to_string(),
    })
}

impl PollEngine {
    pub async fn create_poll(
        &self,
        title: &str,
        description: Option<&str>,
        candidates: &[String],
        owner_id: &str,
    ) -> PollResult<Poll> {
        let new_poll = validate_new_poll(title, description, candidates, owner_id)?;
        let poll = self.store.insert_poll(new_poll).await?;
        log::info!(
            "created poll {} with {} candidates for {}",
            poll.id,
            poll.candidates.len(),
            poll.owner_id
        );
        Ok(poll)
    }

    pub async fn get_poll(&self, poll_id: Uuid) -> PollResult<Poll> {
        log::debug!("looking up poll {}", poll_id);
        self.require_poll(poll_id).await
    }

    pub async fn list_polls(&self) -> PollResult<Vec<Poll>> {
        Ok(self.store.list_polls().await?)
    }

    /// Deletes the poll and its ballots.
    ///
    /// Any requester may delete; `requester_id` is only recorded in the log.
    pub async fn delete_poll(&self, poll_id: Uuid, requester_id: &str) -> PollResult<()> {
        if !self.store.delete_poll(poll_id).await? {
            return Err(PollError::PollNotFound);
        }
        log::info!("poll {} deleted by {}", poll_id, requester_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{engine, standup, strings};

    #[test]
    fn rejects_blank_title() {
        let result = validate_new_poll("   ", None, &strings(&["a", "b"]), "owner");
        assert_eq!(result, Err(ValidationError::MissingTitle));
    }

    #[test]
    fn counts_distinct_non_blank_candidates() {
        let result = validate_new_poll("Lunch", None, &strings(&["Fri", " Fri ", "", "  "]), "owner");
        assert_eq!(
            result,
            Err(ValidationError::TooFewCandidates { count: 1, min: 2 })
        );

        let six = strings(&["1", "2", "3", "4", "5", "6"]);
        assert_eq!(
            validate_new_poll("Lunch", None, &six, "owner"),
            Err(ValidationError::TooManyCandidates { count: 6, max: 5 })
        );

        // duplicates do not push a poll over the limit
        let padded = strings(&["1", "2", "3", "4", "5", "5"]);
        let poll = validate_new_poll("Lunch", None, &padded, "owner").unwrap();
        assert_eq!(poll.candidates.len(), 5);
    }

    #[test]
    fn trims_fields_and_keeps_first_occurrence_order() {
        let poll = validate_new_poll(
            "  Retro ",
            Some("   "),
            &strings(&[" Thu 2pm", "Wed 4pm", "Thu 2pm "]),
            "owner",
        )
        .unwrap();
        assert_eq!(poll.title, "Retro");
        assert_eq!(poll.description, None);
        assert_eq!(poll.candidates, strings(&["Thu 2pm", "Wed 4pm"]));
    }

    #[actix_rt::test]
    async fn create_then_get_and_list() {
        let engine = engine();
        let poll = standup(&engine).await;
        assert_eq!(poll.owner_id, "organizer");

        assert_eq!(engine.get_poll(poll.id).await.unwrap(), poll);
        assert_eq!(engine.list_polls().await.unwrap(), vec![poll]);
    }

    #[actix_rt::test]
    async fn invalid_poll_is_not_stored() {
        let engine = engine();
        let result = engine
            .create_poll("Solo", None, &strings(&["Mon 9am"]), "organizer")
            .await;
        assert!(matches!(
            result,
            Err(PollError::Validation(ValidationError::TooFewCandidates { .. }))
        ));
        assert!(engine.list_polls().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn delete_unknown_poll_is_not_found() {
        let engine = engine();
        let result = engine.delete_poll(Uuid::new_v4(), "someone").await;
        assert!(matches!(result, Err(PollError::PollNotFound)));
    }

    #[actix_rt::test]
    async fn any_requester_may_delete() {
        let engine = engine();
        let poll = standup(&engine).await;
        engine.delete_poll(poll.id, "not-the-owner").await.unwrap();
        assert!(matches!(
            engine.get_poll(poll.id).await,
            Err(PollError::PollNotFound)
        ));
    }
}
