use std::{
    collections::{BTreeMap, HashMap},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{PollStore, StorageError, StorageResult};
use crate::models::{Ballot, NewPoll, Poll};

#[derive(Debug, Default)]
struct Tables {
    polls: HashMap<Uuid, Poll>,
    // keyed by (poll_id, participant_id) so a poll's ballots form one range
    ballots: BTreeMap<(Uuid, String), Ballot>,
}

/// Process-local store, used when no database is configured and in tests.
///
/// Both tables sit behind a single lock, so a cascade delete and a ballot
/// snapshot can never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StorageError::Poisoned)
    }
}

fn poll_range(poll_id: Uuid) -> std::ops::RangeFrom<(Uuid, String)> {
    (poll_id, String::new())..
}

#[async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, poll: NewPoll) -> StorageResult<Poll> {
        let poll = Poll {
            id: Uuid::new_v4(),
            title: poll.title,
            description: poll.description,
            candidates: poll.candidates,
            owner_id: poll.owner_id,
            created_at: chrono::Utc::now(),
        };
        self.write()?.polls.insert(poll.id, poll.clone());
        Ok(poll)
    }

    async fn get_poll(&self, poll_id: Uuid) -> StorageResult<Option<Poll>> {
        Ok(self.read()?.polls.get(&poll_id).cloned())
    }

    async fn list_polls(&self) -> StorageResult<Vec<Poll>> {
        let mut polls: Vec<Poll> = self.read()?.polls.values().cloned().collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(polls)
    }

    async fn delete_poll(&self, poll_id: Uuid) -> StorageResult<bool> {
        let mut tables = self.write()?;
        if tables.polls.remove(&poll_id).is_none() {
            return Ok(false);
        }
        tables.ballots.retain(|(id, _), _| *id != poll_id);
        Ok(true)
    }

    async fn upsert_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
        selections: Vec<String>,
    ) -> StorageResult<Option<Ballot>> {
        let mut tables = self.write()?;
        if !tables.polls.contains_key(&poll_id) {
            return Ok(None);
        }
        let ballot = Ballot {
            poll_id,
            participant_id: participant_id.to_string(),
            selections,
            updated_at: chrono::Utc::now(),
        };
        tables
            .ballots
            .insert((poll_id, participant_id.to_string()), ballot.clone());
        Ok(Some(ballot))
    }

    async fn get_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
    ) -> StorageResult<Option<Ballot>> {
        Ok(self
            .read()?
            .ballots
            .get(&(poll_id, participant_id.to_string()))
            .cloned())
    }

    async fn ballots_for_poll(&self, poll_id: Uuid) -> StorageResult<Vec<Ballot>> {
        Ok(self
            .read()?
            .ballots
            .range(poll_range(poll_id))
            .take_while(|((id, _), _)| *id == poll_id)
            .map(|(_, ballot)| ballot.clone())
            .collect())
    }

    async fn ballots_for_participant(&self, participant_id: &str) -> StorageResult<Vec<Ballot>> {
        Ok(self
            .read()?
            .ballots
            .values()
            .filter(|b| b.participant_id == participant_id)
            .cloned()
            .collect())
    }
}
