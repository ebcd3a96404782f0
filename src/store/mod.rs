//! Storage collaborator for polls and ballots.
//!
//! Implementations must apply [`PollStore::upsert_ballot`] atomically per
//! `(poll_id, participant_id)` key and must remove a poll's ballots together
//! with the poll in [`PollStore::delete_poll`]. Snapshots returned by the
//! listing methods are read in one step so they never mix two states.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Ballot, NewPoll, Poll};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, poll: NewPoll) -> StorageResult<Poll>;

    async fn get_poll(&self, poll_id: Uuid) -> StorageResult<Option<Poll>>;

    /// All polls, newest first.
    async fn list_polls(&self) -> StorageResult<Vec<Poll>>;

    /// Deletes the poll and every ballot keyed to it.
    /// Returns `false` when no such poll existed.
    async fn delete_poll(&self, poll_id: Uuid) -> StorageResult<bool>;

    /// Inserts the ballot or replaces the stored one wholesale.
    ///
    /// Returns `None` and writes nothing when the poll does not exist at the
    /// moment of the write, so a ballot can never outlive its poll.
    async fn upsert_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
        selections: Vec<String>,
    ) -> StorageResult<Option<Ballot>>;

    async fn get_ballot(&self, poll_id: Uuid, participant_id: &str)
        -> StorageResult<Option<Ballot>>;

    async fn ballots_for_poll(&self, poll_id: Uuid) -> StorageResult<Vec<Ballot>>;

    async fn ballots_for_participant(&self, participant_id: &str) -> StorageResult<Vec<Ballot>>;
}
