use async_trait::async_trait;
use sqlx::QueryBuilder;
use uuid::Uuid;

use super::{PollStore, StorageResult};
use crate::models::{Ballot, NewPoll, Poll};

const POLL_COLUMNS: &str = "id, title, description, candidates, owner_id, created_at";
const BALLOT_COLUMNS: &str = "poll_id, participant_id, selections, updated_at";

/// PostgreSQL backed store.
///
/// The `(poll_id, participant_id)` primary key of the `ballot` table is what
/// serializes concurrent writes of the same participant.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl PgStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool = sqlx::PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PollStore for PgStore {
    async fn insert_poll(&self, poll: NewPoll) -> StorageResult<Poll> {
        let mut query_builder = QueryBuilder::new(
            "insert into poll (id, title, description, candidates, owner_id) values (",
        );
        let mut separated = query_builder.separated(", ");
        separated.push_bind(Uuid::new_v4());
        separated.push_bind(poll.title);
        separated.push_bind(poll.description);
        separated.push_bind(poll.candidates);
        separated.push_bind(poll.owner_id);
        query_builder.push(format!(") returning {}", POLL_COLUMNS));

        let inserted = query_builder
            .build_query_as::<Poll>()
            .fetch_one(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn get_poll(&self, poll_id: Uuid) -> StorageResult<Option<Poll>> {
        let poll = sqlx::query_as::<_, Poll>(&format!(
            "select {} from poll where id = $1",
            POLL_COLUMNS
        ))
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(poll)
    }

    async fn list_polls(&self) -> StorageResult<Vec<Poll>> {
        let polls = sqlx::query_as::<_, Poll>(&format!(
            "select {} from poll order by created_at desc, id",
            POLL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(polls)
    }

    async fn delete_poll(&self, poll_id: Uuid) -> StorageResult<bool> {
        // the foreign key also cascades, ballots are removed first so the
        // cascade does not depend on the schema
        let mut transaction = self.pool.begin().await?;
        sqlx::query("delete from ballot where poll_id = $1")
            .bind(poll_id)
            .execute(transaction.as_mut())
            .await?;
        let deleted = sqlx::query("delete from poll where id = $1")
            .bind(poll_id)
            .execute(transaction.as_mut())
            .await?;
        transaction.commit().await?;

        let rows_affected = deleted.rows_affected();
        if rows_affected > 0 {
            log::info!("deleted poll {} from table poll", poll_id);
        }
        Ok(rows_affected > 0)
    }

    async fn upsert_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
        selections: Vec<String>,
    ) -> StorageResult<Option<Ballot>> {
        let upserted = sqlx::query_as::<_, Ballot>(&format!(
            r#"insert into ballot (poll_id, participant_id, selections) values ($1, $2, $3)
            on conflict (poll_id, participant_id)
            do update set selections = excluded.selections, updated_at = now()
            returning {}"#,
            BALLOT_COLUMNS
        ))
        .bind(poll_id)
        .bind(participant_id)
        .bind(selections)
        .fetch_one(&self.pool)
        .await;

        match upserted {
            Ok(ballot) => Ok(Some(ballot)),
            // the poll was deleted after the caller looked it up
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_ballot(
        &self,
        poll_id: Uuid,
        participant_id: &str,
    ) -> StorageResult<Option<Ballot>> {
        let ballot = sqlx::query_as::<_, Ballot>(&format!(
            "select {} from ballot where poll_id = $1 and participant_id = $2",
            BALLOT_COLUMNS
        ))
        .bind(poll_id)
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ballot)
    }

    async fn ballots_for_poll(&self, poll_id: Uuid) -> StorageResult<Vec<Ballot>> {
        let ballots = sqlx::query_as::<_, Ballot>(&format!(
            "select {} from ballot where poll_id = $1 order by participant_id",
            BALLOT_COLUMNS
        ))
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ballots)
    }

    async fn ballots_for_participant(&self, participant_id: &str) -> StorageResult<Vec<Ballot>> {
        let ballots = sqlx::query_as::<_, Ballot>(&format!(
            "select {} from ballot where participant_id = $1 order by updated_at desc",
            BALLOT_COLUMNS
        ))
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ballots)
    }
}
