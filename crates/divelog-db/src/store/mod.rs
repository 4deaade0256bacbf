//! The authoritative persistence seam for dive records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbResult;
use crate::model::dive::{DiveDraft, DivePatch, DiveRecord, NewDiveRecord, UpsertOutcome};

pub mod memory;
pub mod postgres;

pub use memory::MemoryDiveStore;
pub use postgres::PgDiveStore;

/// Persistence of dive records keyed by `(user_id, dive_number)`.
#[async_trait]
pub trait DiveRecordStore: Send + Sync {
    /// Point lookup by the natural key.
    async fn find_by_owner_and_number(
        &self,
        user_id: &str,
        dive_number: i32,
    ) -> DbResult<Option<DiveRecord>>;

    async fn find_by_id(&self, id: uuid::Uuid) -> DbResult<Option<DiveRecord>>;

    /// Inserts a new record and returns it as stored. Fails with
    /// `DbError::DuplicateKey` if the key exists.
    async fn insert(&self, record: NewDiveRecord) -> DbResult<DiveRecord>;

    /// Applies a changeset and returns the patched record. Fails with
    /// `DbError::NotFound` for an unknown ID.
    async fn patch(&self, id: uuid::Uuid, patch: DivePatch) -> DbResult<DiveRecord>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: uuid::Uuid) -> DbResult<bool>;

    async fn list_by_owner(&self, user_id: &str) -> DbResult<Vec<DiveRecord>>;

    /// ## Summary
    /// Inserts the draft if its key is new, otherwise patches the existing
    /// record. The outcome carries the record returned by the write itself.
    /// This default is a plain lookup followed by one write and is
    /// last-write-wins under concurrency; backends override it with an
    /// atomic version.
    ///
    /// ## Errors
    /// Propagates any lookup or write failure. Nothing is written when the
    /// lookup fails, and a failed write is the last step.
    async fn upsert(&self, draft: DiveDraft, now: DateTime<Utc>) -> DbResult<UpsertOutcome> {
        if let Some(existing) = self
            .find_by_owner_and_number(&draft.user_id, draft.dive_number)
            .await?
        {
            let record = self.patch(existing.id, draft.into_patch(now)).await?;
            return Ok(UpsertOutcome::updated(record));
        }

        let record = self
            .insert(draft.into_new_record(uuid::Uuid::now_v7(), now))
            .await?;
        Ok(UpsertOutcome::inserted(record))
    }
}
