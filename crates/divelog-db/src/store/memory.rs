use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::{DbError, DbResult};
use crate::model::dive::{DiveDraft, DivePatch, DiveRecord, NewDiveRecord, UpsertOutcome};
use crate::store::DiveRecordStore;

/// In-process store kept in insertion order. Used by tests and local runs
/// without a database.
#[derive(Default)]
pub struct MemoryDiveStore {
    records: Mutex<Vec<DiveRecord>>,
}

impl MemoryDiveStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all owners.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

fn position_of_key(records: &[DiveRecord], user_id: &str, dive_number: i32) -> Option<usize> {
    records
        .iter()
        .position(|r| r.user_id == user_id && r.dive_number == dive_number)
}

#[async_trait]
impl DiveRecordStore for MemoryDiveStore {
    async fn find_by_owner_and_number(
        &self,
        user_id: &str,
        dive_number: i32,
    ) -> DbResult<Option<DiveRecord>> {
        let records = self.records.lock().await;
        Ok(position_of_key(&records, user_id, dive_number).map(|i| records[i].clone()))
    }

    async fn find_by_id(&self, id: uuid::Uuid) -> DbResult<Option<DiveRecord>> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, record: NewDiveRecord) -> DbResult<DiveRecord> {
        let mut records = self.records.lock().await;

        if position_of_key(&records, &record.user_id, record.dive_number).is_some() {
            return Err(DbError::DuplicateKey {
                user_id: record.user_id,
                dive_number: record.dive_number,
            });
        }

        let stored = DiveRecord::from(record);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn patch(&self, id: uuid::Uuid, patch: DivePatch) -> DbResult<DiveRecord> {
        let mut records = self.records.lock().await;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DbError::NotFound(format!("dive {id}")))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn list_by_owner(&self, user_id: &str) -> DbResult<Vec<DiveRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Holds the lock across lookup and write so concurrent upserts of one
    /// key serialize.
    #[tracing::instrument(skip(self, draft), fields(user_id = %draft.user_id, dive_number = draft.dive_number))]
    async fn upsert(&self, draft: DiveDraft, now: DateTime<Utc>) -> DbResult<UpsertOutcome> {
        let mut records = self.records.lock().await;

        if let Some(i) = position_of_key(&records, &draft.user_id, draft.dive_number) {
            let record = &mut records[i];
            record.apply_patch(draft.into_patch(now));
            return Ok(UpsertOutcome::updated(record.clone()));
        }

        let stored = DiveRecord::from(draft.into_new_record(uuid::Uuid::now_v7(), now));
        records.push(stored.clone());
        Ok(UpsertOutcome::inserted(stored))
    }
}
