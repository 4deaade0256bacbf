use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::db::{
    DbProvider, connection::DbPool, query, schema::dive, transaction::with_transaction,
};
use crate::error::{DbError, DbResult};
use crate::model::dive::{DiveDraft, DivePatch, DiveRecord, NewDiveRecord, UpsertOutcome};
use crate::store::DiveRecordStore;

/// `PostgreSQL` backed store.
#[derive(Clone)]
pub struct PgDiveStore {
    pool: DbPool,
}

impl PgDiveStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiveRecordStore for PgDiveStore {
    #[tracing::instrument(skip(self))]
    async fn find_by_owner_and_number(
        &self,
        user_id: &str,
        dive_number: i32,
    ) -> DbResult<Option<DiveRecord>> {
        let mut conn = self.pool.get_connection().await?;

        Ok(query::dive::by_owner_and_number(user_id, dive_number)
            .select(DiveRecord::as_select())
            .first::<DiveRecord>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: uuid::Uuid) -> DbResult<Option<DiveRecord>> {
        let mut conn = self.pool.get_connection().await?;

        Ok(query::dive::by_id(id)
            .select(DiveRecord::as_select())
            .first::<DiveRecord>(&mut conn)
            .await
            .optional()?)
    }

    #[tracing::instrument(skip(self, record), fields(user_id = %record.user_id, dive_number = record.dive_number))]
    async fn insert(&self, record: NewDiveRecord) -> DbResult<DiveRecord> {
        let mut conn = self.pool.get_connection().await?;

        diesel::insert_into(dive::table)
            .values(&record)
            .returning(DiveRecord::as_returning())
            .get_result::<DiveRecord>(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => DbError::DuplicateKey {
                    user_id: record.user_id.clone(),
                    dive_number: record.dive_number,
                },
                other => DbError::DatabaseError(other),
            })
    }

    #[tracing::instrument(skip(self, patch))]
    async fn patch(&self, id: uuid::Uuid, patch: DivePatch) -> DbResult<DiveRecord> {
        let mut conn = self.pool.get_connection().await?;

        diesel::update(dive::table.find(id))
            .set(&patch)
            .returning(DiveRecord::as_returning())
            .get_result::<DiveRecord>(&mut conn)
            .await
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("dive {id}")))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: uuid::Uuid) -> DbResult<bool> {
        let mut conn = self.pool.get_connection().await?;

        let deleted = diesel::delete(dive::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(deleted > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_owner(&self, user_id: &str) -> DbResult<Vec<DiveRecord>> {
        let mut conn = self.pool.get_connection().await?;

        Ok(query::dive::by_owner(user_id)
            .select(DiveRecord::as_select())
            .load::<DiveRecord>(&mut conn)
            .await?)
    }

    /// ## Summary
    /// Lookup and write in one transaction. The existing row is locked with
    /// `FOR UPDATE`; an insert that loses a race on the unique key falls back
    /// to patching the winner's row.
    ///
    /// ## Errors
    /// Returns a database or pool error; the transaction is rolled back.
    #[tracing::instrument(skip(self, draft), fields(user_id = %draft.user_id, dive_number = draft.dive_number))]
    async fn upsert(&self, draft: DiveDraft, now: DateTime<Utc>) -> DbResult<UpsertOutcome> {
        let mut conn = self.pool.get_connection().await?;

        with_transaction(&mut conn, move |tx| {
            async move {
                let existing = dive::table
                    .filter(dive::user_id.eq(&draft.user_id))
                    .filter(dive::dive_number.eq(draft.dive_number))
                    .select(dive::id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .await
                    .optional()?;

                if let Some(id) = existing {
                    let record = diesel::update(dive::table.find(id))
                        .set(&draft.into_patch(now))
                        .returning(DiveRecord::as_returning())
                        .get_result::<DiveRecord>(tx)
                        .await?;
                    return Ok(UpsertOutcome::updated(record));
                }

                let user_id = draft.user_id.clone();
                let dive_number = draft.dive_number;
                let patch = draft.clone().into_patch(now);
                let new_record = draft.into_new_record(uuid::Uuid::now_v7(), now);

                let inserted = diesel::insert_into(dive::table)
                    .values(&new_record)
                    .on_conflict((dive::user_id, dive::dive_number))
                    .do_nothing()
                    .returning(DiveRecord::as_returning())
                    .get_result::<DiveRecord>(tx)
                    .await
                    .optional()?;

                if let Some(record) = inserted {
                    return Ok(UpsertOutcome::inserted(record));
                }

                tracing::debug!("Concurrent insert won the key, patching instead");

                let id = dive::table
                    .filter(dive::user_id.eq(&user_id))
                    .filter(dive::dive_number.eq(dive_number))
                    .select(dive::id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .await?;

                let record = diesel::update(dive::table.find(id))
                    .set(&patch)
                    .returning(DiveRecord::as_returning())
                    .get_result::<DiveRecord>(tx)
                    .await?;

                Ok(UpsertOutcome::updated(record))
            }
            .scope_boxed()
        })
        .await
    }
}
