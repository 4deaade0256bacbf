use std::sync::Arc;

use divelog_core::clock::Clock;
use divelog_db::model::dive::{DiveRecord, UpsertAction};
use divelog_db::store::DiveRecordStore;
use serde::Serialize;

use crate::dive::submission::DiveSubmission;
use crate::error::{ServiceError, ServiceResult};

/// Result of an upsert: what happened, the storage ID and the stored record.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertedDive {
    pub outcome: UpsertAction,
    pub id: uuid::Uuid,
    pub dive: DiveRecord,
}

/// Validation followed by the keyed insert-or-patch of a dive record.
#[derive(Clone)]
pub struct DiveUpsertWorkflow {
    store: Arc<dyn DiveRecordStore>,
    clock: Arc<dyn Clock>,
}

impl DiveUpsertWorkflow {
    #[must_use]
    pub fn new(store: Arc<dyn DiveRecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// ## Summary
    /// Validates the submission and inserts it, or patches the record that
    /// already holds its `(user_id, dive_number)`. A patch overwrites only
    /// the supplied fields, keeps `logged_at` and advances `updated_at`.
    ///
    /// ## Side Effects
    /// Exactly one store write on success, none on failure.
    ///
    /// ## Errors
    /// `ServiceError::ValidationError` listing every offending field, or
    /// `ServiceError::StoreUnavailable` if the store fails.
    #[tracing::instrument(skip_all, fields(user_id, dive_number, outcome))]
    pub async fn upsert(&self, submission: DiveSubmission) -> ServiceResult<UpsertedDive> {
        let draft = submission.validate().inspect_err(|errors| {
            tracing::debug!(%errors, "Rejected dive submission");
        })?;

        let span = tracing::Span::current();
        span.record("user_id", draft.user_id.as_str());
        span.record("dive_number", draft.dive_number);

        let now = self.clock.now();
        let outcome = self.store.upsert(draft, now).await?;
        span.record("outcome", tracing::field::debug(outcome.action));

        tracing::info!(id = %outcome.id, "Dive upserted");

        Ok(UpsertedDive {
            outcome: outcome.action,
            id: outcome.id,
            dive: outcome.record,
        })
    }

    /// ## Errors
    /// `ServiceError::NotFound` for an unknown storage ID.
    pub async fn get(&self, id: uuid::Uuid) -> ServiceResult<DiveRecord> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Dive with id '{id}' not found")))
    }

    /// ## Errors
    /// `ServiceError::NotFound` when the owner has no dive with that number.
    pub async fn get_by_key(&self, user_id: &str, dive_number: i32) -> ServiceResult<DiveRecord> {
        self.store
            .find_by_owner_and_number(user_id, dive_number)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Dive {dive_number} not found for user '{user_id}'"
                ))
            })
    }

    /// ## Errors
    /// `ServiceError::StoreUnavailable` if the store fails.
    pub async fn list(&self, user_id: &str) -> ServiceResult<Vec<DiveRecord>> {
        Ok(self.store.list_by_owner(user_id).await?)
    }

    /// Removes a dive. Its photo is left in the photo store.
    ///
    /// ## Errors
    /// `ServiceError::NotFound` for an unknown storage ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: uuid::Uuid) -> ServiceResult<()> {
        if self.store.delete(id).await? {
            tracing::info!("Dive deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "Dive with id '{id}' not found"
            )))
        }
    }
}
