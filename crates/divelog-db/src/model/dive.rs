use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::{
    enums::{DiveMode, WaterType},
    schema,
};

/// One logged dive, keyed by `(user_id, dive_number)`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::dive)]
#[diesel(check_for_backend(Pg))]
pub struct DiveRecord {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub dive_number: i32,
    pub dive_date: DateTime<Utc>,
    pub location: String,
    pub duration: f64,
    pub max_depth: f64,
    pub water_type: WaterType,
    pub mode: DiveMode,
    pub club_name: String,
    pub instructor_name: String,
    pub photo_storage_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub osm_link: Option<String>,
    pub site: Option<String>,
    pub water_temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub weather: Option<String>,
    pub suit_thickness: Option<f64>,
    pub lead_weights: Option<f64>,
    pub club_website: Option<String>,
    pub notes: Option<String>,
    pub buddy_ids: Vec<String>,
    pub equipment: Vec<String>,
    pub buddy_check: bool,
    pub briefed: bool,
    pub logged_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for creating new dive records
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::dive)]
pub struct NewDiveRecord {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub dive_number: i32,
    pub dive_date: DateTime<Utc>,
    pub location: String,
    pub duration: f64,
    pub max_depth: f64,
    pub water_type: WaterType,
    pub mode: DiveMode,
    pub club_name: String,
    pub instructor_name: String,
    pub photo_storage_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub osm_link: Option<String>,
    pub site: Option<String>,
    pub water_temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub weather: Option<String>,
    pub suit_thickness: Option<f64>,
    pub lead_weights: Option<f64>,
    pub club_website: Option<String>,
    pub notes: Option<String>,
    pub buddy_ids: Vec<String>,
    pub equipment: Vec<String>,
    pub buddy_check: bool,
    pub briefed: bool,
    pub logged_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied to an existing dive. `None` fields are left untouched;
/// the natural key and `logged_at` are never part of a patch.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = schema::dive)]
pub struct DivePatch {
    pub dive_date: DateTime<Utc>,
    pub location: String,
    pub duration: f64,
    pub max_depth: f64,
    pub water_type: WaterType,
    pub mode: Option<DiveMode>,
    pub club_name: String,
    pub instructor_name: String,
    pub photo_storage_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub osm_link: Option<String>,
    pub site: Option<String>,
    pub water_temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub weather: Option<String>,
    pub suit_thickness: Option<f64>,
    pub lead_weights: Option<f64>,
    pub club_website: Option<String>,
    pub notes: Option<String>,
    pub buddy_ids: Option<Vec<String>>,
    pub equipment: Option<Vec<String>>,
    pub buddy_check: Option<bool>,
    pub briefed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

/// Validated dive fields handed to a store, without bookkeeping timestamps.
/// Optional fields that are `None` were not supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DiveDraft {
    pub user_id: String,
    pub dive_number: i32,
    pub dive_date: DateTime<Utc>,
    pub location: String,
    pub duration: f64,
    pub max_depth: f64,
    pub water_type: WaterType,
    pub mode: Option<DiveMode>,
    pub club_name: String,
    pub instructor_name: String,
    pub photo_storage_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub osm_link: Option<String>,
    pub site: Option<String>,
    pub water_temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub weather: Option<String>,
    pub suit_thickness: Option<f64>,
    pub lead_weights: Option<f64>,
    pub club_website: Option<String>,
    pub notes: Option<String>,
    pub buddy_ids: Option<Vec<String>>,
    pub equipment: Option<Vec<String>>,
    pub buddy_check: Option<bool>,
    pub briefed: Option<bool>,
}

impl DiveDraft {
    /// ## Summary
    /// Builds the row for a first submission of this key, stamping both
    /// bookkeeping timestamps with `now`.
    #[must_use]
    pub fn into_new_record(self, id: uuid::Uuid, now: DateTime<Utc>) -> NewDiveRecord {
        NewDiveRecord {
            id,
            user_id: self.user_id,
            dive_number: self.dive_number,
            dive_date: self.dive_date,
            location: self.location,
            duration: self.duration,
            max_depth: self.max_depth,
            water_type: self.water_type,
            mode: self.mode.unwrap_or_default(),
            club_name: self.club_name,
            instructor_name: self.instructor_name,
            photo_storage_id: self.photo_storage_id,
            latitude: self.latitude,
            longitude: self.longitude,
            osm_link: self.osm_link,
            site: self.site,
            water_temperature: self.water_temperature,
            visibility: self.visibility,
            weather: self.weather,
            suit_thickness: self.suit_thickness,
            lead_weights: self.lead_weights,
            club_website: self.club_website,
            notes: self.notes,
            buddy_ids: self.buddy_ids.unwrap_or_default(),
            equipment: self.equipment.unwrap_or_default(),
            buddy_check: self.buddy_check.unwrap_or(true),
            briefed: self.briefed.unwrap_or(true),
            logged_at: now,
            updated_at: now,
        }
    }

    /// ## Summary
    /// Builds the changeset applied when the key already exists.
    #[must_use]
    pub fn into_patch(self, now: DateTime<Utc>) -> DivePatch {
        DivePatch {
            dive_date: self.dive_date,
            location: self.location,
            duration: self.duration,
            max_depth: self.max_depth,
            water_type: self.water_type,
            mode: self.mode,
            club_name: self.club_name,
            instructor_name: self.instructor_name,
            photo_storage_id: self.photo_storage_id,
            latitude: self.latitude,
            longitude: self.longitude,
            osm_link: self.osm_link,
            site: self.site,
            water_temperature: self.water_temperature,
            visibility: self.visibility,
            weather: self.weather,
            suit_thickness: self.suit_thickness,
            lead_weights: self.lead_weights,
            club_website: self.club_website,
            notes: self.notes,
            buddy_ids: self.buddy_ids,
            equipment: self.equipment,
            buddy_check: self.buddy_check,
            briefed: self.briefed,
            updated_at: now,
        }
    }
}

impl From<NewDiveRecord> for DiveRecord {
    fn from(new: NewDiveRecord) -> Self {
        Self {
            id: new.id,
            user_id: new.user_id,
            dive_number: new.dive_number,
            dive_date: new.dive_date,
            location: new.location,
            duration: new.duration,
            max_depth: new.max_depth,
            water_type: new.water_type,
            mode: new.mode,
            club_name: new.club_name,
            instructor_name: new.instructor_name,
            photo_storage_id: new.photo_storage_id,
            latitude: new.latitude,
            longitude: new.longitude,
            osm_link: new.osm_link,
            site: new.site,
            water_temperature: new.water_temperature,
            visibility: new.visibility,
            weather: new.weather,
            suit_thickness: new.suit_thickness,
            lead_weights: new.lead_weights,
            club_website: new.club_website,
            notes: new.notes,
            buddy_ids: new.buddy_ids,
            equipment: new.equipment,
            buddy_check: new.buddy_check,
            briefed: new.briefed,
            logged_at: new.logged_at,
            updated_at: new.updated_at,
        }
    }
}

impl DiveRecord {
    /// ## Summary
    /// Applies a changeset in memory with the same semantics as the SQL
    /// `UPDATE`: supplied fields overwrite, `None` fields are kept.
    pub fn apply_patch(&mut self, patch: DivePatch) {
        fn keep_or<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        fn keep_or_some<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        self.dive_date = patch.dive_date;
        self.location = patch.location;
        self.duration = patch.duration;
        self.max_depth = patch.max_depth;
        self.water_type = patch.water_type;
        keep_or(&mut self.mode, patch.mode);
        self.club_name = patch.club_name;
        self.instructor_name = patch.instructor_name;
        self.photo_storage_id = patch.photo_storage_id;
        keep_or_some(&mut self.latitude, patch.latitude);
        keep_or_some(&mut self.longitude, patch.longitude);
        keep_or_some(&mut self.osm_link, patch.osm_link);
        keep_or_some(&mut self.site, patch.site);
        keep_or_some(&mut self.water_temperature, patch.water_temperature);
        keep_or_some(&mut self.visibility, patch.visibility);
        keep_or_some(&mut self.weather, patch.weather);
        keep_or_some(&mut self.suit_thickness, patch.suit_thickness);
        keep_or_some(&mut self.lead_weights, patch.lead_weights);
        keep_or_some(&mut self.club_website, patch.club_website);
        keep_or_some(&mut self.notes, patch.notes);
        keep_or(&mut self.buddy_ids, patch.buddy_ids);
        keep_or(&mut self.equipment, patch.equipment);
        keep_or(&mut self.buddy_check, patch.buddy_check);
        keep_or(&mut self.briefed, patch.briefed);
        self.updated_at = patch.updated_at;
    }
}

/// Whether an upsert created a new record or patched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

/// Result of an upsert: the action taken and the record as stored by the
/// same write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub id: uuid::Uuid,
    pub record: DiveRecord,
}

impl UpsertOutcome {
    #[must_use]
    pub fn inserted(record: DiveRecord) -> Self {
        Self {
            action: UpsertAction::Inserted,
            id: record.id,
            record,
        }
    }

    #[must_use]
    pub fn updated(record: DiveRecord) -> Self {
        Self {
            action: UpsertAction::Updated,
            id: record.id,
            record,
        }
    }
}
