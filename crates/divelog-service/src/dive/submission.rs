use chrono::{DateTime, NaiveDate, Utc};
use divelog_core::types;
use divelog_db::db::enums::{DiveMode, WaterType};
use divelog_db::model::dive::DiveDraft;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dive::validation::ValidationErrors;
use crate::photo::StorageId;

/// Placeholder reference used to validate a submission whose photo has not
/// been uploaded yet.
const PENDING_PHOTO: &str = "pending";

/// Keys a submission reads, mapped to the field they fill.
const SUBMISSION_KEYS: [(&str, &str); 29] = [
    ("user_id", "user_id"),
    ("dive_number", "dive_number"),
    ("dive_date", "dive_date"),
    ("location", "location"),
    ("duration", "duration"),
    ("max_depth", "max_depth"),
    ("water_type", "water_type"),
    ("mode", "mode"),
    ("club_name", "club_name"),
    ("instructor_name", "instructor_name"),
    ("photo_storage_id", "photo_storage_id"),
    ("latitude", "latitude"),
    ("longitude", "longitude"),
    ("osm_link", "osm_link"),
    ("site", "site"),
    ("water_temperature", "water_temperature"),
    ("temperature", "water_temperature"),
    ("visibility", "visibility"),
    ("weather", "weather"),
    ("suit_thickness", "suit_thickness"),
    ("lead_weights", "lead_weights"),
    ("club_website", "club_website"),
    ("notes", "notes"),
    ("buddy_ids", "buddy_ids"),
    ("equipment", "equipment"),
    ("buddy_check", "buddy_check"),
    ("Buddy_check", "buddy_check"),
    ("briefed", "briefed"),
    ("Briefed", "briefed"),
];

/// Why a submission body could not be read.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Not a JSON object at all.
    #[error("{0}")]
    Malformed(String),

    /// A JSON object with values of the wrong type.
    #[error("Invalid dive data: {0}")]
    Invalid(ValidationErrors),
}

/// A dive date as clients send it: epoch seconds or a date string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DiveDateInput {
    Epoch(i64),
    Text(String),
}

impl DiveDateInput {
    /// ## Summary
    /// Accepts epoch seconds, `YYYY-MM-DD` (midnight UTC) or an RFC 3339
    /// timestamp.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(seconds) => DateTime::from_timestamp(*seconds, 0),
            Self::Text(text) => {
                let text = text.trim();
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|midnight| midnight.and_utc())
                    .or_else(|| {
                        DateTime::parse_from_rfc3339(text)
                            .ok()
                            .map(|dt| dt.with_timezone(&Utc))
                    })
            }
        }
    }
}

/// Dive fields as received from a client. Every field is optional here so
/// that validation can report all missing and malformed fields at once.
/// Bookkeeping timestamps are not part of a submission and are ignored if
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiveSubmission {
    pub user_id: Option<String>,
    pub dive_number: Option<i64>,
    pub dive_date: Option<DiveDateInput>,
    pub location: Option<String>,
    pub duration: Option<f64>,
    pub max_depth: Option<f64>,
    pub water_type: Option<String>,
    pub mode: Option<String>,
    pub club_name: Option<String>,
    pub instructor_name: Option<String>,
    pub photo_storage_id: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub osm_link: Option<String>,
    pub site: Option<String>,
    #[serde(alias = "temperature")]
    pub water_temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub weather: Option<String>,
    pub suit_thickness: Option<f64>,
    pub lead_weights: Option<f64>,
    pub club_website: Option<String>,
    pub notes: Option<String>,
    pub buddy_ids: Option<Vec<String>>,
    pub equipment: Option<Vec<String>>,
    #[serde(alias = "Buddy_check")]
    pub buddy_check: Option<bool>,
    #[serde(alias = "Briefed")]
    pub briefed: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Positive,
    NonNegative,
    Within(f64, f64),
    Finite,
}

impl Bound {
    fn check(self, value: f64) -> Option<String> {
        if !value.is_finite() {
            return Some("must be a finite number".to_string());
        }
        match self {
            Self::Positive if value <= 0.0 => Some("must be greater than 0".to_string()),
            Self::NonNegative if value < 0.0 => Some("must not be negative".to_string()),
            Self::Within(min, max) if !(min..=max).contains(&value) => {
                Some(format!("must be between {min} and {max}"))
            }
            _ => None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
) -> Option<String> {
    let value = non_blank(value);
    if value.is_none() {
        errors.push(field, "is required");
    }
    value
}

fn checked_number(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<f64>,
    bound: Bound,
) -> Option<f64> {
    let value = value?;
    match bound.check(value) {
        Some(message) => {
            errors.push(field, message);
            None
        }
        None => Some(value),
    }
}

fn required_number(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<f64>,
    bound: Bound,
) -> Option<f64> {
    if value.is_none() {
        errors.push(field, "is required");
    }
    checked_number(errors, field, value, bound)
}

/// Deserializes each known key on its own to find the ones that fail.
fn mistyped_fields(object: &Map<String, Value>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for (key, field) in SUBMISSION_KEYS {
        let Some(value) = object.get(key) else {
            continue;
        };
        let mut single = Map::new();
        single.insert(key.to_string(), value.clone());
        if let Err(e) = serde_json::from_value::<DiveSubmission>(Value::Object(single)) {
            errors.push(field, e.to_string());
        }
    }
    errors
}

impl DiveSubmission {
    /// ## Summary
    /// Reads a submission from a JSON body. Values of the wrong type (a
    /// quoted `duration`, say) are reported per field, like any other
    /// validation failure.
    ///
    /// ## Errors
    /// `SubmissionError::Malformed` if the body is not a JSON object and
    /// `SubmissionError::Invalid` naming every mistyped field.
    pub fn from_json(raw: &[u8]) -> Result<Self, SubmissionError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| SubmissionError::Malformed(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(SubmissionError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        match serde_json::from_value::<Self>(Value::Object(object.clone())) {
            Ok(submission) => Ok(submission),
            Err(whole) => {
                let errors = mistyped_fields(&object);
                if errors.is_empty() {
                    Err(SubmissionError::Malformed(whole.to_string()))
                } else {
                    Err(SubmissionError::Invalid(errors))
                }
            }
        }
    }

    /// Attaches an uploaded photo's reference.
    #[must_use]
    pub fn with_photo(mut self, storage_id: StorageId) -> Self {
        self.photo_storage_id = Some(storage_id.into_inner());
        self
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// ## Errors
    /// Every offending field, without consuming the submission.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.clone().validate().map(|_| ())
    }

    /// ## Summary
    /// Like [`DiveSubmission::check`] for a submission whose photo will be
    /// uploaded afterwards; a missing photo reference is not reported.
    ///
    /// ## Errors
    /// Every other offending field.
    pub fn check_before_photo(&self) -> Result<(), ValidationErrors> {
        let mut pending = self.clone();
        if non_blank(pending.photo_storage_id.clone()).is_none() {
            pending.photo_storage_id = Some(PENDING_PHOTO.to_string());
        }
        pending.validate().map(|_| ())
    }

    /// ## Summary
    /// Validates required fields, ranges and the coordinate pairing, and
    /// produces the draft handed to the store. Blank optional strings are
    /// treated as absent.
    ///
    /// ## Errors
    /// Returns every offending field; nothing is partially accepted.
    pub fn validate(self) -> Result<DiveDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let user_id = required_text(&mut errors, "user_id", self.user_id);

        let dive_number = match self.dive_number {
            None => {
                errors.push("dive_number", "is required");
                None
            }
            Some(n) if n <= 0 => {
                errors.push("dive_number", "must be a positive integer");
                None
            }
            Some(n) => {
                let converted = i32::try_from(n).ok();
                if converted.is_none() {
                    errors.push("dive_number", "is too large");
                }
                converted
            }
        };

        let dive_date = match &self.dive_date {
            None => {
                errors.push("dive_date", "is required");
                None
            }
            Some(input) => {
                let parsed = input.to_datetime();
                if parsed.is_none() {
                    errors.push(
                        "dive_date",
                        "must be epoch seconds, 'YYYY-MM-DD' or an RFC 3339 timestamp",
                    );
                }
                parsed
            }
        };

        let location = required_text(&mut errors, "location", self.location);
        let duration = required_number(&mut errors, "duration", self.duration, Bound::Positive);
        let max_depth =
            required_number(&mut errors, "max_depth", self.max_depth, Bound::NonNegative);

        let water_type = match non_blank(self.water_type) {
            None => {
                errors.push("water_type", "is required");
                None
            }
            Some(raw) => match raw.parse::<types::WaterType>() {
                Ok(parsed) => Some(WaterType::from(parsed)),
                Err(e) => {
                    errors.push("water_type", e.to_string());
                    None
                }
            },
        };

        let mode = match non_blank(self.mode) {
            None => None,
            Some(raw) => match raw.parse::<types::DiveMode>() {
                Ok(parsed) => Some(DiveMode::from(parsed)),
                Err(e) => {
                    errors.push("mode", e.to_string());
                    None
                }
            },
        };

        let club_name = required_text(&mut errors, "club_name", self.club_name);
        let instructor_name = required_text(&mut errors, "instructor_name", self.instructor_name);
        let photo_storage_id =
            required_text(&mut errors, "photo_storage_id", self.photo_storage_id);

        match (self.latitude, self.longitude) {
            (Some(_), None) => errors.push("longitude", "must be supplied together with latitude"),
            (None, Some(_)) => errors.push("latitude", "must be supplied together with longitude"),
            _ => {}
        }
        let latitude = checked_number(
            &mut errors,
            "latitude",
            self.latitude,
            Bound::Within(-90.0, 90.0),
        );
        let longitude = checked_number(
            &mut errors,
            "longitude",
            self.longitude,
            Bound::Within(-180.0, 180.0),
        );

        let water_temperature = checked_number(
            &mut errors,
            "water_temperature",
            self.water_temperature,
            Bound::Finite,
        );
        let visibility =
            checked_number(&mut errors, "visibility", self.visibility, Bound::NonNegative);
        let suit_thickness = checked_number(
            &mut errors,
            "suit_thickness",
            self.suit_thickness,
            Bound::NonNegative,
        );
        let lead_weights =
            checked_number(&mut errors, "lead_weights", self.lead_weights, Bound::NonNegative);

        let (
            Some(user_id),
            Some(dive_number),
            Some(dive_date),
            Some(location),
            Some(duration),
            Some(max_depth),
            Some(water_type),
            Some(club_name),
            Some(instructor_name),
            Some(photo_storage_id),
        ) = (
            user_id,
            dive_number,
            dive_date,
            location,
            duration,
            max_depth,
            water_type,
            club_name,
            instructor_name,
            photo_storage_id,
        )
        else {
            return Err(errors);
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DiveDraft {
            user_id,
            dive_number,
            dive_date,
            location,
            duration,
            max_depth,
            water_type,
            mode,
            club_name,
            instructor_name,
            photo_storage_id,
            latitude,
            longitude,
            osm_link: non_blank(self.osm_link),
            site: non_blank(self.site),
            water_temperature,
            visibility,
            weather: non_blank(self.weather),
            suit_thickness,
            lead_weights,
            club_website: non_blank(self.club_website),
            notes: non_blank(self.notes),
            buddy_ids: self.buddy_ids,
            equipment: self.equipment,
            buddy_check: self.buddy_check,
            briefed: self.briefed,
        })
    }
}
