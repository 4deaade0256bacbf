//! Database enum types with Diesel serialization.
//!
//! Each enum maps onto a `TEXT` column guarded by a CHECK constraint and
//! implements `ToSql`/`FromSql` for conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Water type of a dive.
///
/// Maps to `dive.water_type` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum WaterType {
    Saltwater,
    Freshwater,
}

impl ToSql<Text, Pg> for WaterType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for WaterType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"saltwater" => Ok(Self::Saltwater),
            b"freshwater" => Ok(Self::Freshwater),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl WaterType {
    /// Returns the database string representation of this water type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saltwater => "saltwater",
            Self::Freshwater => "freshwater",
        }
    }
}

impl From<WaterType> for divelog_core::types::WaterType {
    fn from(db_type: WaterType) -> Self {
        match db_type {
            WaterType::Saltwater => Self::Saltwater,
            WaterType::Freshwater => Self::Freshwater,
        }
    }
}

impl From<divelog_core::types::WaterType> for WaterType {
    fn from(core_type: divelog_core::types::WaterType) -> Self {
        match core_type {
            divelog_core::types::WaterType::Saltwater => Self::Saltwater,
            divelog_core::types::WaterType::Freshwater => Self::Freshwater,
        }
    }
}

impl fmt::Display for WaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dive mode.
///
/// Maps to `dive.mode` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum DiveMode {
    #[default]
    Scubadiving,
    Freediving,
}

impl ToSql<Text, Pg> for DiveMode {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for DiveMode {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"scubadiving" => Ok(Self::Scubadiving),
            b"freediving" => Ok(Self::Freediving),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl DiveMode {
    /// Returns the database string representation of this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scubadiving => "scubadiving",
            Self::Freediving => "freediving",
        }
    }
}

impl From<DiveMode> for divelog_core::types::DiveMode {
    fn from(db_mode: DiveMode) -> Self {
        match db_mode {
            DiveMode::Scubadiving => Self::Scubadiving,
            DiveMode::Freediving => Self::Freediving,
        }
    }
}

impl From<divelog_core::types::DiveMode> for DiveMode {
    fn from(core_mode: divelog_core::types::DiveMode) -> Self {
        match core_mode {
            divelog_core::types::DiveMode::Scubadiving => Self::Scubadiving,
            divelog_core::types::DiveMode::Freediving => Self::Freediving,
        }
    }
}

impl fmt::Display for DiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
