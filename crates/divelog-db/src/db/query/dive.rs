//! Query builder functions for dive records.

use diesel::prelude::*;

use crate::db::schema::dive;

/// ## Summary
/// Returns a query to select all dives.
#[must_use]
pub fn all() -> dive::BoxedQuery<'static, diesel::pg::Pg> {
    dive::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a dive by its storage ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> dive::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(dive::id.eq(id))
}

/// ## Summary
/// Returns a query for every dive of one owner, ordered by dive number.
#[must_use]
pub fn by_owner(user_id: &str) -> dive::BoxedQuery<'_, diesel::pg::Pg> {
    all()
        .filter(dive::user_id.eq(user_id))
        .order((dive::dive_number.asc(), dive::logged_at.asc()))
}

/// ## Summary
/// Returns a query to find a dive by its natural key.
#[must_use]
pub fn by_owner_and_number(
    user_id: &str,
    dive_number: i32,
) -> dive::BoxedQuery<'_, diesel::pg::Pg> {
    all()
        .filter(dive::user_id.eq(user_id))
        .filter(dive::dive_number.eq(dive_number))
}
