//! Persistence for dive records: diesel schema and migrations, row models and
//! the `DiveRecordStore` seam with its Postgres and in-memory backends.

pub mod db;
pub mod error;
pub mod model;
pub mod store;
