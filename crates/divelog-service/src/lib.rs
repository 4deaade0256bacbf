//! Domain services for the dive log: geocoding, club website search, photo
//! storage and the dive upsert workflow with its optional enrichment.

pub mod club;
pub mod dive;
pub mod error;
pub mod geo;
pub mod photo;
pub mod services;
