//! Shared building blocks for the dive log workspace: settings, the core
//! error type, the clock abstraction and enums that cross crate boundaries.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;
