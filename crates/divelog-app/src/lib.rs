//! HTTP surface of the dive log: salvo routes, depot handlers and the
//! mapping of service errors onto responses.

pub mod app;
pub mod config;
pub mod error;
pub mod services_handler;
