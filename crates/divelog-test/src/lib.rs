//! Dive log server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `divelog_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use divelog_core::*;
    pub use divelog_service::*;

    // The service error type takes precedence over the core one.
    pub use divelog_service::error;

    pub mod db {
        pub use divelog_db::db::*;
    }

    pub mod model {
        pub use divelog_db::model::*;
    }

    pub mod store {
        pub use divelog_db::store::*;
    }

    pub mod config {
        pub use divelog_app::config::ConfigHandler;
        pub use divelog_core::config::*;
    }
}

pub mod app {
    pub use divelog_app::*;

    pub mod api {
        pub use divelog_app::app::api::*;
    }
}
