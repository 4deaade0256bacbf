//! Best-effort lookup of a dive club's website through a web search.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ServiceResult;

pub mod duckduckgo;
pub mod parser;

pub use duckduckgo::DuckDuckGoResolver;
pub use parser::ResultLinkParser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClubWebsiteResult {
    pub url: String,
    pub query: String,
}

#[async_trait]
pub trait ClubWebsiteResolver: Send + Sync {
    /// ## Summary
    /// First organic search result for a club name. The result is never
    /// verified to belong to the club.
    ///
    /// ## Errors
    /// `ServiceError::InvalidQuery` for a blank name and
    /// `ServiceError::ResolverUnavailable` when the search endpoint fails.
    async fn resolve(&self, club_name: &str) -> ServiceResult<Option<ClubWebsiteResult>>;
}
