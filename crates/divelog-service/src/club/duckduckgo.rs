use async_trait::async_trait;
use divelog_core::config::ClubSearchConfig;

use crate::club::{ClubWebsiteResolver, ClubWebsiteResult, ResultLinkParser};
use crate::error::{ServiceError, ServiceResult};

/// Club website search over the `DuckDuckGo` HTML endpoint.
#[derive(Debug, Clone)]
pub struct DuckDuckGoResolver {
    client: reqwest::Client,
    search_url: String,
    parser: ResultLinkParser,
}

impl DuckDuckGoResolver {
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if the HTTP client or the
    /// result parser cannot be built.
    pub fn new(config: &ClubSearchConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            search_url: format!("{}/html/", config.base_url.trim_end_matches('/')),
            parser: ResultLinkParser::new()?,
        })
    }
}

#[async_trait]
impl ClubWebsiteResolver for DuckDuckGoResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, club_name: &str) -> ServiceResult<Option<ClubWebsiteResult>> {
        let query = club_name.trim();
        if query.is_empty() {
            return Err(ServiceError::InvalidQuery(
                "club name must not be blank".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ServiceError::ResolverUnavailable(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ResolverUnavailable(format!(
                "search returned status {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ServiceError::ResolverUnavailable(format!("search body unreadable: {e}")))?;

        let result = self.parser.first_result(&html).map(|url| ClubWebsiteResult {
            url,
            query: query.to_string(),
        });

        if result.is_none() {
            tracing::debug!("No parseable search result");
        }

        Ok(result)
    }
}
