use regex_lite::Regex;
use reqwest::Url;

use crate::error::{ServiceError, ServiceResult};

const RESULT_LINK_PATTERN: &str = r#"<a[^>]*class="result__a"[^>]*href="([^"]+)""#;
const RESULT_URL_PATTERN: &str = r#"class="result__url"[^>]*>([^<]+)<"#;

/// Extracts the first organic result from a search results page.
#[derive(Debug, Clone)]
pub struct ResultLinkParser {
    result_link: Regex,
    result_url: Regex,
}

impl ResultLinkParser {
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if a pattern fails to
    /// compile.
    pub fn new() -> ServiceResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))
        };

        Ok(Self {
            result_link: compile(RESULT_LINK_PATTERN)?,
            result_url: compile(RESULT_URL_PATTERN)?,
        })
    }

    /// ## Summary
    /// Returns the first result URL on the page. The anchor `href` is tried
    /// first, unwrapping the search engine's redirect; the displayed result
    /// URL text is the fallback.
    #[must_use]
    pub fn first_result(&self, html: &str) -> Option<String> {
        let from_anchor = self
            .result_link
            .captures(html)
            .and_then(|caps| caps.get(1))
            .and_then(|href| accept(unwrap_redirect(&decode_entities(href.as_str()))));

        from_anchor.or_else(|| {
            let text = self.result_url.captures(html)?.get(1)?.as_str();
            let text = decode_entities(text.trim());
            if text.starts_with("http") {
                accept(text)
            } else {
                accept(format!("https://{text}"))
            }
        })
    }
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&#x2F;", "/")
        .replace("&#47;", "/")
}

/// Unwraps `/l/?uddg=<target>` redirects and defaults protocol-relative links
/// to https.
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let target = Url::parse(&absolute).ok().and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    });

    match target {
        Some(target) if target.starts_with("//") => format!("https:{target}"),
        Some(target) => target,
        None => absolute,
    }
}

fn accept(candidate: String) -> Option<String> {
    let url = Url::parse(&candidate).ok()?;
    let web_scheme = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    (web_scheme && has_host).then_some(candidate)
}
