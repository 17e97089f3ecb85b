//! Link resolution for dragged links: follow redirects, fetch page content.

use url::Url;

use crate::types::errors::ResolveError;

/// Parses `raw` and accepts only http and https URLs.
pub fn validate_fetch_url(raw: &str) -> Result<Url, ResolveError> {
    let url = Url::parse(raw).map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ResolveError::UnsupportedScheme(other.to_string())),
    }
}

/// HTTP client for redirect resolution and content fetches.
#[cfg(feature = "network")]
pub struct LinkResolver {
    client: reqwest::Client,
}

#[cfg(feature = "network")]
impl LinkResolver {
    pub fn new() -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Final URL after following redirects with a HEAD request.
    ///
    /// A failed request resolves to the input URL.
    pub async fn resolve_redirect(&self, raw: &str) -> Result<String, ResolveError> {
        let url = validate_fetch_url(raw)?;
        match self.client.head(url).send().await {
            Ok(response) => Ok(response.url().to_string()),
            Err(e) => {
                tracing::warn!(url = raw, error = %e, "redirect resolution failed, keeping original url");
                Ok(raw.to_string())
            }
        }
    }

    /// Body text of a GET request. Non-success statuses are errors.
    pub async fn fetch_content(&self, raw: &str) -> Result<String, ResolveError> {
        let url = validate_fetch_url(raw)?;
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml",
            )
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Network(format!("HTTP status {}", status)));
        }
        response
            .text()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))
    }
}
