use std::time::Duration;

use crate::error::PolyPseudError;

/// A thin wrapper on an HTTP client for the provider exchange call. Sets
/// sensible defaults (timeout, user-agent); retry policy deliberately stays
/// with the caller, so every call issues exactly one request.
pub(crate) struct Request {
    client: reqwest::Client,
    timeout: Duration,
}

impl Request {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Issues a single GET to `url` and reads the response body as plain
    /// text. Transport failures and non-success statuses both surface as
    /// [`PolyPseudError::ProviderUnavailable`].
    pub(crate) async fn get_text(&self, url: &str) -> Result<String, PolyPseudError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(
                "User-Agent",
                format!("polypseud-core/{}", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .map_err(|err| PolyPseudError::ProviderUnavailable {
                url: url.to_string(),
                status: None,
                error: format!("request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolyPseudError::ProviderUnavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                error: format!("request error with bad status code {}", status.as_u16()),
            });
        }

        response
            .text()
            .await
            .map_err(|err| PolyPseudError::ProviderUnavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                error: format!("reading response body failed: {err}"),
            })
    }
}
