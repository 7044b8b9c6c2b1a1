use std::sync::Arc;

use crate::error::PolyPseudError;
use crate::http_request::Request;
use crate::pseudonym::{Pseudonym, PseudonymCodec};

/// Slot in the URL template receiving the percent-encoded polymorphic
/// pseudonym.
const SLOT_PSEUDONYM: &str = "{0}";
/// Slot in the URL template receiving the percent-encoded service id.
const SLOT_SERVICE: &str = "{1}";

/// Client for the remote pseudonymization service that converts a
/// polymorphic pseudonym plus a service id into an encrypted pseudonym.
///
/// Each [`exchange`](Self::exchange) issues a single HTTP GET with no
/// built-in retry; retry policy, if any, belongs to the caller.
pub struct PseudonymProviderClient {
    url_template: String,
    codec: Arc<dyn PseudonymCodec>,
    http: Request,
}

impl std::fmt::Debug for PseudonymProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudonymProviderClient")
            .field("url_template", &self.url_template)
            .finish_non_exhaustive()
    }
}

impl PseudonymProviderClient {
    /// Creates a client for the given URL template.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::InvalidConfig`] if the template is missing
    /// either of the `{0}`/`{1}` substitution slots.
    pub fn new(
        url_template: &str,
        codec: Arc<dyn PseudonymCodec>,
    ) -> Result<Self, PolyPseudError> {
        for slot in [SLOT_PSEUDONYM, SLOT_SERVICE] {
            if !url_template.contains(slot) {
                return Err(PolyPseudError::InvalidConfig(format!(
                    "providerUrlTemplate is missing the '{slot}' slot"
                )));
            }
        }
        Ok(Self {
            url_template: url_template.to_string(),
            codec,
            http: Request::new(),
        })
    }

    /// Exchanges a polymorphic pseudonym for the encrypted pseudonym of
    /// `service`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::ProviderUnavailable`] on transport failure
    /// or a non-success status, and [`PolyPseudError::ProviderResponse`] if
    /// the response body cannot be decoded as a pseudonym.
    pub async fn exchange(
        &self,
        polymorphic: &Pseudonym,
        service: &str,
    ) -> Result<Pseudonym, PolyPseudError> {
        let url = self
            .url_template
            .replace(
                SLOT_PSEUDONYM,
                &urlencoding::encode(&self.codec.encode(polymorphic)),
            )
            .replace(SLOT_SERVICE, &urlencoding::encode(service));

        let body = self.http.get_text(&url).await?;
        self.codec.decode(body.trim_end()).map_err(|err| {
            PolyPseudError::ProviderResponse(format!(
                "provider body is not a valid encoded pseudonym: {err}"
            ))
        })
    }
}
