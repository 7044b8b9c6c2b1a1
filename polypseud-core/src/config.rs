use std::collections::HashMap;

use crate::error::PolyPseudError;
use crate::pseudonym::PublicKey;

/// Configuration key for the base64-encoded system public key.
pub const KEY_PUBLIC_KEY: &str = "publicKey";
/// Configuration key for the opaque store connection descriptor.
pub const KEY_STORE_CONNECTION: &str = "storeConnection";
/// Configuration key for the provider URL template.
pub const KEY_PROVIDER_URL_TEMPLATE: &str = "providerUrlTemplate";

/// Initialization configuration for the pseudonym subsystem.
///
/// The host hands configuration over as a flat string map; [`Config::from_map`]
/// validates it into this typed form.
#[derive(Debug, Clone)]
pub struct Config {
    /// Decoded public key used for polymorphic pseudonym generation.
    pub public_key: PublicKey,
    /// Opaque connection descriptor for the persistence backend. Carried
    /// untouched for whichever [`crate::store::StoreBackend`] the host wires
    /// in.
    pub store_connection: String,
    /// Provider URL template with two positional slots: `{0}` receives the
    /// percent-encoded polymorphic pseudonym, `{1}` the percent-encoded
    /// service id.
    pub provider_url_template: String,
}

impl Config {
    /// Builds a validated configuration from the host-supplied string map.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::InvalidConfig`] when a required entry is
    /// missing or the public key is not valid base64.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, PolyPseudError> {
        let public_key = PublicKey::from_base64(require(values, KEY_PUBLIC_KEY)?)?;
        Ok(Self {
            public_key,
            store_connection: require(values, KEY_STORE_CONNECTION)?.clone(),
            provider_url_template: require(values, KEY_PROVIDER_URL_TEMPLATE)?.clone(),
        })
    }
}

fn require<'a>(
    values: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a String, PolyPseudError> {
    values
        .get(key)
        .ok_or_else(|| PolyPseudError::InvalidConfig(format!("missing configuration entry '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> HashMap<String, String> {
        HashMap::from([
            (KEY_PUBLIC_KEY.to_string(), "AAEC".to_string()),
            (KEY_STORE_CONNECTION.to_string(), "db://pseudonyms".to_string()),
            (
                KEY_PROVIDER_URL_TEMPLATE.to_string(),
                "https://provider.example/ep?pp={0}&sp={1}".to_string(),
            ),
        ])
    }

    #[test]
    fn accepts_complete_map() {
        let config = Config::from_map(&full_map()).unwrap();
        assert_eq!(config.public_key.as_bytes(), &[0, 1, 2]);
        assert_eq!(config.store_connection, "db://pseudonyms");
        assert!(config.provider_url_template.contains("{0}"));
    }

    #[test]
    fn rejects_missing_entry() {
        let mut values = full_map();
        values.remove(KEY_PROVIDER_URL_TEMPLATE);
        let err = Config::from_map(&values).unwrap_err();
        assert!(err.to_string().contains("providerUrlTemplate"));
    }

    #[test]
    fn rejects_malformed_public_key() {
        let mut values = full_map();
        values.insert(KEY_PUBLIC_KEY.to_string(), "///not-base64///!".to_string());
        assert!(matches!(
            Config::from_map(&values),
            Err(PolyPseudError::InvalidConfig(_))
        ));
    }
}
