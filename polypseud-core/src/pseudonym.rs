use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::PolyPseudError;

/// An opaque pseudonym token, either polymorphic (per user) or encrypted
/// (per user and service).
///
/// The in-memory form is whatever byte representation the injected crypto
/// layer uses; this crate never inspects it. Pseudonyms are immutable:
/// transforms such as randomization produce a new value.
#[derive(Clone, PartialEq, Eq)]
pub struct Pseudonym {
    bytes: Vec<u8>,
}

impl Pseudonym {
    /// Wraps raw pseudonym bytes produced by a crypto or codec capability.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw byte representation.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// Pseudonym values are linkable identifiers; keep them out of debug output.
impl fmt::Debug for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pseudonym({} bytes)", self.bytes.len())
    }
}

/// The public key of the pseudonym system, as configured for this identity
/// provider. Handed to [`PseudonymCrypto::generate_polymorphic`] on every
/// generation.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Decodes a base64-encoded curve point as supplied in the host
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::InvalidConfig`] if the input is not valid
    /// base64.
    pub fn from_base64(encoded: &str) -> Result<Self, PolyPseudError> {
        let bytes = STANDARD.decode(encoded).map_err(|err| {
            PolyPseudError::InvalidConfig(format!("publicKey is not valid base64: {err}"))
        })?;
        Ok(Self { bytes })
    }

    /// Returns the decoded key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({} bytes)", self.bytes.len())
    }
}

/// Codec between in-memory pseudonyms and their transportable string form.
///
/// The concrete encoding (curve point serialization etc.) lives outside this
/// crate; implementations are injected as `Arc<dyn PseudonymCodec>`.
pub trait PseudonymCodec: Send + Sync {
    /// Encodes a pseudonym into its transportable string form.
    fn encode(&self, pseudonym: &Pseudonym) -> String;

    /// Decodes the transportable string form back into a pseudonym.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::Decode`] if the input is not a valid
    /// encoded pseudonym.
    fn decode(&self, encoded: &str) -> Result<Pseudonym, PolyPseudError>;
}

/// The pseudonym mathematics capability: key-based generation and the
/// blinding/randomization transform.
pub trait PseudonymCrypto: Send + Sync {
    /// Generates a fresh polymorphic pseudonym for `user` under the system
    /// public key. Not required to be reproducible; the resolver guarantees
    /// it runs at most once per user.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::Crypto`] if generation fails.
    fn generate_polymorphic(
        &self,
        public_key: &PublicKey,
        user: &str,
    ) -> Result<Pseudonym, PolyPseudError>;

    /// Produces a new pseudonym representing the same identity with a
    /// different encoding, to prevent linkage by observers.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::Crypto`] if the transform fails.
    fn randomize(&self, pseudonym: &Pseudonym) -> Result<Pseudonym, PolyPseudError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_decodes_base64() {
        let key = PublicKey::from_base64("AAEC").unwrap();
        assert_eq!(key.as_bytes(), &[0, 1, 2]);
    }

    #[test]
    fn public_key_rejects_garbage() {
        let err = PublicKey::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, PolyPseudError::InvalidConfig(_)));
    }

    #[test]
    fn debug_output_redacts_pseudonym_bytes() {
        let pseudonym = Pseudonym::from_bytes(vec![1, 2, 3, 4]);
        assert_eq!(format!("{pseudonym:?}"), "Pseudonym(4 bytes)");
    }
}
