//! Durable get/put cache for pseudonyms, with two independent namespaces:
//! polymorphic pseudonyms keyed by user, encrypted pseudonyms keyed by
//! (user, service).
//!
//! The persistence transport (SQL connection, schema migration) is not this
//! crate's concern: integrators implement [`StoreBackend`] over whatever
//! engine the `storeConnection` descriptor points at. [`InMemoryBackend`] is
//! provided for tests and ephemeral deployments.
//!
//! The store performs no uniqueness enforcement of its own; the resolver's
//! per-key locks guarantee at most one record per user and per
//! (user, service).

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBackend;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pseudonym::{Pseudonym, PseudonymCodec};

/// Persisted row for a user's polymorphic pseudonym. At most one per user;
/// never updated or deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicPseudonymRecord {
    /// Surface identifier assigned at insert time.
    pub id: Uuid,
    /// User the pseudonym belongs to; the logical unique key.
    pub user: String,
    /// Encoded pseudonym string.
    pub pseudonym: String,
}

/// Persisted row for a (user, service) encrypted pseudonym. At most one per
/// pair; never updated or deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPseudonymRecord {
    /// Surface identifier assigned at insert time.
    pub id: Uuid,
    /// User the pseudonym belongs to.
    pub user: String,
    /// Relying service the pseudonym was derived for.
    pub sp: String,
    /// Encoded pseudonym string.
    pub pseudonym: String,
}

/// Logical persistence contract for pseudonym records.
///
/// Methods are synchronous; a backend over blocking I/O should keep its
/// operations short, since they run on resolver worker tasks.
pub trait StoreBackend: Send + Sync {
    /// Fetches the encoded polymorphic pseudonym for `user`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the fetch itself fails.
    fn fetch_polymorphic(&self, user: &str) -> StoreResult<Option<String>>;

    /// Inserts a polymorphic pseudonym record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if persistence fails.
    fn insert_polymorphic(&self, record: PolymorphicPseudonymRecord) -> StoreResult<()>;

    /// Fetches the encoded encrypted pseudonym for `(user, sp)`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the fetch itself fails.
    fn fetch_encrypted(&self, user: &str, sp: &str) -> StoreResult<Option<String>>;

    /// Inserts an encrypted pseudonym record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if persistence fails.
    fn insert_encrypted(&self, record: EncryptedPseudonymRecord) -> StoreResult<()>;
}

/// Keyed pseudonym cache over an injected backend and codec.
///
/// Reads decode the persisted string before returning, so callers always see
/// in-memory pseudonyms; a decode failure surfaces as
/// [`StoreError::CorruptRecord`], distinct from "absent". Writes encode and
/// assign a fresh record id.
pub struct PseudonymStore {
    backend: Arc<dyn StoreBackend>,
    codec: Arc<dyn PseudonymCodec>,
}

impl PseudonymStore {
    /// Creates a store over the given backend and codec.
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>, codec: Arc<dyn PseudonymCodec>) -> Self {
        Self { backend, codec }
    }

    /// Looks up the polymorphic pseudonym for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backend fetch fails and
    /// [`StoreError::CorruptRecord`] if the persisted string does not decode.
    pub fn get_polymorphic(&self, user: &str) -> StoreResult<Option<Pseudonym>> {
        match self.backend.fetch_polymorphic(user)? {
            Some(encoded) => self.decode(&encoded, format!("polymorphic pseudonym of '{user}'")),
            None => Ok(None),
        }
    }

    /// Persists the polymorphic pseudonym for `user` under a fresh record id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if persistence fails.
    pub fn put_polymorphic(&self, user: &str, pseudonym: &Pseudonym) -> StoreResult<()> {
        self.backend.insert_polymorphic(PolymorphicPseudonymRecord {
            id: Uuid::new_v4(),
            user: user.to_string(),
            pseudonym: self.codec.encode(pseudonym),
        })
    }

    /// Looks up the encrypted pseudonym for `(user, sp)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backend fetch fails and
    /// [`StoreError::CorruptRecord`] if the persisted string does not decode.
    pub fn get_encrypted(&self, user: &str, sp: &str) -> StoreResult<Option<Pseudonym>> {
        match self.backend.fetch_encrypted(user, sp)? {
            Some(encoded) => self.decode(
                &encoded,
                format!("encrypted pseudonym of '{user}' for '{sp}'"),
            ),
            None => Ok(None),
        }
    }

    /// Persists the encrypted pseudonym for `(user, sp)` under a fresh
    /// record id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if persistence fails.
    pub fn put_encrypted(
        &self,
        user: &str,
        sp: &str,
        pseudonym: &Pseudonym,
    ) -> StoreResult<()> {
        self.backend.insert_encrypted(EncryptedPseudonymRecord {
            id: Uuid::new_v4(),
            user: user.to_string(),
            sp: sp.to_string(),
            pseudonym: self.codec.encode(pseudonym),
        })
    }

    fn decode(&self, encoded: &str, what: String) -> StoreResult<Option<Pseudonym>> {
        self.codec
            .decode(encoded)
            .map(Some)
            .map_err(|err| StoreError::CorruptRecord(format!("{what}: {err}")))
    }
}
