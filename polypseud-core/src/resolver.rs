use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::QueryResult;
use crate::error::PolyPseudError;
use crate::locks::KeyedLocks;
use crate::provider::PseudonymProviderClient;
use crate::pseudonym::{Pseudonym, PseudonymCodec, PseudonymCrypto, PublicKey};
use crate::store::PseudonymStore;

/// Separator between user and service in encrypted-pseudonym lock keys.
const LOCK_KEY_SEPARATOR: char = '\u{1f}';

/// Orchestrates get-or-create resolution of pseudonyms.
///
/// On a cache miss the resolver generates (polymorphic) or exchanges
/// (encrypted) the pseudonym, persists it, and returns it; on a hit it
/// returns the stored value untouched. A per-key lock is held across each
/// whole check-generate-store sequence, so concurrent resolutions of the
/// same key generate at most once. Collaborator failures propagate
/// unchanged; the resolver adds no recovery logic of its own.
pub struct PseudonymResolver {
    store: PseudonymStore,
    provider: PseudonymProviderClient,
    crypto: Arc<dyn PseudonymCrypto>,
    codec: Arc<dyn PseudonymCodec>,
    public_key: PublicKey,
    polymorphic_locks: KeyedLocks,
    encrypted_locks: KeyedLocks,
}

impl PseudonymResolver {
    /// Creates a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        store: PseudonymStore,
        provider: PseudonymProviderClient,
        crypto: Arc<dyn PseudonymCrypto>,
        codec: Arc<dyn PseudonymCodec>,
        public_key: PublicKey,
    ) -> Self {
        Self {
            store,
            provider,
            crypto,
            codec,
            public_key,
            polymorphic_locks: KeyedLocks::new(),
            encrypted_locks: KeyedLocks::new(),
        }
    }

    /// Resolves the polymorphic pseudonym for `user`, generating and
    /// persisting it on first sight.
    ///
    /// # Errors
    ///
    /// Propagates [`PolyPseudError::Crypto`] from generation and any
    /// [`crate::store::StoreError`] from the cache.
    pub async fn resolve_polymorphic(&self, user: &str) -> Result<QueryResult, PolyPseudError> {
        let pseudonym = self.polymorphic_for(user).await?;
        Ok(QueryResult::single(self.codec.encode(&pseudonym)))
    }

    /// Resolves the encrypted pseudonym for `(user, sp)`. On a miss the
    /// user's polymorphic pseudonym is resolved first (itself
    /// get-or-create), exchanged at the remote provider, persisted, and
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates store, crypto, and provider errors unchanged.
    pub async fn resolve_encrypted(
        &self,
        user: &str,
        sp: &str,
    ) -> Result<QueryResult, PolyPseudError> {
        let key = format!("{user}{LOCK_KEY_SEPARATOR}{sp}");
        let lock = self.encrypted_locks.lock_for(&key);
        let _guard = lock.lock().await;

        if let Some(pseudonym) = self.store.get_encrypted(user, sp)? {
            return Ok(QueryResult::single(self.codec.encode(&pseudonym)));
        }

        // The polymorphic lock is only ever taken while holding (or without)
        // the encrypted lock, never the other way around.
        let polymorphic = self.polymorphic_for(user).await?;
        debug!(user, sp, "no encrypted pseudonym cached, exchanging");
        let encrypted = self.provider.exchange(&polymorphic, sp).await?;
        self.store.put_encrypted(user, sp, &encrypted)?;
        Ok(QueryResult::single(self.codec.encode(&encrypted)))
    }

    /// Re-randomizes an encoded pseudonym: same identity, fresh encoding.
    /// Stateless; the store is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`PolyPseudError::Decode`] if the input is not a valid
    /// encoded pseudonym and propagates [`PolyPseudError::Crypto`] from the
    /// transform.
    pub fn randomize(&self, encoded: &str) -> Result<QueryResult, PolyPseudError> {
        let pseudonym = self.codec.decode(encoded)?;
        let randomized = self.crypto.randomize(&pseudonym)?;
        Ok(QueryResult::single(self.codec.encode(&randomized)))
    }

    async fn polymorphic_for(&self, user: &str) -> Result<Pseudonym, PolyPseudError> {
        let lock = self.polymorphic_locks.lock_for(user);
        let _guard = lock.lock().await;

        if let Some(pseudonym) = self.store.get_polymorphic(user)? {
            return Ok(pseudonym);
        }

        debug!(user, "no polymorphic pseudonym cached, generating");
        let pseudonym = self.crypto.generate_polymorphic(&self.public_key, user)?;
        self.store.put_polymorphic(user, &pseudonym)?;
        Ok(pseudonym)
    }
}
