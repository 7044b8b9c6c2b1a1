//! Common test utilities shared across integration tests: fake crypto and
//! codec capabilities plus a write-counting store backend.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use polypseud_core::store::{
    EncryptedPseudonymRecord, InMemoryBackend, PolymorphicPseudonymRecord, StoreBackend,
    StoreResult,
};
use polypseud_core::{
    Config, PolyPseudError, Pseudonym, PseudonymCodec, PseudonymCrypto, PublicKey,
    QueryDispatcher, KEY_PROVIDER_URL_TEMPLATE, KEY_PUBLIC_KEY, KEY_STORE_CONNECTION,
};

/// Codec fake: the transportable form is plain base64 of the pseudonym
/// bytes.
pub struct FakeCodec;

impl PseudonymCodec for FakeCodec {
    fn encode(&self, pseudonym: &Pseudonym) -> String {
        STANDARD.encode(pseudonym.as_bytes())
    }

    fn decode(&self, encoded: &str) -> Result<Pseudonym, PolyPseudError> {
        STANDARD
            .decode(encoded)
            .map(Pseudonym::from_bytes)
            .map_err(|err| PolyPseudError::Decode(err.to_string()))
    }
}

/// Crypto fake: a pseudonym is `<identity>|<nonce>`, where the identity part
/// is stable and the nonce is re-drawn on generation and randomization. Two
/// pseudonyms represent the same identity iff their identity parts match.
#[derive(Default)]
pub struct FakeCrypto {
    pub generate_calls: AtomicUsize,
    pub randomize_calls: AtomicUsize,
}

impl FakeCrypto {
    fn fresh(identity: &str) -> Pseudonym {
        let nonce: u64 = rand::random();
        Pseudonym::from_bytes(format!("{identity}|{nonce:016x}").into_bytes())
    }
}

impl PseudonymCrypto for FakeCrypto {
    fn generate_polymorphic(
        &self,
        _public_key: &PublicKey,
        user: &str,
    ) -> Result<Pseudonym, PolyPseudError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::fresh(&format!("pp:{user}")))
    }

    fn randomize(&self, pseudonym: &Pseudonym) -> Result<Pseudonym, PolyPseudError> {
        self.randomize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::fresh(&identity_of(pseudonym)))
    }
}

/// Extracts the stable identity part of a fake pseudonym.
pub fn identity_of(pseudonym: &Pseudonym) -> String {
    let text = String::from_utf8(pseudonym.as_bytes().to_vec()).unwrap();
    text.split('|').next().unwrap().to_string()
}

/// Builds a fake pseudonym with the given identity, for seeding stores.
pub fn fake_pseudonym(identity: &str) -> Pseudonym {
    FakeCrypto::fresh(identity)
}

/// Store backend that counts writes, for at-most-once assertions.
#[derive(Default)]
pub struct CountingBackend {
    pub inner: InMemoryBackend,
    pub polymorphic_writes: AtomicUsize,
    pub encrypted_writes: AtomicUsize,
}

impl StoreBackend for CountingBackend {
    fn fetch_polymorphic(&self, user: &str) -> StoreResult<Option<String>> {
        self.inner.fetch_polymorphic(user)
    }

    fn insert_polymorphic(&self, record: PolymorphicPseudonymRecord) -> StoreResult<()> {
        self.polymorphic_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_polymorphic(record)
    }

    fn fetch_encrypted(&self, user: &str, sp: &str) -> StoreResult<Option<String>> {
        self.inner.fetch_encrypted(user, sp)
    }

    fn insert_encrypted(&self, record: EncryptedPseudonymRecord) -> StoreResult<()> {
        self.encrypted_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_encrypted(record)
    }
}

/// A dispatcher wired over fakes, with handles on the collaborators so tests
/// can count calls and inspect records.
pub struct Harness {
    pub dispatcher: QueryDispatcher,
    pub crypto: Arc<FakeCrypto>,
    pub backend: Arc<CountingBackend>,
}

/// Wires a dispatcher from a host-style configuration map, the fake
/// capabilities, and a counting in-memory backend.
pub fn harness(provider_url_template: &str) -> Harness {
    let values = HashMap::from([
        (KEY_PUBLIC_KEY.to_string(), "AAEC".to_string()),
        (KEY_STORE_CONNECTION.to_string(), "memory://".to_string()),
        (
            KEY_PROVIDER_URL_TEMPLATE.to_string(),
            provider_url_template.to_string(),
        ),
    ]);
    let config = Config::from_map(&values).unwrap();

    let crypto = Arc::new(FakeCrypto::default());
    let backend = Arc::new(CountingBackend::default());
    let dispatcher = QueryDispatcher::from_config(
        &config,
        Arc::clone(&backend) as Arc<dyn StoreBackend>,
        Arc::clone(&crypto) as Arc<dyn PseudonymCrypto>,
        Arc::new(FakeCodec),
    )
    .unwrap();

    Harness {
        dispatcher,
        crypto,
        backend,
    }
}

/// URL template pointing nowhere, for tests that never reach the provider.
pub const DEAD_PROVIDER: &str = "http://127.0.0.1:1/ep?pp={0}&sp={1}";
