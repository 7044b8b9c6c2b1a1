//! In-memory store backend for tests and ephemeral deployments.

#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::{EncryptedPseudonymRecord, PolymorphicPseudonymRecord, StoreBackend};

/// A [`StoreBackend`] holding records in process memory.
#[derive(Default)]
pub struct InMemoryBackend {
    polymorphic: Mutex<HashMap<String, PolymorphicPseudonymRecord>>,
    encrypted: Mutex<HashMap<(String, String), EncryptedPseudonymRecord>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all polymorphic records, for inspection in tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn polymorphic_records(&self) -> Vec<PolymorphicPseudonymRecord> {
        self.polymorphic.lock().unwrap().values().cloned().collect()
    }

    /// Snapshot of all encrypted records, for inspection in tests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn encrypted_records(&self) -> Vec<EncryptedPseudonymRecord> {
        self.encrypted.lock().unwrap().values().cloned().collect()
    }
}

impl StoreBackend for InMemoryBackend {
    fn fetch_polymorphic(&self, user: &str) -> StoreResult<Option<String>> {
        let guard = self
            .polymorphic
            .lock()
            .map_err(|_| StoreError::Read("mutex poisoned".to_string()))?;
        Ok(guard.get(user).map(|record| record.pseudonym.clone()))
    }

    fn insert_polymorphic(&self, record: PolymorphicPseudonymRecord) -> StoreResult<()> {
        self.polymorphic
            .lock()
            .map_err(|_| StoreError::Write("mutex poisoned".to_string()))?
            .insert(record.user.clone(), record);
        Ok(())
    }

    fn fetch_encrypted(&self, user: &str, sp: &str) -> StoreResult<Option<String>> {
        let guard = self
            .encrypted
            .lock()
            .map_err(|_| StoreError::Read("mutex poisoned".to_string()))?;
        Ok(guard
            .get(&(user.to_string(), sp.to_string()))
            .map(|record| record.pseudonym.clone()))
    }

    fn insert_encrypted(&self, record: EncryptedPseudonymRecord) -> StoreResult<()> {
        self.encrypted
            .lock()
            .map_err(|_| StoreError::Write("mutex poisoned".to_string()))?
            .insert((record.user.clone(), record.sp.clone()), record);
        Ok(())
    }
}
