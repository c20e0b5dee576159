//! In-memory voter store for tests and doc examples.
//!
//! Keeps the serialized ledger as bytes so loads go through the same parsing
//! and validation as the file store, and can be told to fail loads or saves.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use models::VoterSet;

use super::VoterStore;
use crate::errors::StoreError;

#[derive(Default)]
pub struct MemoryVoterStore {
    persisted: Mutex<Option<Vec<u8>>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryVoterStore {
    /// A store that already holds `voters`.
    pub fn with_voters(voters: &VoterSet) -> Self {
        let store = Self::default();
        store.set_raw(serde_json::to_vec(voters).unwrap_or_default());
        store
    }

    /// Replace the persisted bytes verbatim, e.g. with a corrupt payload.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.persisted.lock().unwrap_or_else(|p| p.into_inner()) = Some(bytes);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoterStore for MemoryVoterStore {
    async fn load(&self) -> Result<VoterSet, StoreError> {
        // give concurrent callers a chance to interleave, as real I/O would
        tokio::task::yield_now().await;
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::StorageUnavailable("memory: injected load failure".into()));
        }
        let bytes = self.persisted.lock().unwrap_or_else(|p| p.into_inner()).clone();
        match bytes {
            None => Err(StoreError::Missing("memory".into())),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::CorruptData(format!("memory: {e}"))),
        }
    }

    async fn save(&self, voters: &VoterSet) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::StorageWriteError("memory: injected save failure".into()));
        }
        let bytes = serde_json::to_vec(voters).map_err(|e| StoreError::StorageWriteError(e.to_string()))?;
        self.set_raw(bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
