//! The shared voter ledger: one store plus the single writer lock that
//! serializes every read-modify-write against it.

use std::sync::Arc;

use models::VoterSet;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::errors::{ServiceError, StoreError};
use crate::metrics::STORAGE_ERRORS_TOTAL;
use crate::storage::VoterStore;

/// Owns the voter store and its exclusive-access lock.
///
/// Constructed once at startup and shared through `Arc` by every service.
/// Readers call [`VoterLedger::snapshot`] and never take the lock; writers go
/// through [`VoterLedger::update`], which holds the lock from the fresh load
/// until the save has completed.
pub struct VoterLedger {
    store: Arc<dyn VoterStore>,
    writer: Mutex<()>,
}

impl VoterLedger {
    pub fn new(store: Arc<dyn VoterStore>) -> Arc<Self> {
        Arc::new(Self { store, writer: Mutex::new(()) })
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Fresh copy of the persisted set. Storage failures are logged here so
    /// every caller surfaces them the same way.
    pub async fn snapshot(&self) -> Result<VoterSet, StoreError> {
        self.store.load().await.map_err(|e| self.log_store_error("load", e))
    }

    /// Run `f` against freshly loaded state under the writer lock and persist
    /// the result. If `f` fails nothing is written; if the save fails the
    /// mutated copy is dropped and [`ServiceError::Persistence`] is returned.
    pub async fn update<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut VoterSet) -> Result<T, ServiceError>,
    {
        self.transact(false, f).await
    }

    /// Like [`VoterLedger::update`] but a ledger that was never written is
    /// treated as empty. Used by registration, which creates the ledger.
    pub async fn update_or_create<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut VoterSet) -> Result<T, ServiceError>,
    {
        self.transact(true, f).await
    }

    async fn transact<T, F>(&self, missing_is_empty: bool, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut VoterSet) -> Result<T, ServiceError>,
    {
        let _guard = self.writer.lock().await;
        let mut voters = match self.store.load().await {
            Ok(voters) => voters,
            Err(StoreError::Missing(_)) if missing_is_empty => VoterSet::new(),
            Err(e) => return Err(self.log_store_error("load", e).into()),
        };
        let out = f(&mut voters)?;
        if let Err(e) = self.store.save(&voters).await {
            let e = self.log_store_error("save", e);
            return Err(ServiceError::Persistence(e.to_string()));
        }
        Ok(out)
    }

    fn log_store_error(&self, op: &'static str, e: StoreError) -> StoreError {
        STORAGE_ERRORS_TOTAL.with_label_values(&[e.kind()]).inc();
        match &e {
            StoreError::Missing(_) => warn!(op, location = %self.store.location(), error = %e, "voter ledger not found"),
            _ => error!(op, location = %self.store.location(), error = %e, "voter ledger storage failure"),
        }
        e
    }
}
