//! Storage abstractions for the voter ledger.
//!
//! A [`VoterStore`] loads and persists the whole [`VoterSet`] as one unit.
//! Implementations do no locking of their own; serialization of writers is
//! the job of [`crate::ledger::VoterLedger`].

use async_trait::async_trait;
use models::VoterSet;

use crate::errors::StoreError;

pub mod json_voter_store;
pub mod memory;

pub use json_voter_store::JsonVoterStore;
pub use memory::MemoryVoterStore;

/// Whole-set persistence for voter records.
#[async_trait]
pub trait VoterStore: Send + Sync {
    /// Read the full set. Never degrades to an empty set on failure.
    async fn load(&self) -> Result<VoterSet, StoreError>;

    /// Replace the persisted set. Readers observe either the previous or the
    /// new contents, never a mix.
    async fn save(&self, voters: &VoterSet) -> Result<(), StoreError>;

    /// Human-readable location, used in logs.
    fn location(&self) -> String;
}
