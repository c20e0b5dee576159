//! Service layer for the voter ledger.
//! - `storage` persists the whole voter set atomically.
//! - `ledger` owns the store plus the single writer lock.
//! - `identification` and `voting` implement the two user-facing operations.
//! - `responses` converts outcomes into the `{success, message}` wire shape.

pub mod errors;
pub mod storage;
pub mod ledger;
pub mod upload;
pub mod identification;
pub mod voting;
pub mod registry;
pub mod responses;
pub mod metrics;

use std::sync::Arc;

use configs::AppConfig;
use models::CandidateList;

use crate::errors::ServiceError;
use crate::identification::IdentificationService;
use crate::ledger::VoterLedger;
use crate::storage::{JsonVoterStore, VoterStore};
use crate::upload::UploadPolicy;
use crate::voting::VotingService;

/// Everything the HTTP layer needs, wired around one shared ledger.
#[derive(Clone)]
pub struct VotingApp {
    pub ledger: Arc<VoterLedger>,
    pub identification: Arc<IdentificationService>,
    pub voting: Arc<VotingService>,
}

impl VotingApp {
    pub fn new(store: Arc<dyn VoterStore>, candidates: CandidateList, upload: UploadPolicy) -> Self {
        let ledger = VoterLedger::new(store);
        Self {
            identification: Arc::new(IdentificationService::new(Arc::clone(&ledger), upload)),
            voting: Arc::new(VotingService::new(Arc::clone(&ledger), candidates)),
            ledger,
        }
    }

    /// Build from validated configuration with a JSON file ledger.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ServiceError> {
        let candidates = CandidateList::new(cfg.election.candidates.iter().cloned(), cfg.election.abstain.clone())
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let upload = UploadPolicy::new(&cfg.upload.allowed_extensions);
        let store: Arc<dyn VoterStore> = Arc::new(JsonVoterStore::new(&cfg.storage.voters_file));
        Ok(Self::new(store, candidates, upload))
    }
}
