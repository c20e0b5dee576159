//! Fingerprint reference → voter lookup.
//!
//! The fingerprint reference is the uploaded file name matched verbatim
//! against the ledger. No biometric comparison happens anywhere in this
//! system; anyone who knows a registered file name can identify as that
//! voter. Treat this as a known functional gap, not an authentication scheme.

use std::sync::Arc;

use models::VoteTimestamp;
use tracing::{info, instrument, warn};

use crate::errors::{MissingInput, ServiceError};
use crate::ledger::VoterLedger;
use crate::metrics::IDENTIFICATIONS_TOTAL;
use crate::upload::UploadPolicy;

/// Outcome of looking a fingerprint reference up in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identification {
    NotFound,
    AlreadyVoted { timestamp: VoteTimestamp },
    Eligible { voter_id: String, name: String },
}

impl Identification {
    fn outcome_label(&self) -> &'static str {
        match self {
            Identification::NotFound => "not_found",
            Identification::AlreadyVoted { .. } => "already_voted",
            Identification::Eligible { .. } => "eligible",
        }
    }
}

/// Read-only identification against a fresh ledger snapshot.
pub struct IdentificationService {
    ledger: Arc<VoterLedger>,
    upload: UploadPolicy,
}

impl IdentificationService {
    pub fn new(ledger: Arc<VoterLedger>, upload: UploadPolicy) -> Self {
        Self { ledger, upload }
    }

    /// Run the upload pre-filter on a submitted file name, then identify.
    pub async fn identify_upload(&self, filename: Option<&str>) -> Result<Identification, ServiceError> {
        let fingerprint_ref = match self.upload.check(filename) {
            Ok(name) => name,
            Err(e) => {
                IDENTIFICATIONS_TOTAL.with_label_values(&["rejected_upload"]).inc();
                info!(code = e.code(), error = %e, "fingerprint upload rejected");
                return Err(e);
            }
        };
        self.identify(fingerprint_ref).await
    }

    /// Resolve `fingerprint_ref` to a voter. Never mutates state.
    ///
    /// Storage failures and an empty ledger are errors, not `NotFound`, so a
    /// lost ledger cannot masquerade as "unregistered voter".
    #[instrument(skip(self))]
    pub async fn identify(&self, fingerprint_ref: &str) -> Result<Identification, ServiceError> {
        let result = self.lookup(fingerprint_ref).await;
        let label = match &result {
            Ok(found) => found.outcome_label(),
            Err(e) if e.is_storage_fault() => "unavailable",
            Err(_) => "rejected",
        };
        IDENTIFICATIONS_TOTAL.with_label_values(&[label]).inc();
        info!(outcome = label, "identification finished");
        result
    }

    async fn lookup(&self, fingerprint_ref: &str) -> Result<Identification, ServiceError> {
        if fingerprint_ref.trim().is_empty() {
            return Err(ServiceError::MissingInput(MissingInput::FingerprintName));
        }
        let voters = self.ledger.snapshot().await?;
        if voters.is_empty() {
            warn!(location = %self.ledger.location(), "voter ledger loaded but holds no voters");
            return Err(ServiceError::EmptyRegistry);
        }
        let Some(record) = voters.find_by_fingerprint(fingerprint_ref) else {
            return Ok(Identification::NotFound);
        };
        if !record.has_voted() {
            return Ok(Identification::Eligible { voter_id: record.id.clone(), name: record.name.clone() });
        }
        match record.vote_timestamp() {
            Some(timestamp) => Ok(Identification::AlreadyVoted { timestamp }),
            None => Err(ServiceError::CorruptData(format!("voter {} voted without a timestamp", record.id))),
        }
    }
}
