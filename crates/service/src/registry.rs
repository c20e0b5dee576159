//! Bulk voter registration.
//!
//! Registration is the only place new records enter the ledger. A batch is
//! all-or-nothing: one bad record rejects the whole import and nothing is
//! written.

use models::VoterRecord;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::ledger::VoterLedger;

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationSummary {
    pub added: usize,
    pub total: usize,
}

/// Append `records` to the ledger, creating it if it does not exist yet.
///
/// Rejects empty ids or fingerprint references, ids or fingerprint
/// references that collide with each other or with already registered
/// voters, and records that arrive already marked as voted.
#[instrument(skip(ledger, records), fields(batch = records.len()))]
pub async fn register_voters(ledger: &VoterLedger, records: Vec<VoterRecord>) -> Result<RegistrationSummary, ServiceError> {
    if records.is_empty() {
        return Err(ServiceError::Validation("no voter records supplied".into()));
    }
    if let Some(voted) = records.iter().find(|r| r.has_voted()) {
        return Err(ServiceError::Validation(format!(
            "voter {} is already marked as voted; new registrations must start unvoted",
            voted.id
        )));
    }

    let added = records.len();
    let summary = ledger
        .update_or_create(move |voters| {
            for record in records {
                voters
                    .insert(record)
                    .map_err(|e| ServiceError::Validation(e.to_string()))?;
            }
            Ok(RegistrationSummary { added, total: voters.len() })
        })
        .await?;
    info!(added = summary.added, total = summary.total, location = %ledger.location(), "voters registered");
    Ok(summary)
}
