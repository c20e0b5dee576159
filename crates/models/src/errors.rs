use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate voter id: {0}")]
    DuplicateVoterId(String),
    #[error("duplicate fingerprint reference: {0}")]
    DuplicateFingerprint(String),
    #[error("inconsistent voting state for voter {id}: {reason}")]
    Inconsistent { id: String, reason: String },
    #[error("voter not found: {0}")]
    VoterNotFound(String),
    #[error("voter {0} has already voted")]
    AlreadyVoted(String),
}
