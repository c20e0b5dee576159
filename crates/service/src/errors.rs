use models::errors::ModelError;
use models::VoteTimestamp;
use thiserror::Error;

/// Failures of the durable voter storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No ledger has been written yet at the configured location.
    #[error("voter storage not found: {0}")]
    Missing(String),
    #[error("voter storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("voter storage is corrupt: {0}")]
    CorruptData(String),
    #[error("voter storage write failed: {0}")]
    StorageWriteError(String),
}

impl StoreError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Missing(_) => "missing",
            StoreError::StorageUnavailable(_) => "unavailable",
            StoreError::CorruptData(_) => "corrupt",
            StoreError::StorageWriteError(_) => "write",
        }
    }
}

/// Which piece of caller input was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    FingerprintFile,
    FingerprintName,
    VoteData,
    VoterIdOrCandidate,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("missing input: {0:?}")]
    MissingInput(MissingInput),
    #[error("unsupported fingerprint file type: {filename}")]
    UnsupportedFileType { filename: String, allowed: Vec<String> },
    #[error("voter storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("voter storage is corrupt: {0}")]
    CorruptData(String),
    #[error("voter registry is empty")]
    EmptyRegistry,
    #[error("voter not found: {0}")]
    VoterNotFound(String),
    #[error("voter {voter_id} has already voted")]
    AlreadyVoted { voter_id: String, at: Option<VoteTimestamp> },
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),
    #[error("persisting vote failed: {0}")]
    Persistence(String),
    #[error("validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::MissingInput(_) => 1001,
            ServiceError::UnsupportedFileType { .. } => 1002,
            ServiceError::InvalidCandidate(_) => 1003,
            ServiceError::VoterNotFound(_) => 1004,
            ServiceError::AlreadyVoted { .. } => 1005,
            ServiceError::Validation(_) => 1006,
            ServiceError::StorageUnavailable(_) => 1101,
            ServiceError::CorruptData(_) => 1102,
            ServiceError::EmptyRegistry => 1103,
            ServiceError::Persistence(_) => 1201,
        }
    }

    /// Storage-side failures an operator needs to look at.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            ServiceError::StorageUnavailable(_)
                | ServiceError::CorruptData(_)
                | ServiceError::EmptyRegistry
                | ServiceError::Persistence(_)
        )
    }

    /// Polite text shown to the voter. Never includes internal detail.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::MissingInput(MissingInput::FingerprintFile) => {
                "No fingerprint file provided. Please upload a fingerprint file to identify yourself.".into()
            }
            ServiceError::MissingInput(MissingInput::FingerprintName) => {
                "No file selected. Please choose a fingerprint file.".into()
            }
            ServiceError::MissingInput(MissingInput::VoteData) => {
                "No vote data received. Please try again.".into()
            }
            ServiceError::MissingInput(MissingInput::VoterIdOrCandidate) => {
                "Missing voter ID or candidate selection. Please identify yourself first and select a candidate.".into()
            }
            ServiceError::UnsupportedFileType { allowed, .. } => format!(
                "Invalid file type. Please upload a fingerprint file ({} only).",
                allowed.iter().map(|e| format!(".{e}")).collect::<Vec<_>>().join(", ")
            ),
            ServiceError::StorageUnavailable(_) | ServiceError::CorruptData(_) | ServiceError::EmptyRegistry => {
                "Voter database is empty or corrupted. Please contact administrator.".into()
            }
            ServiceError::VoterNotFound(_) => "Voter not found. Please identify yourself first.".into(),
            ServiceError::AlreadyVoted { at: Some(at), .. } => {
                format!("You have already cast your vote on {at}. Multiple votes are not allowed.")
            }
            ServiceError::AlreadyVoted { at: None, .. } => {
                "You have already cast your vote. Multiple votes are not allowed.".into()
            }
            ServiceError::InvalidCandidate(_) => {
                "Invalid candidate selection. Please select a valid option.".into()
            }
            ServiceError::Persistence(_) => "Error saving vote. Please contact administrator.".into(),
            ServiceError::Validation(msg) => format!("Invalid registration data: {msg}"),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Missing(msg) | StoreError::StorageUnavailable(msg) => ServiceError::StorageUnavailable(msg),
            StoreError::CorruptData(msg) => ServiceError::CorruptData(msg),
            StoreError::StorageWriteError(msg) => ServiceError::Persistence(msg),
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::VoterNotFound(id) => ServiceError::VoterNotFound(id),
            ModelError::AlreadyVoted(voter_id) => ServiceError::AlreadyVoted { voter_id, at: None },
            other => ServiceError::Validation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_service_taxonomy() {
        assert!(matches!(
            ServiceError::from(StoreError::Missing("x".into())),
            ServiceError::StorageUnavailable(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::CorruptData("x".into())),
            ServiceError::CorruptData(_)
        ));
        assert!(matches!(
            ServiceError::from(StoreError::StorageWriteError("x".into())),
            ServiceError::Persistence(_)
        ));
    }

    #[test]
    fn user_messages_hide_internal_detail() {
        let e = ServiceError::CorruptData("expected value at line 3 column 1".into());
        assert!(!e.user_message().contains("line 3"));
        assert!(e.is_storage_fault());

        let e = ServiceError::InvalidCandidate("Candidate Z".into());
        assert!(e.user_message().contains("Invalid candidate"));
        assert!(!e.is_storage_fault());
    }

    #[test]
    fn already_voted_message_includes_timestamp_when_known() {
        let at = VoteTimestamp::parse("2024-05-01 10:00:00").unwrap();
        let e = ServiceError::AlreadyVoted { voter_id: "A1".into(), at: Some(at) };
        assert!(e.user_message().contains("already cast your vote on 2024-05-01 10:00:00"));
    }

    #[test]
    fn unsupported_file_type_lists_extensions() {
        let e = ServiceError::UnsupportedFileType {
            filename: "a.gif".into(),
            allowed: vec!["wsq".into(), "png".into()],
        };
        assert!(e.user_message().contains(".wsq, .png only"));
    }
}
