//! Wire shapes exchanged with the voting front end.
//!
//! Every outcome, including failures, becomes a `{success, message}` body;
//! errors are rendered through [`ServiceError::user_message`].

use models::CandidateList;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{MissingInput, ServiceError};
use crate::identification::Identification;
use crate::voting::CastVote;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
}

impl IdentifyResponse {
    fn failure(message: String) -> Self {
        Self { success: false, message, voter_id: None, voter_name: None }
    }

    pub fn from_outcome(outcome: &Result<Identification, ServiceError>) -> Self {
        match outcome {
            Ok(Identification::Eligible { voter_id, name }) => Self {
                success: true,
                message: "Identity verified successfully. You can now cast your vote.".into(),
                voter_id: Some(voter_id.clone()),
                voter_name: Some(name.clone()),
            },
            Ok(Identification::NotFound) => Self::failure(
                "Fingerprint not recognized. You are not registered to vote or the fingerprint file name does not match our records.".into(),
            ),
            Ok(Identification::AlreadyVoted { timestamp }) => Self::failure(format!(
                "You have already cast your vote on {timestamp}. Multiple votes are not allowed."
            )),
            Err(e) => Self::failure(e.user_message()),
        }
    }
}

/// Body of a cast-vote request, kept as a loose JSON object so that empty
/// bodies, blank fields and non-string values each get their own message
/// instead of a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteRequest(Map<String, Value>);

impl VoteRequest {
    pub fn new(voter_id: &str, candidate: &str) -> Self {
        let mut body = Map::new();
        body.insert("voter_id".into(), Value::from(voter_id));
        body.insert("candidate".into(), Value::from(candidate));
        Self(body)
    }

    /// Field value, `None` when absent or blank (null, false, 0, "", [], {}).
    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| match v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        })
    }

    /// Extract `(voter_id, candidate)`.
    ///
    /// Checks run in the same order as a vote: empty body, missing fields,
    /// candidate validity, then the voter id. An id that is not a string can
    /// never match a registered voter.
    pub fn ballot(&self, candidates: &CandidateList) -> Result<(&str, &str), ServiceError> {
        if self.0.is_empty() {
            return Err(ServiceError::MissingInput(MissingInput::VoteData));
        }
        let (Some(voter_id), Some(candidate)) = (self.field("voter_id"), self.field("candidate")) else {
            return Err(ServiceError::MissingInput(MissingInput::VoterIdOrCandidate));
        };
        let candidate = match candidate {
            Value::String(c) if candidates.contains(c) => c.as_str(),
            Value::String(c) => return Err(ServiceError::InvalidCandidate(c.clone())),
            other => return Err(ServiceError::InvalidCandidate(other.to_string())),
        };
        match voter_id {
            Value::String(id) => Ok((id.as_str(), candidate)),
            other => Err(ServiceError::VoterNotFound(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
}

impl VoteResponse {
    pub fn from_outcome(outcome: &Result<CastVote, ServiceError>) -> Self {
        match outcome {
            Ok(cast) => Self {
                success: true,
                message: format!(
                    "Your vote for {} has been cast successfully! Thank you for participating in the election.",
                    cast.candidate
                ),
            },
            Err(e) => Self { success: false, message: e.user_message() },
        }
    }
}
