use std::sync::Arc;

use models::{CandidateList, VoteTimestamp};
use tracing::{debug, info, instrument, warn};

use crate::errors::{MissingInput, ServiceError};
use crate::ledger::VoterLedger;
use crate::metrics::{VOTES_CAST_TOTAL, VOTE_REJECTIONS_TOTAL};
use crate::responses::VoteRequest;

/// A vote that has been durably recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVote {
    pub voter_id: String,
    pub candidate: String,
    pub timestamp: VoteTimestamp,
}

/// The only component allowed to move a voter from "not voted" to "voted".
pub struct VotingService {
    ledger: Arc<VoterLedger>,
    candidates: CandidateList,
}

impl VotingService {
    pub fn new(ledger: Arc<VoterLedger>, candidates: CandidateList) -> Self {
        Self { ledger, candidates }
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Record a vote for `voter_id`.
    ///
    /// The voted check runs against state loaded under the ledger's writer
    /// lock, so of any number of concurrent calls for one voter at most one
    /// succeeds. A failed save returns [`ServiceError::Persistence`] and
    /// leaves the voter able to vote again.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::{CandidateList, VoterRecord, VoterSet};
    /// use service::{ledger::VoterLedger, storage::MemoryVoterStore, voting::VotingService};
    ///
    /// let voters = VoterSet::from_records(vec![VoterRecord::new("A1", "Asha", "f1.jpg")]).unwrap();
    /// let ledger = VoterLedger::new(Arc::new(MemoryVoterStore::with_voters(&voters)));
    /// let candidates = CandidateList::new(["Candidate A", "Candidate B"], "NOTA").unwrap();
    /// let svc = VotingService::new(ledger, candidates);
    ///
    /// let cast = tokio_test::block_on(svc.cast_vote("A1", "Candidate B")).unwrap();
    /// assert_eq!(cast.candidate, "Candidate B");
    /// assert!(tokio_test::block_on(svc.cast_vote("A1", "Candidate B")).is_err());
    /// ```
    #[instrument(skip(self, candidate))]
    pub async fn cast_vote(&self, voter_id: &str, candidate: &str) -> Result<CastVote, ServiceError> {
        let result = self.try_cast(voter_id, candidate).await;
        self.observe(&result);
        result
    }

    /// Cast a vote straight from a request body, reporting malformed bodies
    /// through the same errors and metrics as [`VotingService::cast_vote`].
    #[instrument(skip_all)]
    pub async fn cast_vote_request(&self, req: &VoteRequest) -> Result<CastVote, ServiceError> {
        let result = match req.ballot(&self.candidates) {
            Ok((voter_id, candidate)) => self.try_cast(voter_id, candidate).await,
            Err(e) => Err(e),
        };
        self.observe(&result);
        result
    }

    fn observe(&self, result: &Result<CastVote, ServiceError>) {
        match result {
            Ok(cast) => {
                VOTES_CAST_TOTAL.inc();
                info!(timestamp = %cast.timestamp, "vote cast");
                debug!(candidate = %cast.candidate, "vote choice");
            }
            Err(e) => {
                VOTE_REJECTIONS_TOTAL.with_label_values(&[rejection_label(e)]).inc();
                if e.is_storage_fault() {
                    warn!(code = e.code(), error = %e, "vote not recorded: storage fault");
                } else {
                    info!(code = e.code(), error = %e, "vote rejected");
                }
            }
        }
    }

    async fn try_cast(&self, voter_id: &str, candidate: &str) -> Result<CastVote, ServiceError> {
        if voter_id.trim().is_empty() || candidate.trim().is_empty() {
            return Err(ServiceError::MissingInput(MissingInput::VoterIdOrCandidate));
        }
        if !self.candidates.contains(candidate) {
            return Err(ServiceError::InvalidCandidate(candidate.to_string()));
        }

        self.ledger
            .update(|voters| {
                let record = voters
                    .get(voter_id)
                    .ok_or_else(|| ServiceError::VoterNotFound(voter_id.to_string()))?;
                if record.has_voted() {
                    return Err(ServiceError::AlreadyVoted {
                        voter_id: voter_id.to_string(),
                        at: record.vote_timestamp(),
                    });
                }
                let timestamp = VoteTimestamp::now();
                voters.record_vote(voter_id, candidate, timestamp)?;
                Ok(CastVote { voter_id: voter_id.to_string(), candidate: candidate.to_string(), timestamp })
            })
            .await
    }
}

fn rejection_label(e: &ServiceError) -> &'static str {
    match e {
        ServiceError::MissingInput(_) => "missing_input",
        ServiceError::InvalidCandidate(_) => "invalid_candidate",
        ServiceError::VoterNotFound(_) => "voter_not_found",
        ServiceError::AlreadyVoted { .. } => "already_voted",
        ServiceError::Persistence(_) => "persistence",
        _ => "storage",
    }
}
