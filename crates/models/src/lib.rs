//! Domain types for the voter ledger.
//!
//! Everything here is plain data plus the invariants that must hold for it;
//! persistence and locking live in the `service` crate.

pub mod errors;
pub mod candidate;
pub mod timestamp;
pub mod voter;

pub use candidate::CandidateList;
pub use timestamp::VoteTimestamp;
pub use voter::{VoterRecord, VoterSet};
