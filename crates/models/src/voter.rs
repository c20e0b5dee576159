use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::timestamp::VoteTimestamp;

fn default_name() -> String {
    "Registered Voter".to_string()
}

/// One registered voter and their voting status.
///
/// `id`, `name` and `fingerprint_ref` never change after registration. The
/// voting fields are private: the only way to change them is
/// [`VoterRecord::record_vote`], which enforces the single false → true
/// transition.
///
/// Legacy ledgers used `aadhar` for the id and `fingerprint_file` for the
/// fingerprint reference; both are accepted when reading. Any other keys a
/// record carries (constituency, age, ...) are kept and written back as is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterRecord {
    #[serde(alias = "aadhar")]
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(alias = "fingerprint_file")]
    pub fingerprint_ref: String,
    #[serde(default)]
    voted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vote_candidate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vote_timestamp: Option<VoteTimestamp>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl VoterRecord {
    /// A freshly registered, not-yet-voted voter.
    pub fn new(id: impl Into<String>, name: impl Into<String>, fingerprint_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fingerprint_ref: fingerprint_ref.into(),
            voted: false,
            vote_candidate: None,
            vote_timestamp: None,
            extra: Map::new(),
        }
    }

    pub fn has_voted(&self) -> bool {
        self.voted
    }

    pub fn vote_candidate(&self) -> Option<&str> {
        self.vote_candidate.as_deref()
    }

    pub fn vote_timestamp(&self) -> Option<VoteTimestamp> {
        self.vote_timestamp
    }

    /// Apply the voted transition. Fails without touching the record if the
    /// voter already voted.
    pub fn record_vote(&mut self, candidate: impl Into<String>, at: VoteTimestamp) -> Result<(), ModelError> {
        if self.voted {
            return Err(ModelError::AlreadyVoted(self.id.clone()));
        }
        self.voted = true;
        self.vote_candidate = Some(candidate.into());
        self.vote_timestamp = Some(at);
        Ok(())
    }

    /// `voted` is false exactly when both vote fields are unset.
    pub fn check_consistency(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::Validation("voter id must not be empty".into()));
        }
        if self.fingerprint_ref.trim().is_empty() {
            return Err(ModelError::Validation(format!("voter {} has no fingerprint reference", self.id)));
        }
        let reason = match (self.voted, self.vote_candidate.is_some(), self.vote_timestamp.is_some()) {
            (false, false, false) | (true, true, true) => return Ok(()),
            (false, _, _) => "vote details present on a voter that has not voted",
            (true, false, _) => "voted without a recorded candidate",
            (true, true, false) => "voted without a recorded timestamp",
        };
        Err(ModelError::Inconsistent { id: self.id.clone(), reason: reason.into() })
    }
}

/// The full ledger: records in registration order, indexed by id and by
/// fingerprint reference.
///
/// A `VoterSet` can only be built through [`VoterSet::from_records`] (which
/// deserialization also goes through), so a value of this type always has
/// unique ids, unique fingerprint references and consistent voting fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VoterRecord>", into = "Vec<VoterRecord>")]
pub struct VoterSet {
    records: Vec<VoterRecord>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
    #[serde(skip)]
    by_fingerprint: HashMap<String, usize>,
}

impl VoterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<VoterRecord>) -> Result<Self, ModelError> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    /// Add a record, rejecting duplicates and inconsistent voting state.
    pub fn insert(&mut self, record: VoterRecord) -> Result<(), ModelError> {
        record.check_consistency()?;
        if self.by_id.contains_key(&record.id) {
            return Err(ModelError::DuplicateVoterId(record.id));
        }
        if self.by_fingerprint.contains_key(&record.fingerprint_ref) {
            return Err(ModelError::DuplicateFingerprint(record.fingerprint_ref));
        }
        let idx = self.records.len();
        self.by_id.insert(record.id.clone(), idx);
        self.by_fingerprint.insert(record.fingerprint_ref.clone(), idx);
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VoterRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn find_by_fingerprint(&self, fingerprint_ref: &str) -> Option<&VoterRecord> {
        self.by_fingerprint.get(fingerprint_ref).map(|&i| &self.records[i])
    }

    /// Mark `id` as voted for `candidate`. Candidate validity is the caller's
    /// concern; this only guards the state transition.
    pub fn record_vote(&mut self, id: &str, candidate: &str, at: VoteTimestamp) -> Result<&VoterRecord, ModelError> {
        let idx = *self.by_id.get(id).ok_or_else(|| ModelError::VoterNotFound(id.to_string()))?;
        let record = &mut self.records[idx];
        record.record_vote(candidate, at)?;
        Ok(record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoterRecord> {
        self.records.iter()
    }

    pub fn voted_count(&self) -> usize {
        self.records.iter().filter(|r| r.voted).count()
    }
}

impl TryFrom<Vec<VoterRecord>> for VoterSet {
    type Error = ModelError;

    fn try_from(records: Vec<VoterRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<VoterSet> for Vec<VoterRecord> {
    fn from(set: VoterSet) -> Self {
        set.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> VoteTimestamp {
        VoteTimestamp::parse(s).unwrap()
    }

    #[test]
    fn record_vote_is_one_shot() {
        let mut r = VoterRecord::new("A1", "Asha", "f1.jpg");
        r.record_vote("Candidate B", ts("2024-05-01 10:00:00")).unwrap();
        assert!(r.has_voted());
        let err = r.record_vote("Candidate C", ts("2024-05-01 11:00:00")).unwrap_err();
        assert_eq!(err, ModelError::AlreadyVoted("A1".into()));
        assert_eq!(r.vote_candidate(), Some("Candidate B"));
        assert_eq!(r.vote_timestamp(), Some(ts("2024-05-01 10:00:00")));
    }

    #[test]
    fn set_rejects_duplicate_ids_and_fingerprints() {
        let dup_id = VoterSet::from_records(vec![
            VoterRecord::new("A1", "a", "f1.jpg"),
            VoterRecord::new("A1", "b", "f2.jpg"),
        ]);
        assert!(matches!(dup_id, Err(ModelError::DuplicateVoterId(id)) if id == "A1"));

        let dup_fp = VoterSet::from_records(vec![
            VoterRecord::new("A1", "a", "f1.jpg"),
            VoterRecord::new("A2", "b", "f1.jpg"),
        ]);
        assert!(matches!(dup_fp, Err(ModelError::DuplicateFingerprint(fp)) if fp == "f1.jpg"));
    }

    #[test]
    fn deserialize_accepts_legacy_keys_and_defaults() {
        let raw = r#"[
            {"aadhar": "1234", "fingerprint_file": "x.wsq"},
            {"id": "5678", "name": "Ravi", "fingerprint_ref": "y.png", "voted": true,
             "vote_candidate": "NOTA", "vote_timestamp": "2024-05-01 08:30:00"}
        ]"#;
        let set: VoterSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.len(), 2);
        let first = set.find_by_fingerprint("x.wsq").unwrap();
        assert_eq!(first.id, "1234");
        assert_eq!(first.name, "Registered Voter");
        assert!(!first.has_voted());
        assert_eq!(set.get("5678").unwrap().vote_candidate(), Some("NOTA"));
        assert_eq!(set.voted_count(), 1);
    }

    #[test]
    fn deserialize_rejects_inconsistent_or_duplicate_ledgers() {
        let half_voted = r#"[{"id": "1", "fingerprint_ref": "a.jpg", "voted": true}]"#;
        assert!(serde_json::from_str::<VoterSet>(half_voted).is_err());

        let ghost_vote = r#"[{"id": "1", "fingerprint_ref": "a.jpg", "voted": false, "vote_candidate": "NOTA"}]"#;
        assert!(serde_json::from_str::<VoterSet>(ghost_vote).is_err());

        let dup = r#"[{"id": "1", "fingerprint_ref": "a.jpg"}, {"id": "2", "fingerprint_ref": "a.jpg"}]"#;
        assert!(serde_json::from_str::<VoterSet>(dup).is_err());
    }

    #[test]
    fn serializes_as_ordered_array_without_unset_vote_fields() {
        let mut set = VoterSet::from_records(vec![
            VoterRecord::new("B", "b", "b.jpg"),
            VoterRecord::new("A", "a", "a.jpg"),
        ])
        .unwrap();
        set.record_vote("A", "NOTA", ts("2024-05-01 09:00:00")).unwrap();
        let v = serde_json::to_value(&set).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr[0]["id"], "B");
        assert!(arr[0].get("vote_candidate").is_none());
        assert_eq!(arr[1]["vote_timestamp"], "2024-05-01 09:00:00");

        let back: VoterSet = serde_json::from_value(v).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn unknown_record_keys_survive_a_vote() {
        let raw = r#"[{"aadhar": "1234", "name": "Ravi", "fingerprint_file": "r.jpg",
                       "constituency": "North", "age": 40}]"#;
        let mut set: VoterSet = serde_json::from_str(raw).unwrap();
        set.record_vote("1234", "NOTA", ts("2024-05-01 09:00:00")).unwrap();

        let v = serde_json::to_value(&set).unwrap();
        let rec = &v.as_array().unwrap()[0];
        assert_eq!(rec["id"], "1234");
        assert_eq!(rec["constituency"], "North");
        assert_eq!(rec["age"], 40);
        assert_eq!(rec["vote_candidate"], "NOTA");
        assert!(rec.get("aadhar").is_none());
    }

    #[test]
    fn record_vote_unknown_voter() {
        let mut set = VoterSet::new();
        let err = set.record_vote("nobody", "NOTA", VoteTimestamp::now()).unwrap_err();
        assert_eq!(err, ModelError::VoterNotFound("nobody".into()));
    }
}
