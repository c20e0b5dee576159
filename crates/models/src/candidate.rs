use serde::Serialize;

use crate::errors::ModelError;

/// Ordered, fixed set of valid ballot labels, one of which is the abstention
/// ("none of the above") option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateList {
    labels: Vec<String>,
    abstain: String,
}

impl CandidateList {
    /// Build a list; `abstain` is appended when it is not already present.
    pub fn new<I, S>(candidates: I, abstain: impl Into<String>) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let abstain = abstain.into();
        if abstain.trim().is_empty() {
            return Err(ModelError::Validation("abstain label required".into()));
        }
        let mut labels: Vec<String> = Vec::new();
        for label in candidates.into_iter().map(Into::into) {
            if label.trim().is_empty() {
                return Err(ModelError::Validation("candidate label must not be empty".into()));
            }
            if labels.contains(&label) {
                return Err(ModelError::Validation(format!("candidate {label:?} listed twice")));
            }
            labels.push(label);
        }
        if !labels.contains(&abstain) {
            labels.push(abstain.clone());
        }
        if labels.len() < 2 {
            return Err(ModelError::Validation("ballot needs at least one candidate besides abstention".into()));
        }
        Ok(Self { labels, abstain })
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_abstain(&self, label: &str) -> bool {
        self.abstain == label
    }

    pub fn abstain(&self) -> &str {
        &self.abstain
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
