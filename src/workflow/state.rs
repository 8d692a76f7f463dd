use serde::{Deserialize, Serialize};

/// Where one save attempt currently stands.
///
/// `GeneratingName`, `Validating`, and `Saving` are the pending phases: each
/// corresponds to exactly one in-flight external call, and while one is
/// active no second call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    GeneratingName,
    Ready,
    Validating,
    Saving,
    Succeeded,
    Failed,
}

impl Phase {
    /// True while an external call is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, Phase::GeneratingName | Phase::Validating | Phase::Saving)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded)
    }
}

/// Why an attempt failed. Every `Phase::Failed` carries exactly one of
/// these; there is no silent failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Candidate name was empty or whitespace-only. Raised locally, no
    /// external call made.
    Validation,
    /// The normalized name already exists for this owner. The create was
    /// never attempted.
    Conflict,
    /// An external call failed at the infrastructure level. Retryable.
    Transient,
    /// The store reached a decision and refused the write (including a
    /// duplicate discovered after the pre-check passed).
    Persistence,
}

/// A failure with its user-displayable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub reason: FailureReason,
    pub message: String,
}

impl Failure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read-only view of the workflow handed to the presentation layer.
///
/// Every failed snapshot carries its `Failure`; every recovered snapshot
/// (the user edited the name or a later call succeeded) clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub candidate_name: String,
    pub error: Option<Failure>,
}

impl Snapshot {
    pub fn initial() -> Self {
        Self {
            phase: Phase::Idle,
            candidate_name: String::new(),
            error: None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.error.as_ref().map(|failure| failure.reason)
    }
}
