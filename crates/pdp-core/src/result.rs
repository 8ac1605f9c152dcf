//! Decisions, effects and evaluation results

use crate::obligation::{Advice, Obligation};
use crate::status::Status;
use crate::version::IdReference;
use serde::{Deserialize, Serialize};

/// Authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// Access permitted
    Permit,
    /// Access denied
    Deny,
    /// No policy applied
    NotApplicable,
    /// The decision could not be determined
    Indeterminate,
}

impl Decision {
    /// The effect corresponding to a Permit or Deny decision
    #[must_use]
    pub const fn effect(self) -> Option<Effect> {
        match self {
            Self::Permit => Some(Effect::Permit),
            Self::Deny => Some(Effect::Deny),
            Self::NotApplicable | Self::Indeterminate => None,
        }
    }
}

/// Rule effect, and the effect obligations and advice apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Permit
    Permit,
    /// Deny
    Deny,
}

impl Effect {
    /// The decision produced by this effect
    #[must_use]
    pub const fn decision(self) -> Decision {
        match self {
            Self::Permit => Decision::Permit,
            Self::Deny => Decision::Deny,
        }
    }
}

/// Outcome of evaluating a rule, policy or policy set
///
/// Obligations and advice are only ever attached to Permit and Deny results.
/// Indeterminate results always carry a non-Ok status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    decision: Decision,
    #[serde(default)]
    status: Status,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    obligations: Vec<Obligation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    advice: Vec<Advice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    policy_identifiers: Vec<IdReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    policy_set_identifiers: Vec<IdReference>,
}

impl EvaluationResult {
    /// Create a result with the given decision and an Ok status
    ///
    /// An Indeterminate decision created this way gets a generic
    /// processing-error status.
    #[must_use]
    pub fn new(decision: Decision) -> Self {
        let status = if decision == Decision::Indeterminate {
            Status::processing_error("Indeterminate")
        } else {
            Status::OK
        };
        Self {
            decision,
            status,
            obligations: Vec::new(),
            advice: Vec::new(),
            policy_identifiers: Vec::new(),
            policy_set_identifiers: Vec::new(),
        }
    }

    /// Create a NotApplicable result
    #[must_use]
    pub fn not_applicable() -> Self {
        Self::new(Decision::NotApplicable)
    }

    /// Create an Indeterminate result explaining its cause
    #[must_use]
    pub fn indeterminate(status: Status) -> Self {
        let status = if status.is_ok() {
            Status::processing_error("Indeterminate")
        } else {
            status
        };
        Self {
            status,
            ..Self::new(Decision::Indeterminate)
        }
    }

    /// The decision
    #[must_use]
    pub const fn decision(&self) -> Decision {
        self.decision
    }

    /// The status
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Obligations attached to the decision
    #[must_use]
    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    /// Advice attached to the decision
    #[must_use]
    pub fn advice(&self) -> &[Advice] {
        &self.advice
    }

    /// Identifiers of policies that contributed to the decision
    #[must_use]
    pub fn policy_identifiers(&self) -> &[IdReference] {
        &self.policy_identifiers
    }

    /// Identifiers of policy sets that contributed to the decision
    #[must_use]
    pub fn policy_set_identifiers(&self) -> &[IdReference] {
        &self.policy_set_identifiers
    }

    /// Returns true for Permit or Deny
    #[must_use]
    pub const fn is_decisive(&self) -> bool {
        matches!(self.decision, Decision::Permit | Decision::Deny)
    }

    /// Append obligations; ignored unless the decision is Permit or Deny
    pub fn add_obligations(&mut self, obligations: impl IntoIterator<Item = Obligation>) {
        if self.is_decisive() {
            self.obligations.extend(obligations);
        }
    }

    /// Append advice; ignored unless the decision is Permit or Deny
    pub fn add_advice(&mut self, advice: impl IntoIterator<Item = Advice>) {
        if self.is_decisive() {
            self.advice.extend(advice);
        }
    }

    /// Record a contributing policy
    pub fn add_policy_identifier(&mut self, reference: IdReference) {
        self.policy_identifiers.push(reference);
    }

    /// Record a contributing policy set
    pub fn add_policy_set_identifier(&mut self, reference: IdReference) {
        self.policy_set_identifiers.push(reference);
    }

    /// Fold another result's obligations, advice and identifiers into this one
    ///
    /// Used by combining algorithms when several children contribute to the
    /// same decision. The decision and status of `self` are kept.
    pub fn merge(&mut self, other: EvaluationResult) {
        self.add_obligations(other.obligations);
        self.add_advice(other.advice);
        self.policy_identifiers.extend(other.policy_identifiers);
        self.policy_set_identifiers.extend(other.policy_set_identifiers);
    }
}

impl From<Effect> for EvaluationResult {
    fn from(effect: Effect) -> Self {
        Self::new(effect.decision())
    }
}
