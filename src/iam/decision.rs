//! Evaluation outcomes
//!
//! [`Decision`] is the tri-state result for a single statement or policy.
//! [`AccessDecision`] is what callers see: a boolean plus the reason, with
//! "nothing applied" already collapsed into an implicit deny.

use super::policy::Effect;
use serde::{Deserialize, Serialize};

/// Per-statement (or per-policy) result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny,
    NotApplicable,
}

impl From<Effect> for Decision {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Allow => Decision::Allow,
            Effect::Deny => Decision::Deny,
        }
    }
}

impl Decision {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Decision::NotApplicable)
    }
}

/// Why an access decision came out the way it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DecisionReason {
    /// The caller supplied no policies at all
    NoPolicies,
    /// A statement applied and its effect decided the request
    Matched {
        policy_id: String,
        statement_index: usize,
        sid: Option<String>,
        effect: Effect,
    },
    /// Policies were present but no statement applied
    ImplicitDeny,
}

/// Final, aggregated answer for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl AccessDecision {
    pub(crate) fn no_policies() -> Self {
        AccessDecision {
            allowed: false,
            reason: DecisionReason::NoPolicies,
        }
    }

    pub(crate) fn implicit_deny() -> Self {
        AccessDecision {
            allowed: false,
            reason: DecisionReason::ImplicitDeny,
        }
    }

    pub(crate) fn matched(
        policy_id: &str,
        statement_index: usize,
        sid: Option<&str>,
        effect: Effect,
    ) -> Self {
        AccessDecision {
            allowed: effect == Effect::Allow,
            reason: DecisionReason::Matched {
                policy_id: policy_id.to_string(),
                statement_index,
                sid: sid.map(str::to_string),
                effect,
            },
        }
    }

    /// True when the deny came from the default rather than a Deny statement
    pub fn is_implicit(&self) -> bool {
        matches!(
            self.reason,
            DecisionReason::NoPolicies | DecisionReason::ImplicitDeny
        )
    }

    /// The tri-state view of this decision
    pub fn decision(&self) -> Decision {
        match &self.reason {
            DecisionReason::Matched { effect, .. } => Decision::from(*effect),
            _ => Decision::NotApplicable,
        }
    }
}
