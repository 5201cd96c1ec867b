//! Policy evaluation engine with first-match-wins semantics
//!
//! Evaluates an ordered set of policies to decide whether a subject may
//! perform an action on a resource.
//! - Inactive policies are skipped entirely
//! - Statements are scanned in policy-then-statement order
//! - The first statement whose Action, Resource and Condition all match
//!   decides the request with its Effect
//! - If nothing applies the request is denied
//!
//! There is no "explicit Deny beats Allow" override under the default
//! [`CombiningAlgorithm::FirstMatchWins`]: an Allow declared before a Deny
//! wins. Callers that want deny precedence either order their Deny
//! statements first or opt into [`CombiningAlgorithm::DenyOverrides`].
//!
//! The engine holds no state besides its configuration and performs no I/O,
//! so a shared `&PolicyEngine` may be used from any number of threads.

use super::decision::{AccessDecision, Decision};
use super::policy::{Effect, Policy, Statement};
use super::subject::{EvaluationContext, Subject};
use crate::config::{CombiningAlgorithm, EngineConfig};
use tracing::{debug, trace};

/// A statement that applied to a request, with its position
struct Applicable<'a> {
    policy: &'a Policy,
    index: usize,
    statement: &'a Statement,
}

impl Applicable<'_> {
    fn into_decision(self) -> AccessDecision {
        debug!(
            "Policy '{}' statement {} ({:?}) applies: {:?}",
            self.policy.id, self.index, self.statement.sid, self.statement.effect
        );
        AccessDecision::matched(
            &self.policy.id,
            self.index,
            self.statement.sid.as_deref(),
            self.statement.effect,
        )
    }
}

/// Policy evaluation engine
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: EngineConfig,
}

impl PolicyEngine {
    /// Create an engine with first-match-wins combining
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        PolicyEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate a single statement
    ///
    /// Returns the statement's effect when Action, Resource and Condition
    /// all match, `NotApplicable` otherwise.
    pub fn evaluate_statement(
        &self,
        statement: &Statement,
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> Decision {
        if !statement.action.matches(action) {
            trace!("Statement {:?} skipped: action '{}' not matched", statement.sid, action);
            return Decision::NotApplicable;
        }

        if !statement.resource.matches(resource) {
            trace!(
                "Statement {:?} skipped: resource '{}' not matched",
                statement.sid,
                resource
            );
            return Decision::NotApplicable;
        }

        if let Some(condition) = &statement.condition {
            if let Some(failed) = condition.first_failure(subject, context) {
                trace!("Statement {:?} skipped: condition {} failed", statement.sid, failed);
                return Decision::NotApplicable;
            }
        }

        Decision::from(statement.effect)
    }

    /// Evaluate one policy on its own
    ///
    /// Returns the effect of its first applicable statement, or
    /// `NotApplicable` when the policy is inactive or nothing applies.
    pub fn evaluate_policy(
        &self,
        policy: &Policy,
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> Decision {
        if !policy.is_active {
            return Decision::NotApplicable;
        }

        policy
            .statements
            .iter()
            .map(|stmt| self.evaluate_statement(stmt, subject, action, resource, context))
            .find(Decision::is_applicable)
            .unwrap_or(Decision::NotApplicable)
    }

    /// Decide a request against an ordered policy set, with the reason
    ///
    /// # Examples
    ///
    /// ```
    /// use abac_policy::iam::{EvaluationContext, Policy, PolicyEngine, Statement, Subject};
    ///
    /// let engine = PolicyEngine::new();
    /// let policies = vec![
    ///     Policy::new("readers", "Readers").with_statement(Statement::allow(["read"], ["teams"])),
    ///     Policy::new("lockdown", "Lockdown").with_statement(Statement::deny("*", "*")),
    /// ];
    /// let subject = Subject::new("u1");
    /// let ctx = EvaluationContext::new();
    ///
    /// assert!(engine.decide(&policies, &subject, "read", "teams", &ctx).allowed);
    /// assert!(!engine.decide(&policies, &subject, "delete", "teams", &ctx).allowed);
    /// ```
    pub fn decide(
        &self,
        policies: &[Policy],
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> AccessDecision {
        if policies.is_empty() {
            debug!("No policies supplied; denying {} on {}", action, resource);
            return AccessDecision::no_policies();
        }

        let mut applicable = policies
            .iter()
            .filter(|policy| policy.is_active)
            .flat_map(|policy| {
                policy
                    .statements
                    .iter()
                    .enumerate()
                    .map(move |(index, statement)| Applicable {
                        policy,
                        index,
                        statement,
                    })
            })
            .filter(|candidate| {
                self.evaluate_statement(candidate.statement, subject, action, resource, context)
                    .is_applicable()
            });

        let winner = match self.config.combining {
            CombiningAlgorithm::FirstMatchWins => applicable.next(),
            CombiningAlgorithm::DenyOverrides => {
                let mut first_allow = None;
                let mut deny = None;
                for candidate in applicable {
                    if candidate.statement.effect == Effect::Deny {
                        deny = Some(candidate);
                        break;
                    }
                    first_allow.get_or_insert(candidate);
                }
                deny.or(first_allow)
            }
        };

        match winner {
            Some(candidate) => candidate.into_decision(),
            None => {
                debug!("No statement applied; implicit deny for {} on {}", action, resource);
                AccessDecision::implicit_deny()
            }
        }
    }

    /// Check whether the subject may perform `action` on `resource`
    pub fn can_perform(
        &self,
        policies: &[Policy],
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> bool {
        self.decide(policies, subject, action, resource, context).allowed
    }
}

/// Evaluate a request with the default first-match-wins engine
pub fn evaluate(
    policies: &[Policy],
    subject: &Subject,
    action: &str,
    resource: &str,
    context: &EvaluationContext,
) -> bool {
    PolicyEngine::new().can_perform(policies, subject, action, resource, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::{Condition, DecisionReason};

    fn ctx() -> EvaluationContext {
        EvaluationContext::new()
    }

    #[test]
    fn test_simple_allow() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", "Readers").with_statement(Statement::allow(["read"], ["soldiers"]))];
        let subject = Subject::new("u1");

        assert!(engine.can_perform(&policies, &subject, "read", "soldiers", &ctx()));
        assert!(!engine.can_perform(&policies, &subject, "write", "soldiers", &ctx()));
        assert!(!engine.can_perform(&policies, &subject, "read", "duties", &ctx()));
    }

    #[test]
    fn test_empty_policy_set() {
        let engine = PolicyEngine::new();
        let decision = engine.decide(&[], &Subject::new("u1"), "read", "soldiers", &ctx());

        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::NoPolicies);
    }

    #[test]
    fn test_policy_without_statements_never_matches() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", "Empty")];
        let decision = engine.decide(&policies, &Subject::new("u1"), "read", "soldiers", &ctx());

        assert_eq!(decision.reason, DecisionReason::ImplicitDeny);
    }

    #[test]
    fn test_first_match_within_policy() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", "Mixed")
            .with_statement(Statement::allow("read", "*"))
            .with_statement(Statement::deny("read", "secrets"))];

        // Allow is declared first, so it wins even for the denied resource
        assert!(engine.can_perform(&policies, &Subject::new("u1"), "read", "secrets", &ctx()));
    }

    #[test]
    fn test_deny_first_ordering() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", "Mixed")
            .with_statement(Statement::deny("read", "secrets"))
            .with_statement(Statement::allow("read", "*"))];

        assert!(!engine.can_perform(&policies, &Subject::new("u1"), "read", "secrets", &ctx()));
        assert!(engine.can_perform(&policies, &Subject::new("u1"), "read", "teams", &ctx()));
    }

    #[test]
    fn test_condition_failure_falls_through() {
        let engine = PolicyEngine::new();
        let policies = vec![Policy::new("p1", "Admins then everyone")
            .with_statement(
                Statement::allow("*", "*").with_condition(Condition::new().role_equals("admin")),
            )
            .with_statement(Statement::deny("delete", "*").with_sid("no-delete"))];

        let admin = Subject::new("a1").with_role("admin");
        let soldier = Subject::new("s1").with_role("soldier");

        assert!(engine.can_perform(&policies, &admin, "delete", "soldiers", &ctx()));

        let decision = engine.decide(&policies, &soldier, "delete", "soldiers", &ctx());
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason,
            DecisionReason::Matched {
                policy_id: "p1".to_string(),
                statement_index: 1,
                sid: Some("no-delete".to_string()),
                effect: Effect::Deny,
            }
        );
    }

    #[test]
    fn test_inactive_policy_skipped() {
        let engine = PolicyEngine::new();
        let policies = vec![
            Policy::new("p1", "Disabled").inactive().with_statement(Statement::allow("*", "*")),
        ];
        let subject = Subject::new("u1");

        assert!(!engine.can_perform(&policies, &subject, "read", "teams", &ctx()));
        assert_eq!(
            engine.evaluate_policy(&policies[0], &subject, "read", "teams", &ctx()),
            Decision::NotApplicable
        );
    }

    #[test]
    fn test_evaluate_policy_tri_state() {
        let engine = PolicyEngine::new();
        let policy = Policy::new("p1", "Mixed")
            .with_statement(Statement::deny("delete", "*"))
            .with_statement(Statement::allow("read", "*"));
        let subject = Subject::new("u1");

        assert_eq!(engine.evaluate_policy(&policy, &subject, "delete", "x", &ctx()), Decision::Deny);
        assert_eq!(engine.evaluate_policy(&policy, &subject, "read", "x", &ctx()), Decision::Allow);
        assert_eq!(
            engine.evaluate_policy(&policy, &subject, "update", "x", &ctx()),
            Decision::NotApplicable
        );
    }

    #[test]
    fn test_deny_overrides_opt_in() {
        let engine =
            PolicyEngine::with_config(EngineConfig::default().with_combining(CombiningAlgorithm::DenyOverrides));
        let policies = vec![
            Policy::new("p1", "Readers").with_statement(Statement::allow(["read"], ["teams"])),
            Policy::new("p2", "Lockdown").with_statement(Statement::deny("*", "*")),
        ];
        let subject = Subject::new("u1");

        let decision = engine.decide(&policies, &subject, "read", "teams", &ctx());
        assert!(!decision.allowed);
        assert!(matches!(decision.reason, DecisionReason::Matched { ref policy_id, .. } if policy_id == "p2"));
    }

    #[test]
    fn test_deny_overrides_reports_first_allow() {
        let engine =
            PolicyEngine::with_config(EngineConfig::default().with_combining(CombiningAlgorithm::DenyOverrides));
        let policies = vec![
            Policy::new("p1", "Readers").with_statement(Statement::allow("read", "*")),
            Policy::new("p2", "More readers").with_statement(Statement::allow("read", "teams")),
        ];

        let decision = engine.decide(&policies, &Subject::new("u1"), "read", "teams", &ctx());
        assert!(decision.allowed);
        assert!(matches!(decision.reason, DecisionReason::Matched { ref policy_id, .. } if policy_id == "p1"));
    }

    #[test]
    fn test_free_evaluate_function() {
        let policies = vec![Policy::new("p1", "All").with_statement(Statement::allow("*", "*"))];
        assert!(evaluate(&policies, &Subject::anonymous(), "anything", "anywhere", &ctx()));
        assert!(!evaluate(&[], &Subject::anonymous(), "anything", "anywhere", &ctx()));
    }
}
