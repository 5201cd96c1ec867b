//! Condition evaluation for policy statements
//!
//! A condition is a conjunction of named predicates over the requesting
//! [`Subject`] and the per-call [`EvaluationContext`]:
//! - role equality and membership (`roleEquals`, `roleIn`, `roleNotIn`)
//! - organizational scope (`scopeIdEquals`, `scopeIdIn`)
//! - identity (`subjectIdEquals`, `subjectIdIn`)
//! - ownership against the context owner (`isOwner`)
//! - boolean subject flags (`hasLinkedRecord`, `isActive`, `hasCapabilities`)
//! - time window against the caller-supplied clock (`timeBefore`, `timeAfter`)
//!
//! Absent predicates are not evaluated. A predicate whose input is missing
//! (no role on the subject, no `now` in the context, ...) does not hold.
//! The one exception is `isOwner`, where a context without an owner simply
//! means the subject is not the owner.

use super::subject::{EvaluationContext, Subject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Legacy template string meaning "the requesting subject's own scope"
pub const OWN_SCOPE_TEMPLATE: &str = "${subject.scopeId}";

/// Expected scope for `scopeIdEquals`
///
/// Serialized as `"ownScope"` or `{"literal": "<scope id>"}`. When reading,
/// a plain string is also accepted: the legacy template
/// [`OWN_SCOPE_TEMPLATE`] maps to `OwnScope`, anything else to `Literal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeTarget {
    /// Resolved to the subject's own scope at evaluation time
    OwnScope,
    /// A fixed scope id
    Literal(String),
}

impl<'de> Deserialize<'de> for ScopeTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        enum Tagged {
            OwnScope,
            Literal(String),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Tagged(Tagged),
            Plain(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Tagged(Tagged::OwnScope) => ScopeTarget::OwnScope,
            Repr::Tagged(Tagged::Literal(scope)) => ScopeTarget::Literal(scope),
            Repr::Plain(template) if template == OWN_SCOPE_TEMPLATE => ScopeTarget::OwnScope,
            Repr::Plain(scope) => ScopeTarget::Literal(scope),
        })
    }
}

/// Names of the individual predicates, used to report which one failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    RoleEquals,
    RoleIn,
    RoleNotIn,
    ScopeIdEquals,
    ScopeIdIn,
    SubjectIdEquals,
    SubjectIdIn,
    IsOwner,
    HasLinkedRecord,
    IsActive,
    HasCapabilities,
    TimeBefore,
    TimeAfter,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Predicate::RoleEquals => "roleEquals",
            Predicate::RoleIn => "roleIn",
            Predicate::RoleNotIn => "roleNotIn",
            Predicate::ScopeIdEquals => "scopeIdEquals",
            Predicate::ScopeIdIn => "scopeIdIn",
            Predicate::SubjectIdEquals => "subjectIdEquals",
            Predicate::SubjectIdIn => "subjectIdIn",
            Predicate::IsOwner => "isOwner",
            Predicate::HasLinkedRecord => "hasLinkedRecord",
            Predicate::IsActive => "isActive",
            Predicate::HasCapabilities => "hasCapabilities",
            Predicate::TimeBefore => "timeBefore",
            Predicate::TimeAfter => "timeAfter",
        };
        f.write_str(name)
    }
}

/// Condition block of a statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_in: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_not_in: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id_equals: Option<ScopeTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id_in: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id_equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id_in: Option<Vec<String>>,
    /// `true`: subject must own the resource, `false`: subject must not.
    /// A context with no `ownerId` counts as "not the owner".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_linked_record: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Every listed capability flag must be present and enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_capabilities: Option<Vec<String>>,
    /// Holds while `now` is strictly earlier than this bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_before: Option<DateTime<Utc>>,
    /// Holds once `now` is strictly later than this bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_after: Option<DateTime<Utc>>,
}

impl Condition {
    /// Create a condition with no predicates (always satisfied)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_equals(mut self, role: impl Into<String>) -> Self {
        self.role_equals = Some(role.into());
        self
    }

    pub fn role_in<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_in = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn role_not_in<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_not_in = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    /// Require the subject to be in exactly this scope
    pub fn scope_id_equals(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id_equals = Some(ScopeTarget::Literal(scope_id.into()));
        self
    }

    /// Require the subject's own scope (self-referential "own unit" rule)
    pub fn own_scope(mut self) -> Self {
        self.scope_id_equals = Some(ScopeTarget::OwnScope);
        self
    }

    pub fn scope_id_in<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope_id_in = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    pub fn subject_id_equals(mut self, id: impl Into<String>) -> Self {
        self.subject_id_equals = Some(id.into());
        self
    }

    pub fn subject_id_in<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subject_id_in = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_owner(mut self, expected: bool) -> Self {
        self.is_owner = Some(expected);
        self
    }

    pub fn has_linked_record(mut self, expected: bool) -> Self {
        self.has_linked_record = Some(expected);
        self
    }

    pub fn is_active(mut self, expected: bool) -> Self {
        self.is_active = Some(expected);
        self
    }

    pub fn has_capabilities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.has_capabilities = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn time_before(mut self, bound: DateTime<Utc>) -> Self {
        self.time_before = Some(bound);
        self
    }

    pub fn time_after(mut self, bound: DateTime<Utc>) -> Self {
        self.time_after = Some(bound);
        self
    }

    /// True if no predicate is set
    pub fn is_empty(&self) -> bool {
        self == &Condition::default()
    }

    /// Evaluate every present predicate (logical AND)
    pub fn satisfies(&self, subject: &Subject, context: &EvaluationContext) -> bool {
        self.first_failure(subject, context).is_none()
    }

    /// The first predicate that does not hold, in declaration order
    ///
    /// Returns `None` when the condition is satisfied.
    pub fn first_failure(
        &self,
        subject: &Subject,
        context: &EvaluationContext,
    ) -> Option<Predicate> {
        let role = subject.role.as_deref();
        let scope = subject.scope_id.as_deref();
        let id = subject.id.as_deref();

        if let Some(expected) = &self.role_equals {
            if role != Some(expected.as_str()) {
                return Some(Predicate::RoleEquals);
            }
        }

        if let Some(roles) = &self.role_in {
            if !role.is_some_and(|r| contains(roles, r)) {
                return Some(Predicate::RoleIn);
            }
        }

        if let Some(roles) = &self.role_not_in {
            if !role.is_some_and(|r| !contains(roles, r)) {
                return Some(Predicate::RoleNotIn);
            }
        }

        if let Some(target) = &self.scope_id_equals {
            let holds = match (target, scope) {
                (_, None) => false,
                (ScopeTarget::OwnScope, Some(_)) => true,
                (ScopeTarget::Literal(expected), Some(actual)) => expected == actual,
            };
            if !holds {
                return Some(Predicate::ScopeIdEquals);
            }
        }

        if let Some(scopes) = &self.scope_id_in {
            if !scope.is_some_and(|s| contains(scopes, s)) {
                return Some(Predicate::ScopeIdIn);
            }
        }

        if let Some(expected) = &self.subject_id_equals {
            if id != Some(expected.as_str()) {
                return Some(Predicate::SubjectIdEquals);
            }
        }

        if let Some(ids) = &self.subject_id_in {
            if !id.is_some_and(|i| contains(ids, i)) {
                return Some(Predicate::SubjectIdIn);
            }
        }

        if let Some(expected) = self.is_owner {
            let holds = match id {
                Some(id) => (context.owner_id.as_deref() == Some(id)) == expected,
                None => false,
            };
            if !holds {
                return Some(Predicate::IsOwner);
            }
        }

        if let Some(expected) = self.has_linked_record {
            if subject.has_linked_record != Some(expected) {
                return Some(Predicate::HasLinkedRecord);
            }
        }

        if let Some(expected) = self.is_active {
            if subject.is_active != Some(expected) {
                return Some(Predicate::IsActive);
            }
        }

        if let Some(names) = &self.has_capabilities {
            if !names.iter().all(|name| subject.has_capability(name)) {
                return Some(Predicate::HasCapabilities);
            }
        }

        if let Some(bound) = self.time_before {
            if !context.now.is_some_and(|now| now < bound) {
                return Some(Predicate::TimeBefore);
            }
        }

        if let Some(bound) = self.time_after {
            if !context.now.is_some_and(|now| now > bound) {
                return Some(Predicate::TimeAfter);
            }
        }

        None
    }
}

fn contains(values: &[String], needle: &str) -> bool {
    values.iter().any(|v| v == needle)
}
