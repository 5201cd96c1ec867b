//! Requesting principal and per-call context
//!
//! Both types have a closed schema: deserializing a document with keys that
//! are not listed here fails instead of silently carrying ad-hoc attributes.
//! Every attribute is optional; a condition that needs an attribute the
//! subject does not carry simply does not hold.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attributes of the principal whose access is being evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Subject {
    /// Principal identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Role name (e.g. "admin", "commander")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Organizational unit the principal belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,

    /// Named boolean capability flags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, bool>,

    /// Whether the principal is linked to a domain record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_linked_record: Option<bool>,

    /// Whether the principal's account is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Subject {
    /// Create a subject with an identity and no other attributes
    pub fn new(id: impl Into<String>) -> Self {
        Subject {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// A subject with no attributes at all
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn with_capability(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.capabilities.insert(name.into(), enabled);
        self
    }

    pub fn with_linked_record(mut self, linked: bool) -> Self {
        self.has_linked_record = Some(linked);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Parse a subject from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// True if the named capability is present and enabled
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.get(name).copied().unwrap_or(false)
    }
}

/// Extra attributes supplied by the caller for a single evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvaluationContext {
    /// Owner of the resource being accessed, compared against the subject id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Caller's notion of "now" for time-window conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<DateTime<Utc>>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let subject = Subject::new("u1")
            .with_role("commander")
            .with_scope("fw-1")
            .with_capability("canExport", true)
            .with_linked_record(true)
            .active(true);

        assert_eq!(subject.id.as_deref(), Some("u1"));
        assert_eq!(subject.role.as_deref(), Some("commander"));
        assert_eq!(subject.scope_id.as_deref(), Some("fw-1"));
        assert!(subject.has_capability("canExport"));
        assert!(!subject.has_capability("canDelete"));
        assert_eq!(subject.has_linked_record, Some(true));
        assert_eq!(subject.is_active, Some(true));
    }

    #[test]
    fn test_disabled_capability_is_not_held() {
        let subject = Subject::new("u1").with_capability("canExport", false);
        assert!(!subject.has_capability("canExport"));
    }

    #[test]
    fn test_subject_json_camel_case() {
        let subject = Subject::from_json(
            r#"{"id": "u1", "role": "admin", "scopeId": "fw-2", "hasLinkedRecord": false}"#,
        )
        .unwrap();

        assert_eq!(subject.scope_id.as_deref(), Some("fw-2"));
        assert_eq!(subject.has_linked_record, Some(false));
        assert_eq!(subject.is_active, None);
    }

    #[test]
    fn test_subject_rejects_unknown_keys() {
        let result = Subject::from_json(r#"{"id": "u1", "department": "ops"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_rejects_unknown_keys() {
        let result: serde_json::Result<EvaluationContext> =
            serde_json::from_str(r#"{"ownerId": "u1", "ip": "10.0.0.1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_context_parses_rfc3339_now() {
        let ctx: EvaluationContext =
            serde_json::from_str(r#"{"ownerId": "u1", "now": "2024-06-01T12:00:00Z"}"#).unwrap();
        assert_eq!(ctx.owner_id.as_deref(), Some("u1"));
        assert!(ctx.now.is_some());
    }
}
