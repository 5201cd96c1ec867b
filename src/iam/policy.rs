//! Policy document structure
//!
//! A policy is an ordered list of Allow/Deny statements plus metadata. The
//! statement shape follows IAM conventions (`Effect`, `Action`, `Resource`,
//! `Condition`) while the policy envelope uses camelCase keys.

use super::condition::Condition;
use super::pattern::{PatternMatcher, PatternSet};
use crate::error::{PolicyError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Allow the action
    Allow,
    /// Deny the action
    Deny,
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Statement {
    /// Statement ID (optional)
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "sid")]
    pub sid: Option<String>,

    /// Effect of this statement
    #[serde(alias = "effect")]
    pub effect: Effect,

    /// Actions this statement applies to
    #[serde(alias = "action")]
    pub action: PatternSet,

    /// Resources this statement applies to
    #[serde(alias = "resource")]
    pub resource: PatternSet,

    /// Optional condition; absent means the statement is unconditional
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "condition")]
    pub condition: Option<Condition>,
}

impl Statement {
    /// Create a new unconditional statement
    pub fn new(
        effect: Effect,
        action: impl Into<PatternSet>,
        resource: impl Into<PatternSet>,
    ) -> Self {
        Statement {
            sid: None,
            effect,
            action: action.into(),
            resource: resource.into(),
            condition: None,
        }
    }

    pub fn allow(action: impl Into<PatternSet>, resource: impl Into<PatternSet>) -> Self {
        Self::new(Effect::Allow, action, resource)
    }

    pub fn deny(action: impl Into<PatternSet>, resource: impl Into<PatternSet>) -> Self {
        Self::new(Effect::Deny, action, resource)
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Check if this statement's Action and Resource both match
    ///
    /// Conditions are not considered here.
    pub fn applies_to(&self, action: &str, resource: &str) -> bool {
        self.action.matches(action) && self.resource.matches(resource)
    }

    fn validate(&self, policy_id: &str, index: usize) -> Result<()> {
        for (field, patterns) in [("Action", &self.action), ("Resource", &self.resource)] {
            if patterns.is_empty() {
                return Err(PolicyError::invalid(
                    policy_id,
                    format!("statement {} has no {} patterns", index, field),
                ));
            }
            for pattern in patterns.iter() {
                if pattern.is_empty() {
                    return Err(PolicyError::invalid(
                        policy_id,
                        format!("statement {} has an empty {} pattern", index, field),
                    ));
                }
                if PatternMatcher::is_partial_wildcard(pattern) {
                    return Err(PolicyError::invalid(
                        policy_id,
                        format!(
                            "statement {} {} pattern '{}' uses a partial wildcard; only \"*\" is supported",
                            index, field, pattern
                        ),
                    ));
                }
            }
        }

        if let Some(cond) = &self.condition {
            if let (Some(after), Some(before)) = (cond.time_after, cond.time_before) {
                if after >= before {
                    return Err(PolicyError::invalid(
                        policy_id,
                        format!("statement {} has an empty time window", index),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn default_active() -> bool {
    true
}

/// Complete policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Policy {
    /// Unique policy identity
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author-defined document version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Ordered statements; evaluated top to bottom
    #[serde(default)]
    pub statements: Vec<Statement>,

    /// Inactive policies are skipped by the engine
    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Policy {
    /// Create a new active policy with no statements
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Policy {
            id: id.into(),
            name: name.into(),
            description: None,
            version: None,
            statements: Vec::new(),
            is_active: true,
            created_by: None,
            tags: BTreeMap::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn created_by(mut self, creator: impl Into<String>) -> Self {
        self.created_by = Some(creator.into());
        self
    }

    /// Mark the policy inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Add a statement to this policy
    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Parse policy from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize policy to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate policy structure
    ///
    /// The engine never requires this; it is meant for the authoring side,
    /// which should refuse to publish a policy that fails it.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PolicyError::invalid(&self.id, "policy id is empty"));
        }

        if self.statements.is_empty() {
            return Err(PolicyError::invalid(
                &self.id,
                "policy must have at least one statement",
            ));
        }

        for (i, stmt) in self.statements.iter().enumerate() {
            stmt.validate(&self.id, i)?;
        }

        Ok(())
    }
}
