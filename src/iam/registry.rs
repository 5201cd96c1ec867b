//! In-memory policy registry
//!
//! Holds the ordered policy set handed to the [`PolicyEngine`](super::PolicyEngine).
//! Insertion order is evaluation order. Every mutation bumps a revision
//! counter so caller-side caches can tell when their entries went stale.
//!
//! Each registry also carries a process-unique instance id, fresh on every
//! `new` and `clone`, so two registries that happen to reach the same
//! revision are never confused.
//!
//! The registry is an ordinary owned value. To share one across threads,
//! wrap it in `Arc<parking_lot::RwLock<PolicyRegistry>>`.

use super::policy::Policy;
use crate::error::{PolicyError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

fn next_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

/// Identifies one state of one registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryVersion {
    pub instance: u64,
    pub revision: u64,
}

#[derive(Debug)]
pub struct PolicyRegistry {
    policies: Vec<Policy>,
    revision: u64,
    instance: u64,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        PolicyRegistry {
            policies: Vec::new(),
            revision: 0,
            instance: next_instance(),
        }
    }
}

impl Clone for PolicyRegistry {
    fn clone(&self) -> Self {
        PolicyRegistry {
            policies: self.policies.clone(),
            revision: self.revision,
            instance: next_instance(),
        }
    }
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a JSON array of policies, preserving order
    pub fn from_json(json: &str) -> Result<Self> {
        let policies: Vec<Policy> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for policy in policies {
            registry.add(policy)?;
        }
        Ok(registry)
    }

    /// Serialize all policies, in evaluation order, as a JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.policies)?)
    }

    /// Append a policy to the end of the evaluation order
    pub fn add(&mut self, policy: Policy) -> Result<()> {
        if policy.id.trim().is_empty() {
            return Err(PolicyError::invalid(&policy.id, "policy id is empty"));
        }
        if self.position(&policy.id).is_some() {
            return Err(PolicyError::DuplicatePolicy(policy.id));
        }
        if policy.statements.is_empty() {
            warn!("Policy '{}' has no statements and will never match", policy.id);
        }

        info!("Registered policy '{}' ({} statements)", policy.id, policy.statements.len());
        self.policies.push(policy);
        self.bump();
        Ok(())
    }

    /// Replace an existing policy in place, keeping its position
    ///
    /// Returns the previous version.
    pub fn replace(&mut self, policy: Policy) -> Result<Policy> {
        let idx = self
            .position(&policy.id)
            .ok_or_else(|| PolicyError::PolicyNotFound(policy.id.clone()))?;

        debug!("Replacing policy '{}'", policy.id);
        let previous = std::mem::replace(&mut self.policies[idx], policy);
        self.bump();
        Ok(previous)
    }

    /// Replace the policy with the same id, or append it if it is new
    pub fn upsert(&mut self, policy: Policy) -> Result<()> {
        if self.position(&policy.id).is_some() {
            self.replace(policy).map(|_| ())
        } else {
            self.add(policy)
        }
    }

    /// Remove a policy by id
    pub fn remove(&mut self, id: &str) -> Option<Policy> {
        let idx = self.position(id)?;
        let removed = self.policies.remove(idx);
        info!("Removed policy '{}'", id);
        self.bump();
        Some(removed)
    }

    /// Toggle a policy's activation flag
    pub fn set_active(&mut self, id: &str, is_active: bool) -> Result<()> {
        let idx = self
            .position(id)
            .ok_or_else(|| PolicyError::PolicyNotFound(id.to_string()))?;

        let policy = &mut self.policies[idx];
        if policy.is_active != is_active {
            policy.is_active = is_active;
            debug!("Policy '{}' is_active = {}", id, is_active);
            self.bump();
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// All policies in evaluation order
    pub fn list(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    /// Active policies in evaluation order
    pub fn active(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter().filter(|p| p.is_active)
    }

    /// The policy set as a slice, ready to hand to the engine
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Counter incremented by every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Process-unique id of this registry value
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Instance and revision together; what caches key on
    pub fn version(&self) -> RegistryVersion {
        RegistryVersion {
            instance: self.instance,
            revision: self.revision,
        }
    }

    /// Remove all policies
    pub fn clear(&mut self) {
        if !self.policies.is_empty() {
            self.policies.clear();
            self.bump();
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.policies.iter().position(|p| p.id == id)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
