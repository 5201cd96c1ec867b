//! Caller-side LRU cache for access decisions
//!
//! The engine never caches. Hosts that evaluate the same requests repeatedly
//! can put a `DecisionCache` in front of it. Entries are tied to the
//! [`RegistryVersion`] they were computed against, which names both the
//! registry instance and its revision: a lookup with any other version drops
//! every entry first, so one cache may be pointed at different registries.
//! A cache must only ever be used with one engine configuration.

use super::engine::PolicyEngine;
use super::registry::{PolicyRegistry, RegistryVersion};
use super::subject::{EvaluationContext, Subject};
use crate::config::EngineConfig;
use crate::error::{PolicyError, Result};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

/// Cache key: the full request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    subject: Subject,
    action: String,
    resource: String,
    context: EvaluationContext,
}

impl CacheKey {
    fn new(subject: &Subject, action: &str, resource: &str, context: &EvaluationContext) -> Self {
        CacheKey {
            subject: subject.clone(),
            action: action.to_string(),
            resource: resource.to_string(),
            context: context.clone(),
        }
    }
}

struct CacheState {
    version: Option<RegistryVersion>,
    entries: LruCache<CacheKey, bool>,
}

impl CacheState {
    /// Drop all entries if they were computed against another registry version
    fn sync(&mut self, version: RegistryVersion) {
        if self.version != Some(version) {
            if !self.entries.is_empty() {
                debug!(
                    "Registry version changed ({:?} -> {:?}); dropping {} cached decisions",
                    self.version,
                    version,
                    self.entries.len()
                );
            }
            self.entries.clear();
            self.version = Some(version);
        }
    }
}

/// LRU cache of boolean access decisions, safe to share between threads
pub struct DecisionCache {
    state: Mutex<CacheState>,
}

impl DecisionCache {
    /// Create a new decision cache with given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            PolicyError::InvalidConfig("cache capacity must be greater than zero".to_string())
        })?;

        Ok(DecisionCache {
            state: Mutex::new(CacheState {
                version: None,
                entries: LruCache::new(capacity),
            }),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.cache_capacity)
    }

    /// Get a cached decision computed against `version`
    pub fn get(
        &self,
        version: RegistryVersion,
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> Option<bool> {
        let mut state = self.state.lock();
        state.sync(version);
        state
            .entries
            .get(&CacheKey::new(subject, action, resource, context))
            .copied()
    }

    /// Store a decision computed against `version`
    pub fn put(
        &self,
        version: RegistryVersion,
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
        allowed: bool,
    ) {
        let mut state = self.state.lock();
        state.sync(version);
        state
            .entries
            .put(CacheKey::new(subject, action, resource, context), allowed);
    }

    /// Answer from the cache, or evaluate against the registry and remember
    pub fn can_perform(
        &self,
        engine: &PolicyEngine,
        registry: &PolicyRegistry,
        subject: &Subject,
        action: &str,
        resource: &str,
        context: &EvaluationContext,
    ) -> bool {
        let version = registry.version();
        if let Some(allowed) = self.get(version, subject, action, resource, context) {
            debug!("Decision cache hit for {} on {}", action, resource);
            return allowed;
        }

        debug!("Decision cache miss for {} on {}", action, resource);
        let allowed = engine.can_perform(registry.policies(), subject, action, resource, context);
        self.put(version, subject, action, resource, context, allowed);
        allowed
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}
