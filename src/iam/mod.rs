//! Attribute-based access control policies
//!
//! Provides access decisions over an ordered policy set with:
//! - JSON-compatible policy documents of Allow/Deny statements
//! - Whole-field `*` wildcards for actions and resources
//! - Condition predicates over subject attributes and call context
//! - First-match-wins evaluation with an implicit deny
//! - An optional caller-side LRU decision cache

mod cache;
mod condition;
mod decision;
mod engine;
mod pattern;
mod policy;
mod registry;
mod subject;

pub use cache::DecisionCache;
pub use condition::{Condition, Predicate, ScopeTarget, OWN_SCOPE_TEMPLATE};
pub use decision::{AccessDecision, Decision, DecisionReason};
pub use engine::{evaluate, PolicyEngine};
pub use pattern::{PatternMatcher, PatternSet, WILDCARD};
pub use policy::{Effect, Policy, Statement};
pub use registry::{PolicyRegistry, RegistryVersion};
pub use subject::{EvaluationContext, Subject};
