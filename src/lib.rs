//! # abac-policy - Attribute-Based Access Control Evaluator
//!
//! `abac-policy` decides whether a subject may perform an action on a
//! resource by scanning an ordered set of policy documents. It is a pure,
//! synchronous library: callers load policies from wherever they live, hand
//! them to the engine together with the subject and call context, and get a
//! boolean (or an explained [`AccessDecision`]) back.
//!
//! ## Quick Start
//!
//! ```rust
//! use abac_policy::{Condition, EvaluationContext, Policy, PolicyEngine, Statement, Subject};
//!
//! let policies = vec![Policy::new("own-records", "Own records").with_statement(
//!     Statement::allow(["read"], ["soldiers"]).with_condition(Condition::new().is_owner(true)),
//! )];
//!
//! let engine = PolicyEngine::new();
//! let subject = Subject::new("u1");
//!
//! let mine = EvaluationContext::new().with_owner("u1");
//! assert!(engine.can_perform(&policies, &subject, "read", "soldiers", &mine));
//!
//! let theirs = EvaluationContext::new().with_owner("u2");
//! assert!(!engine.can_perform(&policies, &subject, "read", "soldiers", &theirs));
//! ```
//!
//! ## Evaluation order
//!
//! The first applicable statement wins, scanning active policies in the
//! order given and statements in declared order. A Deny only beats an
//! Allow if it is reached first. See [`iam::PolicyEngine`] for details and
//! [`config::CombiningAlgorithm::DenyOverrides`] for the opt-in alternative.

pub mod config;
pub mod error;
pub mod iam;

pub use crate::{
    config::{CombiningAlgorithm, EngineConfig},
    error::{PolicyError, Result},
    iam::{
        evaluate, AccessDecision, Condition, Decision, DecisionCache, DecisionReason, Effect,
        EvaluationContext, PatternMatcher, PatternSet, Policy, PolicyEngine, PolicyRegistry,
        Predicate, RegistryVersion, ScopeTarget, Statement, Subject, OWN_SCOPE_TEMPLATE,
        WILDCARD,
    },
};
