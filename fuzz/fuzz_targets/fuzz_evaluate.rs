#![no_main]
use abac_policy::{
    CombiningAlgorithm, Condition, DecisionReason, Effect, EngineConfig, EvaluationContext, Policy,
    PolicyEngine, Statement, Subject,
};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzStatement {
    allow: bool,
    actions: Vec<String>,
    resources: Vec<String>,
    role: Option<String>,
    owner: Option<bool>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    policies: Vec<(bool, Vec<FuzzStatement>)>,
    subject_id: Option<String>,
    role: Option<String>,
    owner_id: Option<String>,
    action: String,
    resource: String,
    deny_overrides: bool,
}

fuzz_target!(|input: FuzzInput| {
    let policies: Vec<Policy> = input
        .policies
        .into_iter()
        .enumerate()
        .map(|(i, (active, statements))| {
            let mut policy = Policy::new(format!("p{}", i), "fuzz");
            policy.is_active = active;
            for s in statements {
                let effect = if s.allow { Effect::Allow } else { Effect::Deny };
                let mut condition = Condition::new();
                condition.role_equals = s.role;
                condition.is_owner = s.owner;
                policy.add_statement(
                    Statement::new(effect, s.actions, s.resources).with_condition(condition),
                );
            }
            policy
        })
        .collect();

    let subject = Subject {
        id: input.subject_id,
        role: input.role,
        ..Default::default()
    };
    let ctx = EvaluationContext {
        owner_id: input.owner_id,
        now: None,
    };

    let combining = if input.deny_overrides {
        CombiningAlgorithm::DenyOverrides
    } else {
        CombiningAlgorithm::FirstMatchWins
    };
    let engine = PolicyEngine::with_config(EngineConfig::default().with_combining(combining));

    let decision = engine.decide(&policies, &subject, &input.action, &input.resource, &ctx);

    // Only an applying Allow statement can grant access
    if decision.allowed {
        assert!(matches!(
            decision.reason,
            DecisionReason::Matched { effect: Effect::Allow, .. }
        ));
    }
});
