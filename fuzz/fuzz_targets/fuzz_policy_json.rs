#![no_main]
use abac_policy::{EvaluationContext, PolicyEngine, PolicyRegistry, Subject};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as a policy document: parsing may fail, evaluating
// whatever parses must not panic
fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(registry) = PolicyRegistry::from_json(json) else {
        return;
    };

    let engine = PolicyEngine::new();
    let subject = Subject::new("u1").with_role("admin").with_scope("fw-1");
    let ctx = EvaluationContext::new().with_owner("u1");

    for policy in registry.list() {
        let _ = policy.validate();
    }
    let _ = engine.decide(registry.policies(), &subject, "read", "soldiers", &ctx);
});
