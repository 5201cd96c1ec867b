use abac_policy::{
    Condition, DecisionCache, EvaluationContext, Policy, PolicyEngine, PolicyRegistry, Statement,
    Subject,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Create a realistic policy set with conditions
fn create_policy_set() -> Vec<Policy> {
    vec![
        Policy::new("admin", "Administrators").with_statement(
            Statement::allow("*", "*").with_condition(Condition::new().role_equals("admin")),
        ),
        Policy::new("commander", "Commanders").with_statement(
            Statement::allow(["read", "update"], ["soldiers", "duties", "activities"])
                .with_condition(Condition::new().role_in(["commander", "officer"]).own_scope()),
        ),
        Policy::new("self", "Self service").with_statement(
            Statement::allow(["read"], ["soldiers"]).with_condition(Condition::new().is_owner(true)),
        ),
        Policy::new("lockdown", "Lockdown").with_statement(Statement::deny("*", "*")),
    ]
}

/// Benchmark a request that falls through every policy to the final deny
fn bench_fall_through(c: &mut Criterion) {
    let eval_counts = vec![100, 1_000, 10_000];
    let mut group = c.benchmark_group("policy_eval_fall_through");

    for count in eval_counts {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let policies = create_policy_set();
            let engine = PolicyEngine::new();
            let subject = Subject::new("s1").with_role("soldier").with_scope("fw-1");
            let ctx = EvaluationContext::new().with_owner("s2");

            b.iter(|| {
                for _ in 0..count {
                    let allowed = engine.can_perform(&policies, &subject, "read", "soldiers", &ctx);
                    black_box(allowed);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark cached vs uncached decisions for a hot request set
fn bench_decision_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision_cache");

    let mut registry = PolicyRegistry::new();
    for policy in create_policy_set() {
        registry.add(policy).unwrap();
    }
    let engine = PolicyEngine::new();
    let subjects: Vec<Subject> = (0..10)
        .map(|i| Subject::new(format!("c{}", i)).with_role("commander").with_scope("fw-1"))
        .collect();
    let ctx = EvaluationContext::new();

    group.bench_function("uncached", |b| {
        b.iter(|| {
            for subject in &subjects {
                let allowed = engine.can_perform(registry.policies(), subject, "update", "duties", &ctx);
                black_box(allowed);
            }
        });
    });

    group.bench_function("cached", |b| {
        let cache = DecisionCache::new(100).unwrap();
        b.iter(|| {
            for subject in &subjects {
                let allowed = cache.can_perform(&engine, &registry, subject, "update", "duties", &ctx);
                black_box(allowed);
            }
        });
    });

    group.finish();
}

/// Benchmark policy sets with many statements
fn bench_policy_complexity(c: &mut Criterion) {
    let statement_counts = vec![5, 25, 100];
    let mut group = c.benchmark_group("policy_complexity");

    for count in statement_counts {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut policy = Policy::new("big", "Big");
            for i in 0..count {
                policy.add_statement(Statement::allow(["read"], [format!("resource{}", i).as_str()]));
            }
            let policies = vec![policy];
            let engine = PolicyEngine::new();
            let subject = Subject::new("u1");
            let ctx = EvaluationContext::new();

            b.iter(|| {
                // Worst case: last statement matches
                let resource = format!("resource{}", count - 1);
                let allowed = engine.can_perform(&policies, &subject, "read", &resource, &ctx);
                black_box(allowed);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fall_through,
    bench_decision_cache,
    bench_policy_complexity
);
criterion_main!(benches);
