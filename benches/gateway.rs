//! Benchmarks for shellgate
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shellgate::{
    automaton, check_overlap, CommandRequest, Gateway, MemoryRuleStore, Rule, RuleAction,
    UnavailableJudge,
};

fn bench_store() -> MemoryRuleStore {
    let mut store = MemoryRuleStore::new();
    for (id, pattern, action) in [
        ("rule_reboot", "^sudo reboot", RuleAction::Reject),
        ("rule_git", "^git status$", RuleAction::Accept),
        ("rule_npm", "^npm install$", RuleAction::Accept),
    ] {
        store
            .insert(Rule::new(id, pattern, action, "bench rule"))
            .unwrap();
    }
    store
}

/// Benchmark parsing a request
fn bench_request_parsing(c: &mut Criterion) {
    let json = r#"{"command_text":"ls -la"}"#;

    c.bench_function("request_parsing", |b| {
        b.iter(|| black_box(CommandRequest::from_json(black_box(json)).unwrap()))
    });
}

/// Benchmark a safe command evaluation (terminates at layer 2)
fn bench_safe_command(c: &mut Criterion) {
    let gateway = Gateway::new(bench_store(), UnavailableJudge);

    c.bench_function("evaluate_safe_command", |b| {
        b.iter(|| black_box(gateway.evaluate(black_box("ls -la"))))
    });
}

/// Benchmark a rule-rejected command (terminates at layer 1)
fn bench_rejected_command(c: &mut Criterion) {
    let gateway = Gateway::new(bench_store(), UnavailableJudge);

    c.bench_function("evaluate_rejected_command", |b| {
        b.iter(|| black_box(gateway.evaluate(black_box("sudo reboot"))))
    });
}

/// Benchmark a critical command (heuristic block)
fn bench_critical_command(c: &mut Criterion) {
    let gateway = Gateway::new(bench_store(), UnavailableJudge);

    c.bench_function("evaluate_critical_command", |b| {
        b.iter(|| black_box(gateway.evaluate(black_box("rm -r -f /etc"))))
    });
}

/// Benchmark compiling a pattern to a DFA
fn bench_pattern_compile(c: &mut Criterion) {
    c.bench_function("automaton_compile", |b| {
        b.iter(|| black_box(automaton::compile(black_box("^rm -[rf]+ /(tmp|var)/.*$")).unwrap()))
    });
}

/// Benchmark a full overlap check against several rules
fn bench_overlap_check(c: &mut Criterion) {
    let existing: Vec<Rule> = [
        ("rule_1", "^rm -rf /tmp"),
        ("rule_2", "^git (status|log)$"),
        ("rule_3", "^docker ps"),
        ("rule_4", "^kubectl get [a-z]+$"),
    ]
    .into_iter()
    .map(|(id, pattern)| Rule::new(id, pattern, RuleAction::Accept, ""))
    .collect();

    c.bench_function("overlap_check", |b| {
        b.iter(|| black_box(check_overlap(black_box("^rm -rf"), &existing)))
    });
}

/// Benchmark the full pipeline (parse + evaluate + render)
fn bench_full_pipeline(c: &mut Criterion) {
    let gateway = Gateway::new(bench_store(), UnavailableJudge);
    let json = r#"{"command_text":"git status"}"#;

    c.bench_function("full_pipeline", |b| {
        b.iter(|| {
            let request = CommandRequest::from_json(black_box(json)).unwrap();
            let verdict = gateway.evaluate(&request.command_text);
            black_box(verdict.to_json())
        })
    });
}

criterion_group!(
    benches,
    bench_request_parsing,
    bench_safe_command,
    bench_rejected_command,
    bench_critical_command,
    bench_pattern_compile,
    bench_overlap_check,
    bench_full_pipeline,
);

criterion_main!(benches);
