use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::Value;

use blossom::config::load_config;
use blossom::data::{prepare_contexts, Variables};
use blossom::render::{build_context, plan_render, RenderInput};
use blossom::schedule::fingerprint::fingerprint;
use blossom::sourceset::{resolve_tasks, GenerateTask};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn java_task(project: &Path) -> GenerateTask {
    let config = load_config(project).unwrap();
    resolve_tasks(project, &config).unwrap().remove(0)
}

fn sample_variables() -> BTreeMap<String, Value> {
    let mut vars = BTreeMap::new();
    vars.insert("group".to_string(), Value::String("com.example".to_string()));
    vars.insert("platform".to_string(), Value::String("paper".to_string()));
    vars.insert("version".to_string(), Value::String("2.1.0".to_string()));
    vars.insert(
        "contributors".to_string(),
        Value::Array(vec![Value::String("alice".into()), Value::String("bob".into())]),
    );
    vars
}

fn bench_context_building(c: &mut Criterion) {
    let variables = sample_variables();

    c.bench_function("build_context", |b| {
        b.iter(|| {
            let context = build_context(black_box(&variables));
            black_box(context)
        });
    });
}

fn bench_prepare_contexts(c: &mut Criterion) {
    let project = fixture_path("variant-project");
    let task = java_task(&project);

    c.bench_function("prepare_contexts (variants + data files)", |b| {
        b.iter(|| {
            let contexts =
                prepare_contexts(black_box(&project), "java", &task.config, &Variables::new())
                    .unwrap();
            black_box(contexts)
        });
    });
}

fn bench_render_planning(c: &mut Criterion) {
    let project = fixture_path("variant-project");
    let task = java_task(&project);
    let loader = task.loader().unwrap();
    let contexts = prepare_contexts(&project, "java", &task.config, &Variables::new()).unwrap();
    let input = RenderInput {
        set_name: &task.set_name,
        loader: &loader,
        header: task.config.header.as_deref(),
        suffixes: &task.suffixes,
    };

    c.bench_function("plan_render", |b| {
        b.iter(|| {
            let plan = plan_render(black_box(&input), black_box(&contexts)).unwrap();
            black_box(plan)
        });
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let project = fixture_path("variant-project");
    let task = java_task(&project);

    c.bench_function("fingerprint", |b| {
        b.iter(|| {
            let digest = fingerprint(black_box(&project), &task, &Variables::new()).unwrap();
            black_box(digest)
        });
    });
}

criterion_group!(
    benches,
    bench_context_building,
    bench_prepare_contexts,
    bench_render_planning,
    bench_fingerprint
);
criterion_main!(benches);
