//! Benchmarks for the compile and validate hot paths.
//!
//! Run with: cargo bench -p keel-schema

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use keel_json::json_to_value;
use keel_schema::{Validator, compile};
use serde_json::json;

fn schema_document() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["id", "name"],
        "properties": {
            "id": {"type": "string", "pattern": "^[a-z0-9-]+$"},
            "name": {"type": "string", "minLength": 1, "maxLength": 64},
            "age": {"type": "integer", "minimum": 0, "maximum": 150},
            "tags": {
                "type": "array",
                "items": {"type": "string"},
                "uniqueItems": true
            },
            "children": {
                "type": "array",
                "items": {"$ref": "#"}
            }
        }
    })
}

fn instance_document(depth: usize) -> serde_json::Value {
    let mut node = json!({
        "id": "leaf",
        "name": "Leaf",
        "age": 1,
        "tags": ["a", "b", "c"]
    });
    for level in 0..depth {
        node = json!({
            "id": format!("node-{level}"),
            "name": format!("Node {level}"),
            "age": level,
            "tags": ["x", "y"],
            "children": [node]
        });
    }
    node
}

fn bench_compile(c: &mut Criterion) {
    let document = json_to_value(&schema_document(), None).unwrap();
    c.bench_function("compile", |b| {
        b.iter(|| compile(black_box(&document)).unwrap())
    });
}

fn bench_validate(c: &mut Criterion) {
    let schema_value = json_to_value(&schema_document(), None).unwrap();
    let schema = compile(&schema_value).unwrap();
    let validator = Validator::new(&schema);

    let valid = json_to_value(&instance_document(16), None).unwrap();
    c.bench_function("validate/valid-depth-16", |b| {
        b.iter(|| validator.validate(black_box(&valid)))
    });

    let invalid = json_to_value(
        &json!({"id": "BAD ID", "name": "", "age": -3, "tags": ["a", "a"]}),
        None,
    )
    .unwrap();
    c.bench_function("validate/invalid", |b| {
        b.iter(|| validator.validate(black_box(&invalid)))
    });
}

criterion_group!(benches, bench_compile, bench_validate);
criterion_main!(benches);
