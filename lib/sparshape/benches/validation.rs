#![allow(clippy::panic)]

use codspeed_criterion_compat::{Criterion, Throughput, criterion_group, criterion_main};
use sparshape::{Record, ShapeValidator, parse_schema};
use std::fmt::Write;

const PERSON_SCHEMA: &str = r#"
    PREFIX ex: <http://example.org/>
    PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>

    <PersonShape> {
        ex:name xsd:string MINLENGTH 1 MAXLENGTH 100,
        ex:age xsd:integer MININCLUSIVE 0 MAXINCLUSIVE 150,
        ex:email xsd:string * PATTERN "^[^@]+@[^@]+$",
        ex:homepage IRI ?
    } CLOSED
"#;

/// Benchmark schema parsing for growing shape counts.
fn schema_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema parsing");

    for size in [1, 10, 100, 1_000] {
        let text = schema_with_shapes(size);
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("parse schema with {size} shapes"), |b| {
            b.iter(|| parse_schema(&text).unwrap())
        });
    }

    group.finish();
}

/// Benchmark single-record validation for valid and invalid records.
fn single_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single validation");

    let validator = ShapeValidator::new(parse_schema(PERSON_SCHEMA).unwrap());
    let valid = person_record(30);
    let invalid = person_record(300);

    group.bench_function("validate conforming record", |b| {
        b.iter(|| validator.validate(&valid, "<PersonShape>").unwrap())
    });
    group.bench_function("validate violating record", |b| {
        b.iter(|| validator.validate(&invalid, "<PersonShape>").unwrap())
    });

    group.finish();
}

/// Benchmark batch validation scaling over record counts.
fn batch_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch validation");

    let validator = ShapeValidator::new(parse_schema(PERSON_SCHEMA).unwrap());
    for size in [10, 100, 1_000] {
        let records: Vec<_> = (0..size).map(|i| person_record(i % 200)).collect();
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("validate batch of {size} records"), |b| {
            b.iter(|| validator.validate_batch(&records, "<PersonShape>").unwrap())
        });
    }

    group.finish();
}

fn schema_with_shapes(count: u64) -> String {
    let mut text = String::from("PREFIX ex: <http://example.org/>\n");
    text.push_str("PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\n");
    for i in 0..count {
        writeln!(
            &mut text,
            "<Shape{i}> {{ ex:name xsd:string, ex:value xsd:integer ? MININCLUSIVE 0 }}"
        )
        .unwrap();
    }
    text
}

fn person_record(age: u64) -> Record {
    let mut record = Record::new().with_id(format!("person-{age}"));
    record.insert("ex:name", format!("Person {age}"));
    record.insert("ex:age", i64::try_from(age).unwrap_or(i64::MAX));
    record.insert("ex:email", format!("person{age}@example.org"));
    record
}

criterion_group!(
    benches,
    schema_parsing,
    single_validation,
    batch_validation
);
criterion_main!(benches);
