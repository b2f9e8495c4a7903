use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gqlgate::{
    val, CompareOp, ConstraintExpr, FieldNode, OperandExpr, OperationKind, QueryDoc, QueryField,
    RuleTable, Selection, Template,
};

/// A table of `n` templates over distinct root fields, plus a query
/// conforming to the last template (worst case for candidate narrowing).
fn build_table(n: usize) -> (RuleTable, QueryDoc) {
    let templates: Vec<Template> = (0..n)
        .map(|i| Template {
            name: format!("tpl_{i}"),
            kind: OperationKind::Query,
            selections: vec![Selection::Field(
                FieldNode::new(&format!("root_{i}"))
                    .arg("id", ConstraintExpr::Variable("id".to_owned()))
                    .arg("limit", val(CompareOp::Le, OperandExpr::Int(100)))
                    .select(FieldNode::new("name"))
                    .select(FieldNode::new("status")),
            )],
        })
        .collect();
    let table = gqlgate::compile(&templates).unwrap();

    let doc = QueryDoc::query().field(
        QueryField::new(&format!("root_{}", n - 1))
            .arg("id", 7_i64)
            .arg("limit", 50_i64)
            .select(QueryField::new("name"))
            .select(QueryField::new("status")),
    );
    (table, doc)
}

fn bench_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_match");

    for &n in &[5, 20, 100] {
        let (table, doc) = build_table(n);
        let mut session = table.session();
        group.bench_function(&format!("{n}_templates_reused_session"), |b| {
            b.iter(|| table.match_first(black_box(&doc), &mut session));
        });

        let (table, doc) = build_table(n);
        group.bench_function(&format!("{n}_templates_fresh_session"), |b| {
            b.iter(|| {
                let mut session = table.session();
                table.match_first(black_box(&doc), &mut session)
            });
        });
    }

    group.finish();
}

fn bench_reject(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_reject");

    for &n in &[5, 20, 100] {
        let (table, _) = build_table(n);
        let mut session = table.session();

        // Unknown root field: rejected on the first decomposed part
        let unknown = QueryDoc::query().field(QueryField::new("nope"));
        group.bench_function(&format!("{n}_templates_unknown_path"), |b| {
            b.iter(|| table.match_first(black_box(&unknown), &mut session));
        });

        // Known shape, failing argument: rejected after full traversal
        let bad_arg = QueryDoc::query().field(
            QueryField::new("root_0")
                .arg("id", 7_i64)
                .arg("limit", 500_i64)
                .select(QueryField::new("name"))
                .select(QueryField::new("status")),
        );
        group.bench_function(&format!("{n}_templates_failing_arg"), |b| {
            b.iter(|| table.match_first(black_box(&bad_arg), &mut session));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_match, bench_reject);
criterion_main!(benches);
