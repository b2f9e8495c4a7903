//! Streaming query decomposer.
//!
//! Walks an incoming operation with the same seeded hasher and delimiter
//! discipline as the compiler, emitting one [`QueryPart`] per field (no
//! value, ordinal 0) followed by one per argument (whole value, ordinal
//! 1..). Inline fragments push a type-discriminator segment and emit no
//! part of their own. Emission stops early when the sink breaks.

use std::ops::ControlFlow;

use crate::hash::{fragment_segment, PathHasher};
use crate::{QueryDoc, QueryPart, QuerySelection};

pub(crate) fn decompose(
    doc: &QueryDoc,
    seed: u64,
    sink: &mut impl FnMut(QueryPart<'_>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let mut hasher = PathHasher::new(seed);
    hasher.push_field(doc.kind.root_segment());
    walk(&doc.selections, &mut hasher, sink)
}

fn walk<'a>(
    selections: &'a [QuerySelection],
    hasher: &mut PathHasher,
    sink: &mut impl FnMut(QueryPart<'a>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    for selection in selections {
        match selection {
            QuerySelection::Field(field) => {
                hasher.push_field(&field.name);
                sink(QueryPart {
                    hash: hasher.current(),
                    arg_ordinal: 0,
                    value: None,
                })?;
                for (ordinal, (name, value)) in field.args.iter().enumerate() {
                    hasher.push_arg(name);
                    sink(QueryPart {
                        hash: hasher.current(),
                        arg_ordinal: ordinal as u32 + 1,
                        value: Some(value),
                    })?;
                    hasher.pop();
                }
                walk(&field.selections, hasher, sink)?;
                hasher.pop();
            }
            QuerySelection::Fragment {
                type_name,
                selections,
            } => {
                hasher.push_field(&fragment_segment(type_name));
                walk(selections, hasher, sink)?;
                hasher.pop();
            }
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QueryField, QueryValue};

    fn collect(doc: &QueryDoc, seed: u64) -> Vec<(u64, u32, Option<QueryValue>)> {
        let mut parts = Vec::new();
        let flow = decompose(doc, seed, &mut |part| {
            parts.push((part.hash, part.arg_ordinal, part.value.cloned()));
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());
        parts
    }

    #[test]
    fn emits_field_then_args_in_descent_order() {
        let doc = QueryDoc::query().field(
            QueryField::new("user")
                .arg("id", 7_i64)
                .arg("role", "admin")
                .select(QueryField::new("name")),
        );
        let parts = collect(&doc, 0);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].1, 0);
        assert_eq!(parts[0].2, None);
        assert_eq!(parts[1].1, 1);
        assert_eq!(parts[1].2, Some(QueryValue::Int(7)));
        assert_eq!(parts[2].1, 2);
        assert_eq!(parts[2].2, Some(QueryValue::from("admin")));
        assert_eq!(parts[3].1, 0);
    }

    #[test]
    fn sibling_fields_get_distinct_hashes() {
        let doc = QueryDoc::query()
            .field(QueryField::new("a"))
            .field(QueryField::new("b"));
        let parts = collect(&doc, 1);
        assert_ne!(parts[0].0, parts[1].0);
    }

    #[test]
    fn fragment_discriminates_paths() {
        let plain = QueryDoc::query().field(QueryField::new("id"));
        let fragged = QueryDoc::query().fragment("User", vec![QueryField::new("id").into()]);
        let p1 = collect(&plain, 3);
        let p2 = collect(&fragged, 3);
        assert_eq!(p1.len(), 1);
        assert_eq!(p2.len(), 1);
        assert_ne!(p1[0].0, p2[0].0, "fragment must shift the path");
    }

    #[test]
    fn break_stops_the_stream() {
        let doc = QueryDoc::query()
            .field(QueryField::new("a"))
            .field(QueryField::new("b"));
        let mut seen = 0;
        let flow = decompose(&doc, 0, &mut |_| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert!(flow.is_break());
        assert_eq!(seen, 1);
    }

    #[test]
    fn seed_shifts_every_hash() {
        let doc = QueryDoc::query().field(QueryField::new("a").arg("x", true));
        let p1 = collect(&doc, 10);
        let p2 = collect(&doc, 11);
        assert_ne!(p1[0].0, p2[0].0);
        assert_ne!(p1[1].0, p2[1].0);
    }
}
