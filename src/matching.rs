//! Match controller: streams a decomposed query against the compiled
//! constraint table under bitset candidate tracking.

use std::ops::ControlFlow;

use crate::decompose::decompose;
use crate::types::table::{MatchSession, RuleTable};
use crate::BitSet;
use crate::QueryDoc;

/// Core matching loop. Returns the surviving candidate mask, which is empty
/// when the query is not admitted.
///
/// Per part, in order:
/// - missing bucket: no template knows this path, the match fails;
/// - for each alternative, bounded-repetition accounting runs first (it
///   applies whether or not the value matches), then the constraint is
///   evaluated and matching templates are credited;
/// - a non-empty bucket where nothing matched fails the whole match.
///
/// Afterwards a candidate is rejected when it did not satisfy every part of
/// the query, or when the query skipped one of its mandatory parts.
pub(crate) fn find_match<'s>(
    table: &RuleTable,
    doc: &QueryDoc,
    session: &'s mut MatchSession,
) -> &'s BitSet {
    session.reset(table.limits.len());
    let mut parts_seen: u32 = 0;

    let flow = decompose(doc, table.seed, &mut |part| {
        parts_seen += 1;
        let Some(bucket) = table.buckets.get(&part.hash) else {
            return ControlFlow::Break(());
        };
        if bucket.is_empty() {
            // No value constraint at this path: implicit pass.
            return ControlFlow::Continue(());
        }

        let mut matched_any = false;
        for variant in bucket {
            if !variant.combinations.is_empty() && !part.is_arg_continuation() {
                for combo in &variant.combinations {
                    // First touch of a nested range primes the contiguous
                    // [slot - depth, slot] counter span.
                    if !session.primed[combo.slot] {
                        for slot in combo.slot - combo.depth..=combo.slot {
                            if !session.primed[slot] {
                                session.counters[slot] = 0;
                                session.primed[slot] = true;
                            }
                        }
                    }
                    session.counters[combo.slot] += 1;
                    if session.counters[combo.slot] > table.limits[combo.slot] {
                        session.rejected.insert(combo.owner);
                    }
                }
            }

            if variant.elem.matches(part.value) {
                matched_any = true;
                session.candidates.union_with(&variant.mask);
                for index in variant.mask.iter() {
                    session.tallies.record(index, variant.mandatory_for(index));
                }
            }
        }

        if matched_any {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });

    if flow.is_break() {
        session.candidates.clear();
        return &session.candidates;
    }

    for (index, tally) in session.tallies.iter() {
        if tally.satisfied < parts_seen || tally.mandatory < table.required[index] {
            session.rejected.insert(index);
        }
    }
    session.candidates.difference_with(&session.rejected);
    &session.candidates
}
