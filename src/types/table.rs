use std::collections::HashMap;
use std::fmt;

use super::bitset::BitSet;
use super::constraint::Elem;
use super::query::QueryDoc;
use super::tally::TallyMap;

/// One compiled constraint alternative at a path.
///
/// Templates producing an identical alternative at the same path share a
/// single `Variant`; their bits are unioned into `mask` and their
/// bounded-repetition entries appended to `combinations`. The table
/// therefore does not grow with template count for shared sub-patterns.
#[derive(Debug, Clone)]
pub(crate) struct Variant {
    pub(crate) elem: Elem,
    pub(crate) mask: BitSet,
    /// Templates that register this path outside any `max` block. Tracked
    /// per registration rather than derived from `combinations`, since a
    /// template may mention the same path both inside and outside a block.
    pub(crate) mandatory: BitSet,
    pub(crate) combinations: Vec<Combination>,
}

impl Variant {
    /// Whether this path is mandatory for `template`: a part is optional
    /// only when every registration of it sits inside a `max` block.
    pub(crate) fn mandatory_for(&self, template: usize) -> bool {
        self.mandatory.contains(template)
    }
}

/// One "at most N occurrences" accounting unit.
///
/// `slot` addresses the shared limit/counter arrays; `depth` is the block's
/// nesting depth at allocation, letting an inner block prime the contiguous
/// `[slot - depth, slot]` counter span on first touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Combination {
    pub(crate) slot: usize,
    pub(crate) depth: usize,
    pub(crate) owner: usize,
}

/// The compiled matcher state: an immutable hash-indexed constraint table.
///
/// Built once per configuration generation by [`compile()`](crate::compile())
/// and safe to share across threads (e.g. behind `Arc`); all per-call
/// mutable scratch lives in a [`MatchSession`].
#[derive(Debug)]
pub struct RuleTable {
    pub(crate) seed: u64,
    /// path hash -> constraint alternatives at that path.
    pub(crate) buckets: HashMap<u64, Vec<Variant>>,
    /// path hash -> first canonical path seen (collision detection).
    pub(crate) paths: HashMap<u64, String>,
    /// bit position -> template identifier.
    pub(crate) template_ids: Vec<String>,
    /// combinator slot -> occurrence limit.
    pub(crate) limits: Vec<u32>,
    /// template index -> number of mandatory parts it registers.
    pub(crate) required: Vec<u32>,
}

impl RuleTable {
    /// The seed that produced a collision-free table.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of compiled templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.template_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.template_ids.is_empty()
    }

    /// Identifier of the template at a bit position.
    #[must_use]
    pub fn template_id(&self, index: usize) -> Option<&str> {
        self.template_ids.get(index).map(String::as_str)
    }

    /// Create a fresh per-call scratch session sized for this table.
    #[must_use]
    pub fn session(&self) -> MatchSession {
        MatchSession {
            candidates: BitSet::new(),
            rejected: BitSet::new(),
            tallies: TallyMap::new(),
            counters: vec![0; self.limits.len()],
            primed: vec![false; self.limits.len()],
        }
    }

    /// Match a query against the table, returning the surviving template
    /// indices. An empty set means the request is not admitted.
    ///
    /// The session is reset on entry; one session must not be shared by
    /// concurrent calls.
    pub fn find_match<'s>(&self, doc: &QueryDoc, session: &'s mut MatchSession) -> &'s BitSet {
        crate::matching::find_match(self, doc, session)
    }

    /// Identifier of one matching template, or `None` if the query is not
    /// admitted. Ties between surviving templates break toward the lowest
    /// template index (declaration order).
    pub fn match_first<'t>(&'t self, doc: &QueryDoc, session: &mut MatchSession) -> Option<&'t str> {
        let first = crate::matching::find_match(self, doc, session).first()?;
        self.template_id(first)
    }

    /// Invoke `f` once per matching template identifier, in ascending
    /// template-index order.
    pub fn match_all(&self, doc: &QueryDoc, session: &mut MatchSession, mut f: impl FnMut(&str)) {
        let survivors = crate::matching::find_match(self, doc, session);
        for idx in survivors.iter() {
            if let Some(id) = self.template_ids.get(idx) {
                f(id);
            }
        }
    }
}

impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleTable({} templates, {} paths, {} combinator slots)",
            self.template_ids.len(),
            self.buckets.len(),
            self.limits.len(),
        )
    }
}

/// Per-call mutable scratch state for one in-flight match.
///
/// Reusable sequentially; never share one session across concurrent calls.
/// Create with [`RuleTable::session()`].
#[derive(Debug, Clone)]
pub struct MatchSession {
    /// Templates that satisfied at least one part.
    pub(crate) candidates: BitSet,
    /// Templates ruled out by a combinator breach or incomplete coverage.
    pub(crate) rejected: BitSet,
    pub(crate) tallies: TallyMap,
    /// Combinator occurrence counters, parallel to `RuleTable::limits`.
    pub(crate) counters: Vec<u32>,
    /// Which counter slots have been touched this match.
    pub(crate) primed: Vec<bool>,
}

impl MatchSession {
    /// Clear all scratch state and size the combinator arrays for the table
    /// about to be matched. Pooled sessions outlive configuration reloads,
    /// so a session must not assume it was created from the current table.
    pub(crate) fn reset(&mut self, slots: usize) {
        self.candidates.clear();
        self.rejected.clear();
        self.tallies.clear();
        self.counters.clear();
        self.counters.resize(slots, 0);
        self.primed.clear();
        self.primed.resize(slots, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constraint::Constraint;

    #[test]
    fn mandatory_for_checks_ownership() {
        let v = Variant {
            elem: Elem::new(Constraint::Any),
            mask: BitSet::of(0),
            mandatory: BitSet::of(0),
            combinations: vec![Combination {
                slot: 0,
                depth: 0,
                owner: 1,
            }],
        };
        assert!(v.mandatory_for(0));
        assert!(!v.mandatory_for(1));
    }

    // A template may register the same path both outside and inside a
    // `max` block; the outside registration keeps it mandatory even though
    // the template also owns a combination on the variant.
    #[test]
    fn mandatory_survives_budgeted_registration() {
        let v = Variant {
            elem: Elem::new(Constraint::Any),
            mask: BitSet::of(0),
            mandatory: BitSet::of(0),
            combinations: vec![Combination {
                slot: 0,
                depth: 0,
                owner: 0,
            }],
        };
        assert!(v.mandatory_for(0));
    }

    #[test]
    fn session_sizing_and_reset() {
        let table = RuleTable {
            seed: 0,
            buckets: HashMap::new(),
            paths: HashMap::new(),
            template_ids: vec!["a".to_owned()],
            limits: vec![2, 1],
            required: vec![0],
        };
        let mut session = table.session();
        assert_eq!(session.counters.len(), 2);
        session.counters[1] = 9;
        session.candidates.insert(0);
        session.reset(2);
        assert_eq!(session.counters, vec![0, 0]);
        assert!(session.candidates.is_empty());

        // Resizes to whatever table the next match runs against.
        session.reset(4);
        assert_eq!(session.counters, vec![0, 0, 0, 0]);
        assert_eq!(session.primed.len(), 4);
        session.reset(0);
        assert!(session.counters.is_empty());
    }

    #[test]
    fn display_shape() {
        let table = RuleTable {
            seed: 0,
            buckets: HashMap::new(),
            paths: HashMap::new(),
            template_ids: vec![],
            limits: vec![],
            required: vec![],
        };
        assert_eq!(table.to_string(), "RuleTable(0 templates, 0 paths, 0 combinator slots)");
    }
}
