use std::collections::HashMap;

/// Per-candidate part counters accumulated during one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    /// Parts of the incoming query this template satisfied.
    pub(crate) satisfied: u32,
    /// Satisfied parts that are mandatory for this template (registered
    /// outside any bounded-repetition block).
    pub(crate) mandatory: u32,
}

/// Integer-keyed counting map preserving insertion order.
///
/// Keys are template indices; iteration visits candidates in the order they
/// first satisfied a part. Cleared and reused across matches.
#[derive(Debug, Clone, Default)]
pub(crate) struct TallyMap {
    entries: Vec<(usize, Tally)>,
    index: HashMap<usize, usize>,
}

impl TallyMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn entry(&mut self, key: usize) -> &mut Tally {
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.entries.push((key, Tally::default()));
            self.entries.len() - 1
        });
        &mut self.entries[slot].1
    }

    pub(crate) fn record(&mut self, key: usize, mandatory: bool) {
        let tally = self.entry(key);
        tally.satisfied += 1;
        if mandatory {
            tally.mandatory += 1;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, Tally)> + '_ {
        self.entries.iter().copied()
    }
}
