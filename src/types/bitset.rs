use std::fmt;

const BITS: usize = 64;

/// A growable set of small integers, used throughout the matcher as
/// "set of template indices".
///
/// Supports union, set-difference, membership test, emptiness check, and
/// ordered (ascending) iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    blocks: Vec<u64>,
}

impl BitSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single index.
    #[must_use]
    pub fn of(index: usize) -> Self {
        let mut set = Self::new();
        set.insert(index);
        set
    }

    pub fn insert(&mut self, index: usize) {
        let block = index / BITS;
        if block >= self.blocks.len() {
            self.blocks.resize(block + 1, 0);
        }
        self.blocks[block] |= 1 << (index % BITS);
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.blocks
            .get(index / BITS)
            .is_some_and(|b| b & (1 << (index % BITS)) != 0)
    }

    /// `self |= other`.
    pub fn union_with(&mut self, other: &BitSet) {
        if other.blocks.len() > self.blocks.len() {
            self.blocks.resize(other.blocks.len(), 0);
        }
        for (dst, src) in self.blocks.iter_mut().zip(&other.blocks) {
            *dst |= src;
        }
    }

    /// `self &= !other`.
    pub fn difference_with(&mut self, other: &BitSet) {
        for (dst, src) in self.blocks.iter_mut().zip(&other.blocks) {
            *dst &= !src;
        }
        while self.blocks.last() == Some(&0) {
            self.blocks.pop();
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// Number of indices in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Lowest index in the set, if any.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, &b)| b != 0)
            .map(|(i, &b)| i * BITS + b.trailing_zeros() as usize)
    }

    /// Iterate indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().enumerate().flat_map(|(i, &block)| {
            let mut rest = block;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * BITS + bit)
            })
        })
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (n, idx) in self.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{idx}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::new();
        for idx in iter {
            set.insert(idx);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = BitSet::new();
        set.insert(3);
        set.insert(65);
        assert!(set.contains(3));
        assert!(set.contains(65));
        assert!(!set.contains(4));
        assert!(!set.contains(200));
    }

    #[test]
    fn empty_set() {
        let set = BitSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.first(), None);
        assert_eq!(set.iter().count(), 0);
    }

    #[test]
    fn union() {
        let mut a = BitSet::of(1);
        let b: BitSet = [2, 70].into_iter().collect();
        a.union_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 2, 70]);
    }

    #[test]
    fn difference() {
        let mut a: BitSet = [1, 2, 70].into_iter().collect();
        let b: BitSet = [2, 200].into_iter().collect();
        a.difference_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 70]);
    }

    #[test]
    fn iteration_is_ascending() {
        let set: BitSet = [70, 1, 63, 64, 0].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 63, 64, 70]);
    }

    #[test]
    fn first_is_lowest() {
        let set: BitSet = [90, 5, 6].into_iter().collect();
        assert_eq!(set.first(), Some(5));
    }

    #[test]
    fn clear_empties() {
        let mut set = BitSet::of(12);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn difference_to_empty_is_empty() {
        let mut a = BitSet::of(7);
        let b = BitSet::of(7);
        a.difference_with(&b);
        assert!(a.is_empty());
        assert_eq!(a, BitSet::new());
    }

    #[test]
    fn display() {
        let set: BitSet = [0, 2].into_iter().collect();
        assert_eq!(set.to_string(), "{0, 2}");
    }
}
