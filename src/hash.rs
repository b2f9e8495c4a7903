//! Seeded rolling hash over structural paths.
//!
//! The compiler and the decomposer walk selection trees with the same hasher
//! so that a template path and the matching query path land on the same
//! bucket. The hash state is pushed and popped on a stack mirroring descent
//! depth; distinct delimiters keep field descent and argument/object-field
//! descent from aliasing each other.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Delimiter folded in before a field segment.
const FIELD_SEP: u8 = 0x1f;
/// Delimiter folded in before an argument segment.
const ARG_SEP: u8 = 0x1e;

/// Path segment for an inline fragment's type condition. GraphQL field
/// names cannot start with `$`, so discriminator segments never alias a
/// field of the same name.
pub(crate) fn fragment_segment(type_name: &str) -> String {
    format!("${type_name}")
}

/// Derive the next seed in a retry chain (splitmix64 finalizer).
pub(crate) fn next_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[derive(Debug, Clone)]
pub(crate) struct PathHasher {
    stack: Vec<u64>,
}

impl PathHasher {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            stack: vec![FNV_OFFSET ^ seed],
        }
    }

    fn push(&mut self, sep: u8, segment: &str) {
        let mut h = *self.stack.last().unwrap_or(&FNV_OFFSET);
        h = (h ^ u64::from(sep)).wrapping_mul(FNV_PRIME);
        for &byte in segment.as_bytes() {
            h = (h ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
        }
        self.stack.push(h);
    }

    /// Descend through a field (or fragment type-discriminator) segment.
    pub(crate) fn push_field(&mut self, name: &str) {
        self.push(FIELD_SEP, name);
    }

    /// Descend through an argument segment.
    pub(crate) fn push_arg(&mut self, name: &str) {
        self.push(ARG_SEP, name);
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "pop below root");
        self.stack.pop();
    }

    /// Hash of the current path.
    pub(crate) fn current(&self) -> u64 {
        *self.stack.last().unwrap_or(&FNV_OFFSET)
    }
}
