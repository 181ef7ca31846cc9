//! Const-constructible bitset over [`SyntaxKind`].

use crate::SyntaxKind;

const SLOTS: usize = 2;

/// Compact set of syntax kinds, usable in `const` tables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: [u64; SLOTS],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SLOTS] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn slot_and_mask(kind: SyntaxKind) -> (usize, u64) {
        let kind = kind as u16;
        let slot = (kind / Self::BITS_PER_SLOT) as usize;
        debug_assert!(slot < SLOTS, "SyntaxSet is too small for every SyntaxKind");
        (slot, 1 << (kind % Self::BITS_PER_SLOT))
    }

    /// Builds a set from a fixed list of kinds.
    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < N {
            set = set.with(kinds[i]);
            i += 1;
        }
        set
    }

    /// Returns a copy of this set that also contains `kind`.
    pub const fn with(mut self, kind: SyntaxKind) -> Self {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] |= mask;
        self
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;
        while i < SLOTS {
            self.bits[i] |= other.bits[i];
            i += 1;
        }
        self
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] & mask != 0
    }

    pub const fn is_empty(&self) -> bool {
        let mut i = 0;
        while i < SLOTS {
            if self.bits[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn contains_kinds_in_both_slots() {
        let set = SyntaxSet::new([LEFT_PAREN, MINUS, TABLE_FIELD]);

        assert!(set.contains(LEFT_PAREN));
        assert!(set.contains(MINUS));
        assert!(set.contains(TABLE_FIELD));
        assert!(!set.contains(PLUS));
        assert!(!set.contains(TOMBSTONE));
    }

    #[test]
    fn union_merges_sets() {
        const ARITH: SyntaxSet = SyntaxSet::new([PLUS, MINUS]);
        const CMP: SyntaxSet = SyntaxSet::new([LT, GT]);
        let both = ARITH.union(&CMP);

        assert!(both.contains(PLUS) && both.contains(GT));
        assert!(!SyntaxSet::EMPTY.contains(PLUS));
        assert!(SyntaxSet::EMPTY.is_empty() && !both.is_empty());
    }
}
