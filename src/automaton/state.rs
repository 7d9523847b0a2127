//! State types for automata.

use fixedbitset::FixedBitSet;
use std::fmt;

/// A state identifier: the index of the state in the automaton's state set.
pub type StateId = u32;

/// A symbol identifier: the index of the symbol in the automaton's alphabet.
/// The special value [`EPSILON`] labels ε-transitions.
pub type SymbolId = u32;

/// Symbol ID of ε-transitions.
pub const EPSILON: SymbolId = u32::MAX;

/// Name used for ε in transition lists and file formats.
pub const EPSILON_LABEL: &str = "ε";

/// A set of states backed by a bit set. Equality of two sets is decided on
/// [`StateSet::to_vec`] since the backing storage of equal sets may differ in length.
#[derive(Clone)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a state set containing a single state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state. Returns `true` if it was not present before.
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    /// Check if the set contains a state.
    pub fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state as usize)
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    /// Get the number of states in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over all states in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Check if this set intersects with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits.intersection(&other.bits).next().is_some()
    }

    /// Canonical representation, usable as a hash key.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::with_capacity(0);
        for state in iter {
            set.insert(state);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_set_basic() {
        let mut set = StateSet::with_capacity(10);
        assert!(set.is_empty());

        assert!(set.insert(3));
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert_eq!(set.len(), 2);
        assert!(set.contains(3));
        assert!(!set.contains(5));
        assert!(!set.contains(500));
    }

    #[test]
    fn test_state_set_union() {
        let mut small: StateSet = [1, 3].into_iter().collect();
        let large: StateSet = [3, 40].into_iter().collect();

        small.union_with(&large);
        assert_eq!(small.to_vec(), vec![1, 3, 40]);
        assert!(small.intersects(&large));
        assert!(!StateSet::singleton(2, 4).intersects(&large));
    }

    #[test]
    fn test_canonical_form() {
        let a = StateSet::singleton(1, 2);
        let b = StateSet::singleton(1, 64);
        assert_eq!(a.to_vec(), b.to_vec());
    }
}
