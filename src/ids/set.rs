//! Identifier Sets
//!
//! A sorted, deduplicated `SmallVec` of identifiers used for membership conditions.

use std::slice;

use smallvec::SmallVec;

/// Sorted set of identifiers with `O(log n)` membership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSet<I> {
    ids: SmallVec<[I; 4]>,
}

impl<I: Ord> IdSet<I> {
    /// Create a new set, sorting and removing duplicates.
    pub fn new(ids: impl IntoIterator<Item = impl Into<I>>) -> Self {
        let mut ids: SmallVec<[I; 4]> = ids.into_iter().map(Into::into).collect();

        ids.sort();
        ids.dedup();

        Self { ids }
    }

    /// Check whether the set contains `id`.
    pub fn contains(&self, id: &I) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of identifiers in the set.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate identifiers in ascending order.
    pub fn iter(&self) -> slice::Iter<'_, I> {
        self.ids.iter()
    }
}

impl<'s, I> IntoIterator for &'s IdSet<I> {
    type Item = &'s I;
    type IntoIter = slice::Iter<'s, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::ids::ProductId;

    use super::*;

    #[test]
    fn new_sorts_and_dedups() {
        let set = IdSet::<ProductId>::new(["socks", "hat", "socks", "boots"]);

        let ids: Vec<&str> = set.iter().map(ProductId::as_str).collect();

        assert_eq!(ids, ["boots", "hat", "socks"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn contains_uses_sorted_lookup() {
        let set = IdSet::<ProductId>::new(["socks", "hat"]);

        assert!(set.contains(&ProductId::from("hat")));
        assert!(!set.contains(&ProductId::from("scarf")));
    }

    #[test]
    fn empty_set() {
        let set = IdSet::<ProductId>::new(Vec::<&str>::new());

        assert!(set.is_empty());
    }
}
