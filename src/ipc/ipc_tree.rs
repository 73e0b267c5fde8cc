//! Forward index - name to entry
//!
//! An ordered map keyed by the index part of a name. Besides insertion at a
//! caller-chosen key it allocates keys itself: `insert_alloc` hands out the
//! lowest key not present, the way a radix tree with key allocation does.
//!
//! Finding that key does not walk the map. Every key below `dense_end` is
//! either present or recorded in `holes`, so the lowest free key is the
//! first hole, or failing that the first absent key at or past `dense_end`.

use alloc::collections::btree_map;
use alloc::collections::{BTreeMap, BTreeSet};

use super::entry::IpcEntry;
use super::{
    mach_port_index, mach_port_make, IpcError, IpcResult, MachPortIndex, MachPortName,
    MACH_PORT_INDEX_MAX, MACH_PORT_NULL,
};

/// Index-keyed entry map
#[derive(Debug, Default)]
pub struct IpcEntryTree {
    map: BTreeMap<MachPortIndex, IpcEntry>,
    /// Absent keys below `dense_end`
    holes: BTreeSet<MachPortIndex>,
    dense_end: MachPortIndex,
}

impl IpcEntryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding only the null placeholder
    pub fn with_placeholder() -> Self {
        let mut tree = Self::new();
        tree.map.insert(
            mach_port_index(MACH_PORT_NULL),
            IpcEntry::new(MACH_PORT_NULL),
        );
        tree
    }

    /// Number of nodes physically present (live, free-listed and placeholder)
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, index: MachPortIndex) -> bool {
        self.map.contains_key(&index)
    }

    #[inline]
    pub fn get(&self, index: MachPortIndex) -> Option<&IpcEntry> {
        self.map.get(&index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: MachPortIndex) -> Option<&mut IpcEntry> {
        self.map.get_mut(&index)
    }

    /// Insert a fresh entry named `name`. Its index must be absent.
    pub fn insert(&mut self, name: MachPortName) -> IpcResult<&mut IpcEntry> {
        let index = mach_port_index(name);
        if index > MACH_PORT_INDEX_MAX {
            return Err(IpcError::ResourceShortage);
        }
        debug_assert!(!self.map.contains_key(&index), "index {index:#x} in use");
        self.holes.remove(&index);
        Ok(self.map.entry(index).or_insert_with(|| IpcEntry::new(name)))
    }

    /// Insert a fresh entry at the lowest free key
    pub fn insert_alloc(&mut self) -> IpcResult<(MachPortName, &mut IpcEntry)> {
        let index = self.first_free_key().ok_or(IpcError::ResourceShortage)?;
        let name = mach_port_make(index, 0);
        let entry = self.insert(name)?;
        Ok((name, entry))
    }

    pub fn remove(&mut self, index: MachPortIndex) -> Option<IpcEntry> {
        let entry = self.map.remove(&index)?;
        if index < self.dense_end {
            self.holes.insert(index);
        }
        Some(entry)
    }

    /// Number of recorded holes below the dense prefix
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MachPortIndex, &IpcEntry)> {
        self.map.iter().map(|(&index, entry)| (index, entry))
    }

    /// Lowest key with no node. Explicitly named keys past the dense
    /// prefix are stepped over once; `dense_end` then moves beyond them.
    fn first_free_key(&mut self) -> Option<MachPortIndex> {
        if let Some(&hole) = self.holes.first() {
            return Some(hole);
        }
        let mut key = self.dense_end;
        while self.map.contains_key(&key) {
            key = key.checked_add(1)?;
        }
        if key > MACH_PORT_INDEX_MAX {
            return None;
        }
        self.dense_end = key.checked_add(1)?;
        Some(key)
    }
}

impl IntoIterator for IpcEntryTree {
    type Item = (MachPortIndex, IpcEntry);
    type IntoIter = btree_map::IntoIter<MachPortIndex, IpcEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_occupies_zero() {
        let mut tree = IpcEntryTree::with_placeholder();
        assert!(tree.contains(0));
        assert_eq!(tree.insert_alloc().unwrap().0, 1);
    }

    #[test]
    fn test_alloc_fills_lowest_hole() {
        let mut tree = IpcEntryTree::new();
        for expected in 0..4 {
            let (name, entry) = tree.insert_alloc().unwrap();
            assert_eq!(name, expected);
            assert_eq!(entry.name(), expected);
        }

        tree.remove(1);
        assert_eq!(tree.insert_alloc().unwrap().0, 1);
        assert_eq!(tree.insert_alloc().unwrap().0, 4);
    }

    #[test]
    fn test_alloc_skips_explicit_names() {
        let mut tree = IpcEntryTree::with_placeholder();
        tree.insert(2).unwrap();
        assert_eq!(tree.insert_alloc().unwrap().0, 1);
        assert_eq!(tree.insert_alloc().unwrap().0, 3);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_named_insert_fills_recorded_hole() {
        let mut tree = IpcEntryTree::with_placeholder();
        for _ in 0..5 {
            tree.insert_alloc().unwrap();
        }
        tree.remove(2);
        tree.remove(4);
        assert_eq!(tree.hole_count(), 2);

        tree.insert(2).unwrap();
        assert_eq!(tree.hole_count(), 1);
        assert_eq!(tree.insert_alloc().unwrap().0, 4);
        assert_eq!(tree.insert_alloc().unwrap().0, 6);
        assert_eq!(tree.hole_count(), 0);
    }

    #[test]
    fn test_alloc_steps_over_named_run() {
        let mut tree = IpcEntryTree::with_placeholder();
        for name in 1..=50 {
            tree.insert(name).unwrap();
        }
        tree.insert(52).unwrap();
        assert_eq!(tree.insert_alloc().unwrap().0, 51);
        assert_eq!(tree.insert_alloc().unwrap().0, 53);

        // Removing a key past the dense prefix records nothing
        tree.insert(100).unwrap();
        tree.remove(100);
        assert_eq!(tree.hole_count(), 0);
        assert_eq!(tree.insert_alloc().unwrap().0, 54);
    }

    #[test]
    fn test_many_allocs_stay_dense() {
        let mut tree = IpcEntryTree::new();
        for expected in 0..10_000 {
            assert_eq!(tree.insert_alloc().unwrap().0, expected);
        }
        for index in (0..10_000).step_by(7) {
            tree.remove(index);
        }
        for expected in (0..10_000).step_by(7) {
            assert_eq!(tree.insert_alloc().unwrap().0, expected);
        }
        assert_eq!(tree.insert_alloc().unwrap().0, 10_000);
        assert_eq!(tree.len(), 10_001);
    }

    #[test]
    fn test_insert_rejects_out_of_range() {
        let mut tree = IpcEntryTree::new();
        assert_eq!(
            tree.insert(MACH_PORT_INDEX_MAX + 1).map(|_| ()),
            Err(IpcError::ResourceShortage)
        );
    }
}
