//! IPC Hash - (space, object) -> name lookup
//!
//! Based on Mach4 ipc/ipc_hash.h/c by Rich Draves (1989)
//!
//! Each space keeps a reverse index from the identity of a port it holds
//! send or receive rights for to the name those rights live under. It is
//! used to find the existing name when a right for the same port arrives
//! again, so the space never names one port twice.

use alloc::collections::BTreeMap;

use super::ipc_object::IpcObjectId;
use super::MachPortName;

/// Per-space reverse index
#[derive(Debug, Default)]
pub struct IpcReverseHash {
    map: BTreeMap<IpcObjectId, MachPortName>,
    /// Statistics
    pub stats: IpcHashStats,
}

impl IpcReverseHash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the name holding rights for `object`
    pub fn lookup(&self, object: IpcObjectId) -> Option<MachPortName> {
        self.map.get(&object).copied()
    }

    /// Record that `name` holds rights for `object`.
    ///
    /// Returns the name previously recorded for the object, if any.
    pub fn insert(&mut self, object: IpcObjectId, name: MachPortName) -> Option<MachPortName> {
        self.stats.inserts += 1;
        self.map.insert(object, name)
    }

    /// Delete the mapping for `object`
    pub fn delete(&mut self, object: IpcObjectId) -> Option<MachPortName> {
        let result = self.map.remove(&object);
        if result.is_some() {
            self.stats.deletes += 1;
        }
        result
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IpcObjectId, MachPortName)> + '_ {
        self.map.iter().map(|(&object, &name)| (object, name))
    }
}

// ============================================================================
// Hash Statistics
// ============================================================================

/// Reverse index statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct IpcHashStats {
    /// Number of insertions
    pub inserts: u64,
    /// Number of deletions
    pub deletes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_hash() {
        let mut hash = IpcReverseHash::new();
        let a = IpcObjectId::new(1);
        let b = IpcObjectId::new(2);

        assert_eq!(hash.insert(a, 100), None);
        assert_eq!(hash.insert(b, 200), None);
        assert_eq!(hash.lookup(a), Some(100));
        assert_eq!(hash.len(), 2);

        assert_eq!(hash.delete(a), Some(100));
        assert_eq!(hash.delete(a), None);
        assert!(hash.lookup(a).is_none());
        assert_eq!(hash.stats.inserts, 2);
        assert_eq!(hash.stats.deletes, 1);
    }

    #[test]
    fn test_insert_reports_previous_name() {
        let mut hash = IpcReverseHash::new();
        let a = IpcObjectId::new(7);
        hash.insert(a, 3);
        assert_eq!(hash.insert(a, 4), Some(3));
    }
}
