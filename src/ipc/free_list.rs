//! Bounded free list of reclaimed entries
//!
//! Deallocated entries stay in the forward index and their indices are kept
//! here for cheap reuse. The list is capped so a space does not keep an
//! unbounded number of dead nodes around after a deallocation burst; past
//! the cap the node is removed from the index instead.

use heapless::Vec;

use super::MachPortIndex;

/// Compile-time ceiling on the free list length
pub const IS_FREE_LIST_SIZE_LIMIT: usize = 64;

/// Indices of reclaimed entries, most recently freed last
#[derive(Debug)]
pub struct FreeList {
    indices: Vec<MachPortIndex, IS_FREE_LIST_SIZE_LIMIT>,
    limit: usize,
}

impl FreeList {
    /// Create a free list holding at most `limit` indices (clamped to the ceiling)
    pub fn new(limit: usize) -> Self {
        Self {
            indices: Vec::new(),
            limit: limit.min(IS_FREE_LIST_SIZE_LIMIT),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.indices.len() >= self.limit
    }

    /// Push an index. Returns false if the list is at its limit.
    pub fn push(&mut self, index: MachPortIndex) -> bool {
        if self.is_full() {
            return false;
        }
        self.indices.push(index).is_ok()
    }

    /// Pop the most recently freed index
    pub fn pop(&mut self) -> Option<MachPortIndex> {
        self.indices.pop()
    }

    /// Unlink a specific index. Linear in the list length.
    pub fn unlink(&mut self, index: MachPortIndex) -> bool {
        match self.indices.iter().position(|&i| i == index) {
            Some(pos) => {
                self.indices.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, index: MachPortIndex) -> bool {
        self.indices.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = MachPortIndex> + '_ {
        self.indices.iter().copied()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut list = FreeList::new(4);
        assert!(list.push(1));
        assert!(list.push(2));
        assert_eq!(list.pop(), Some(2));
        assert_eq!(list.pop(), Some(1));
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn test_limit_is_enforced() {
        let mut list = FreeList::new(2);
        assert!(list.push(1));
        assert!(list.push(2));
        assert!(!list.push(3));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_limit_clamped_to_ceiling() {
        let mut list = FreeList::new(1000);
        assert_eq!(list.limit(), IS_FREE_LIST_SIZE_LIMIT);
        for index in 1..=100 {
            list.push(index);
        }
        assert_eq!(list.len(), IS_FREE_LIST_SIZE_LIMIT);
    }

    #[test]
    fn test_unlink_middle() {
        let mut list = FreeList::new(8);
        for index in [3, 5, 7] {
            list.push(index);
        }
        assert!(list.unlink(5));
        assert!(!list.unlink(5));
        assert!(!list.contains(5));
        assert_eq!(list.pop(), Some(7));
        assert_eq!(list.pop(), Some(3));
    }
}
