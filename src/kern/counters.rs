//! Kernel Performance Counters
//!
//! Based on Mach4 kern/counters.h/c by CMU (1987-1991)
//!
//! Relaxed atomic counters for the IPC space paths: which allocation path
//! served a request, how often lookups hit, how many nodes were returned
//! to the allocator. Each space carries its own [`SpaceCounters`]; a few
//! global counters track space lifetimes.

use core::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Counter Type
// ============================================================================

/// Mach counter type (atomically updated)
#[derive(Debug)]
pub struct MachCounter {
    value: AtomicU64,
    name: &'static str,
}

impl MachCounter {
    /// Create a new counter
    pub const fn new(name: &'static str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name,
        }
    }

    /// Increment counter by 1
    #[inline]
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value
    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Get counter name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Update max if current value is higher
    pub fn update_max(&self, current: u64) {
        self.value.fetch_max(current, Ordering::Relaxed);
    }
}

/// Whether counters are enabled
pub const MACH_COUNTERS_ENABLED: bool = true;

/// Increment counter (only if counters enabled)
#[macro_export]
macro_rules! counter {
    ($counter:expr) => {
        if $crate::kern::counters::MACH_COUNTERS_ENABLED {
            $counter.inc();
        }
    };
}

// ============================================================================
// Global Space Counters
// ============================================================================

/// Spaces created
pub static C_IPC_SPACE_CREATED: MachCounter = MachCounter::new("ipc_space_created");
/// Spaces torn down
pub static C_IPC_SPACE_DESTROYED: MachCounter = MachCounter::new("ipc_space_destroyed");
/// Space structures whose last reference was dropped
pub static C_IPC_SPACE_FREED: MachCounter = MachCounter::new("ipc_space_freed");

// ============================================================================
// Per-Space Counters
// ============================================================================

/// Counters kept by every space
#[derive(Debug)]
pub struct SpaceCounters {
    pub lookups: MachCounter,
    pub lookup_hits: MachCounter,
    pub alloc_fast: MachCounter,
    pub alloc_tree: MachCounter,
    pub alloc_named: MachCounter,
    pub free_list_scans: MachCounter,
    pub deallocs: MachCounter,
    pub nodes_freed: MachCounter,
    pub free_list_high_water: MachCounter,
}

impl SpaceCounters {
    pub const fn new() -> Self {
        Self {
            lookups: MachCounter::new("lookups"),
            lookup_hits: MachCounter::new("lookup_hits"),
            alloc_fast: MachCounter::new("alloc_fast"),
            alloc_tree: MachCounter::new("alloc_tree"),
            alloc_named: MachCounter::new("alloc_named"),
            free_list_scans: MachCounter::new("free_list_scans"),
            deallocs: MachCounter::new("deallocs"),
            nodes_freed: MachCounter::new("nodes_freed"),
            free_list_high_water: MachCounter::new("free_list_high_water"),
        }
    }

    /// Copy the current values out
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            lookups: self.lookups.get(),
            lookup_hits: self.lookup_hits.get(),
            alloc_fast: self.alloc_fast.get(),
            alloc_tree: self.alloc_tree.get(),
            alloc_named: self.alloc_named.get(),
            free_list_scans: self.free_list_scans.get(),
            deallocs: self.deallocs.get(),
            nodes_freed: self.nodes_freed.get(),
            free_list_high_water: self.free_list_high_water.get(),
        }
    }
}

impl Default for SpaceCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`SpaceCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub lookups: u64,
    pub lookup_hits: u64,
    pub alloc_fast: u64,
    pub alloc_tree: u64,
    pub alloc_named: u64,
    pub free_list_scans: u64,
    pub deallocs: u64,
    pub nodes_freed: u64,
    pub free_list_high_water: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_basic() {
        let c = MachCounter::new("test");
        c.inc();
        c.inc();
        assert_eq!(c.get(), 2);
        assert_eq!(c.name(), "test");
    }

    #[test]
    fn test_update_max() {
        let c = MachCounter::new("max");
        c.update_max(10);
        c.update_max(4);
        assert_eq!(c.get(), 10);
    }

    #[test]
    fn test_counter_macro_and_snapshot() {
        let counters = SpaceCounters::new();
        counter!(counters.deallocs);
        counter!(counters.deallocs);
        let snap = counters.snapshot();
        assert_eq!(snap.deallocs, 2);
        assert_eq!(snap.lookups, 0);
    }
}
