//! Locking Primitives
//!
//! Based on Mach4 kern/lock.h
//!
//! An IPC space uses two locks of different kinds:
//! - a read/write content lock protecting the tables, held across whole
//!   operations (and by readers concurrently),
//! - a small reference lock protecting only the reference count.
//!
//! They are distinct types so that the reference lock can never be handed
//! a content guard: [`RefLock`] exposes nothing but counting, and nothing
//! runs while it is held.

use core::fmt;

use spin::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// Content Lock
// ============================================================================

/// Read/write lock around the contents of a space
pub struct ContentLock<T> {
    inner: RwLock<T>,
}

/// Shared access to lock contents
pub type ContentReadGuard<'a, T> = RwLockReadGuard<'a, T>;

/// Exclusive access to lock contents
pub type ContentWriteGuard<'a, T> = RwLockWriteGuard<'a, T>;

impl<T> ContentLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    /// Acquire for reading; readers never block each other
    #[inline]
    pub fn read(&self) -> ContentReadGuard<'_, T> {
        self.inner.read()
    }

    /// Acquire for writing
    #[inline]
    pub fn write(&self) -> ContentWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Check if the lock is held for writing
    pub fn is_write_locked(&self) -> bool {
        self.inner.writer_count() != 0
    }
}

impl<T> fmt::Debug for ContentLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentLock")
            .field("readers", &self.inner.reader_count())
            .field("writer", &self.is_write_locked())
            .finish()
    }
}

// ============================================================================
// Reference Lock
// ============================================================================

/// Spin-protected reference count
pub struct RefLock {
    count: Mutex<u32>,
}

impl RefLock {
    pub const fn new(initial: u32) -> Self {
        Self {
            count: Mutex::new(initial),
        }
    }

    /// Take a reference
    pub fn reference(&self) {
        let mut count = self.count.lock();
        debug_assert!(*count > 0, "reference taken on freed object");
        *count += 1;
    }

    /// Drop a reference, returns true if it was the last one
    pub fn release(&self) -> bool {
        let mut count = self.count.lock();
        debug_assert!(*count > 0, "reference count underflow");
        *count = count.saturating_sub(1);
        *count == 0
    }

    /// Current count
    pub fn count(&self) -> u32 {
        *self.count.lock()
    }
}

impl fmt::Debug for RefLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefLock")
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_lock_readers_share() {
        let lock = ContentLock::new(5u32);
        let a = lock.read();
        let b = lock.read();
        assert_eq!(*a + *b, 10);
        assert!(!lock.is_write_locked());
    }

    #[test]
    fn test_content_lock_write() {
        let lock = ContentLock::new(0u32);
        {
            let mut guard = lock.write();
            *guard = 3;
            assert!(lock.is_write_locked());
        }
        assert_eq!(*lock.read(), 3);
    }

    #[test]
    fn test_ref_lock_counts_down() {
        let refs = RefLock::new(2);
        refs.reference();
        assert_eq!(refs.count(), 3);
        assert!(!refs.release());
        assert!(!refs.release());
        assert!(refs.release());
    }
}
