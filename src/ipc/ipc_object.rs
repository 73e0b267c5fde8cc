//! IPC Object Abstraction
//!
//! Based on Mach4 ipc/ipc_object.h
//!
//! Entries in a space refer to kernel objects (ports and port sets) whose
//! lifetime is owned by the object layer. The space only needs two things
//! from an object: a stable identity for the reverse index, and its type
//! for introspection.

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Object Type
// ============================================================================

/// Type of IPC object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpcObjectType {
    /// Communication endpoint
    Port,
    /// Collection of receive rights
    PortSet,
}

impl IpcObjectType {
    /// Get type name for debugging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Port => "port",
            Self::PortSet => "port-set",
        }
    }
}

// ============================================================================
// Object ID
// ============================================================================

/// Unique identifier for IPC objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct IpcObjectId(u64);

impl IpcObjectId {
    /// Invalid object ID
    pub const INVALID: Self = Self(0);

    /// Create an object ID from a raw value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn value(self) -> u64 {
        self.0
    }

    /// Check if this is a valid ID
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Generate a new unique object ID
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IpcObjectId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for IpcObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

// ============================================================================
// Object trait
// ============================================================================

/// A kernel object a right can refer to
pub trait IpcObject: fmt::Debug + Send + Sync {
    /// Stable identity used by the reverse index
    fn object_id(&self) -> IpcObjectId;

    /// What kind of object this is
    fn object_type(&self) -> IpcObjectType;

    /// Whether the object is still alive
    fn is_active(&self) -> bool {
        true
    }
}

/// Shared reference to a kernel object held by an entry
pub type ObjectRef = Arc<dyn IpcObject>;
