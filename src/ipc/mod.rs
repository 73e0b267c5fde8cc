//! Mach-style IPC capability space
//!
//! Every port right a task holds is reached through its [`space::IpcSpace`]:
//! a table mapping small integer names to entries that carry the right.
//! The space owns name allocation and recycling; what a right permits is
//! decided by [`right`], and notifications are delivered through [`notify`].

use thiserror::Error;

pub mod entry;
pub mod free_list;
pub mod ipc_hash;
pub mod ipc_object;
pub mod ipc_tree;
pub mod notify;
pub mod port;
pub mod registry;
pub mod right;
pub mod space;
pub mod space_info;

pub use entry::{EntryState, IpcEntry, RightKind};
pub use ipc_object::{IpcObject, IpcObjectId, IpcObjectType, ObjectRef};
pub use registry::SpaceRegistry;
pub use space::{
    IpcSpace, NameAlloc, SpaceConfig, SpaceId, SpaceReadGuard, SpaceRef, SpaceWriteGuard,
};

// ============================================================================
// Port Names
// ============================================================================

/// Port name type - the user-visible handle to a port capability
pub type MachPortName = u32;

/// Port index - key of an entry in the forward index
pub type MachPortIndex = u32;

/// The null name. Always present in a space as a placeholder, never usable.
pub const MACH_PORT_NULL: MachPortName = 0;

/// The dead name value handed out in messages; never allocated.
pub const MACH_PORT_DEAD: MachPortName = !0;

/// Whether names carry a generation tag.
///
/// The bit layout keeps room for it, but reuse of an index currently
/// yields the same numeric name.
pub const IE_GEN_ENABLED: bool = false;

/// Largest index the forward index will hand out
pub const MACH_PORT_INDEX_MAX: MachPortIndex = if IE_GEN_ENABLED {
    0x00FF_FFFF
} else {
    MACH_PORT_DEAD - 1
};

/// Combine an index and a generation (the `IE_BITS_GEN_MASK` byte) into a name
#[inline]
pub const fn mach_port_make(index: MachPortIndex, gen: u32) -> MachPortName {
    if IE_GEN_ENABLED {
        (index << 8) | (gen >> 24)
    } else {
        index
    }
}

/// Extract the index part of a name
#[inline]
pub const fn mach_port_index(name: MachPortName) -> MachPortIndex {
    if IE_GEN_ENABLED {
        name >> 8
    } else {
        name
    }
}

/// Extract the generation part of a name, shifted into `IE_BITS_GEN_MASK`
#[inline]
pub const fn mach_port_gen(name: MachPortName) -> u32 {
    if IE_GEN_ENABLED {
        name << 24
    } else {
        0
    }
}

/// Is this a name a client may hold a right under?
#[inline]
pub const fn mach_port_valid(name: MachPortName) -> bool {
    name != MACH_PORT_NULL && name != MACH_PORT_DEAD
}

// ============================================================================
// Errors
// ============================================================================

/// IPC error types
///
/// The space itself only fails with [`IpcError::InvalidTask`] and
/// [`IpcError::ResourceShortage`]; the remaining kinds come from the right
/// manager.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcError {
    /// The space is no longer active
    #[error("invalid task: space is inactive")]
    InvalidTask,

    /// A backing node or index allocation failed
    #[error("resource shortage")]
    ResourceShortage,

    /// The name is reserved or outside the name space
    #[error("invalid name: {0:#x}")]
    InvalidName(MachPortName),

    /// The name does not denote a right of the required kind
    #[error("invalid right at name {0:#x}")]
    InvalidRight(MachPortName),

    /// The name already denotes a right over a different object
    #[error("name {0:#x} already in use")]
    NameExists(MachPortName),

    /// User reference count would overflow
    #[error("user references overflow")]
    UrefsOverflow,
}

/// Result type for IPC operations
pub type IpcResult<T> = Result<T, IpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_layout_without_generation() {
        assert_eq!(mach_port_make(42, 0xFF00_0000), 42);
        assert_eq!(mach_port_index(42), 42);
        assert_eq!(mach_port_gen(42), 0);
    }

    #[test]
    fn test_reserved_names() {
        assert!(!mach_port_valid(MACH_PORT_NULL));
        assert!(!mach_port_valid(MACH_PORT_DEAD));
        assert!(mach_port_valid(1));
        assert!(MACH_PORT_INDEX_MAX < MACH_PORT_DEAD);
    }
}
