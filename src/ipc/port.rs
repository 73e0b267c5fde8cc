//! Port and port-set objects
//!
//! The object layer proper lives outside the capability space; these are
//! the minimal kernel objects the right manager binds into entries. Only
//! identity and liveness matter to the space.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use super::ipc_object::{IpcObject, IpcObjectId, IpcObjectType, ObjectRef};

/// Port state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Active,
    Dead,
}

/// A Mach-style port
#[derive(Debug)]
pub struct Port {
    id: IpcObjectId,
    active: AtomicBool,
}

impl Port {
    /// Create a new port
    pub fn new() -> Self {
        Self {
            id: IpcObjectId::generate(),
            active: AtomicBool::new(true),
        }
    }

    /// Create a new port behind a shared reference
    pub fn new_ref() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get the port ID
    pub fn id(&self) -> IpcObjectId {
        self.id
    }

    /// Mark the port dead
    pub fn destroy(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Get the port state
    pub fn state(&self) -> PortState {
        if self.active.load(Ordering::SeqCst) {
            PortState::Active
        } else {
            PortState::Dead
        }
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcObject for Port {
    fn object_id(&self) -> IpcObjectId {
        self.id
    }

    fn object_type(&self) -> IpcObjectType {
        IpcObjectType::Port
    }

    fn is_active(&self) -> bool {
        self.state() == PortState::Active
    }
}

/// A port set
#[derive(Debug)]
pub struct PortSet {
    id: IpcObjectId,
}

impl PortSet {
    /// Create a new, empty port set
    pub fn new() -> Self {
        Self {
            id: IpcObjectId::generate(),
        }
    }

    /// Get the set ID
    pub fn id(&self) -> IpcObjectId {
        self.id
    }
}

impl Default for PortSet {
    fn default() -> Self {
        Self::new()
    }
}

impl IpcObject for PortSet {
    fn object_id(&self) -> IpcObjectId {
        self.id
    }

    fn object_type(&self) -> IpcObjectType {
        IpcObjectType::PortSet
    }
}

/// Create a port and return it both typed and as an entry object reference
pub fn port_alloc() -> (Arc<Port>, ObjectRef) {
    let port = Port::new_ref();
    let object: ObjectRef = port.clone();
    (port, object)
}
