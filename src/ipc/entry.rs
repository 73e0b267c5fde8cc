//! IPC Entry - Port name to capability translation
//!
//! Based on Mach4 ipc/ipc_entry.h
//! Each ipc_entry records a capability (port right) in a task's IPC space.
//!
//! The packed `ie_bits` word keeps its historical layout (urefs, type,
//! request flag, generation), but the object reference and the pending
//! request index only exist while a right is bound: [`EntryState`] makes
//! "no object iff no right" a property of the type.

use super::ipc_object::ObjectRef;
use super::{mach_port_index, mach_port_make, IpcError, MachPortName, IE_GEN_ENABLED};

/// Entry bits field type
pub type IpcEntryBits = u32;

/// Index into the notifier's per-object request table (0 = none)
pub type PortRequestIndex = u32;

// ============================================================================
// Entry Bits Constants (from Mach4 ipc_entry.h)
// ============================================================================

/// Mask for user references (16 bits)
pub const IE_BITS_UREFS_MASK: u32 = 0x0000_FFFF;

/// Extract user references from bits
#[inline]
pub const fn ie_bits_urefs(bits: IpcEntryBits) -> u16 {
    (bits & IE_BITS_UREFS_MASK) as u16
}

/// Mask for capability type (5 bits)
pub const IE_BITS_TYPE_MASK: u32 = 0x001F_0000;

/// Extract type from bits
#[inline]
pub const fn ie_bits_type(bits: IpcEntryBits) -> u32 {
    bits & IE_BITS_TYPE_MASK
}

/// Msg-accepted request bit
pub const IE_BITS_MAREQUEST: u32 = 0x0020_0000;

/// Mask for all bits relevant to the right
pub const IE_BITS_RIGHT_MASK: u32 = IE_BITS_UREFS_MASK | IE_BITS_TYPE_MASK | IE_BITS_MAREQUEST;

/// Mask for generation number (8 bits)
pub const IE_BITS_GEN_MASK: u32 = 0xFF00_0000;

/// Extract generation from bits
#[inline]
pub const fn ie_bits_gen(bits: IpcEntryBits) -> u32 {
    bits & IE_BITS_GEN_MASK
}

/// One generation increment
pub const IE_BITS_GEN_ONE: u32 = 0x0100_0000;

/// Generation to use when a free entry is handed out again
#[inline]
pub const fn ie_bits_new_gen(bits: IpcEntryBits) -> u32 {
    if IE_GEN_ENABLED {
        ie_bits_gen(bits).wrapping_add(IE_BITS_GEN_ONE) & IE_BITS_GEN_MASK
    } else {
        ie_bits_gen(bits)
    }
}

// ============================================================================
// Port Right Types (shifted into IE_BITS_TYPE position)
// ============================================================================

/// Send right
pub const MACH_PORT_TYPE_SEND: u32 = 0x0001_0000;

/// Receive right
pub const MACH_PORT_TYPE_RECEIVE: u32 = 0x0002_0000;

/// Send-once right
pub const MACH_PORT_TYPE_SEND_ONCE: u32 = 0x0004_0000;

/// Port set
pub const MACH_PORT_TYPE_PORT_SET: u32 = 0x0008_0000;

/// Dead name (port was destroyed)
pub const MACH_PORT_TYPE_DEAD_NAME: u32 = 0x0010_0000;

/// Send and receive rights under one name
pub const MACH_PORT_TYPE_SEND_RECEIVE: u32 = MACH_PORT_TYPE_SEND | MACH_PORT_TYPE_RECEIVE;

/// Kind of right bound to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RightKind {
    Send,
    Receive,
    SendReceive,
    SendOnce,
    PortSet,
    DeadName,
}

impl RightKind {
    /// Type bits for this kind
    pub const fn type_bits(self) -> u32 {
        match self {
            Self::Send => MACH_PORT_TYPE_SEND,
            Self::Receive => MACH_PORT_TYPE_RECEIVE,
            Self::SendReceive => MACH_PORT_TYPE_SEND_RECEIVE,
            Self::SendOnce => MACH_PORT_TYPE_SEND_ONCE,
            Self::PortSet => MACH_PORT_TYPE_PORT_SET,
            Self::DeadName => MACH_PORT_TYPE_DEAD_NAME,
        }
    }

    /// Decode the type field of an entry bits word
    pub const fn from_type_bits(bits: IpcEntryBits) -> Option<Self> {
        match ie_bits_type(bits) {
            MACH_PORT_TYPE_SEND => Some(Self::Send),
            MACH_PORT_TYPE_RECEIVE => Some(Self::Receive),
            MACH_PORT_TYPE_SEND_RECEIVE => Some(Self::SendReceive),
            MACH_PORT_TYPE_SEND_ONCE => Some(Self::SendOnce),
            MACH_PORT_TYPE_PORT_SET => Some(Self::PortSet),
            MACH_PORT_TYPE_DEAD_NAME => Some(Self::DeadName),
            _ => None,
        }
    }

    #[inline]
    pub const fn has_send(self) -> bool {
        matches!(self, Self::Send | Self::SendReceive)
    }

    #[inline]
    pub const fn has_receive(self) -> bool {
        matches!(self, Self::Receive | Self::SendReceive)
    }

    /// Whether entries of this kind appear in the reverse index.
    ///
    /// A space names a port at most once for its send and receive rights;
    /// send-once rights, port sets and dead names each get their own name.
    #[inline]
    pub const fn is_tracked(self) -> bool {
        self.has_send() || self.has_receive()
    }

    /// Kind resulting from adding `other` to an entry holding `self`
    pub const fn merge(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Send, Self::Send) => Some(Self::Send),
            (Self::Receive, Self::Send)
            | (Self::Send, Self::Receive)
            | (Self::SendReceive, Self::Send) => Some(Self::SendReceive),
            _ => None,
        }
    }

    /// Get type name for debugging
    pub fn name(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::SendReceive => "send+receive",
            Self::SendOnce => "send-once",
            Self::PortSet => "port-set",
            Self::DeadName => "dead-name",
        }
    }
}

// ============================================================================
// IPC Entry - A single capability record
// ============================================================================

/// What an entry currently holds
#[derive(Debug, Clone)]
pub enum EntryState {
    /// No right. The entry is parked on the free list, is the null
    /// placeholder, or was handed out and not yet bound.
    Vacant,
    /// A right over `object`
    Active {
        kind: RightKind,
        object: ObjectRef,
        /// Pending notification request, owned by the notifier
        request: PortRequestIndex,
    },
}

/// IPC Entry - records a single capability in a task's IPC space
#[derive(Debug, Clone)]
pub struct IpcEntry {
    name: MachPortName,
    /// urefs | MAREQUEST | generation; the type field is derived from `state`
    bits: IpcEntryBits,
    state: EntryState,
}

impl IpcEntry {
    /// Create an empty entry bound to `name`
    pub(crate) const fn new(name: MachPortName) -> Self {
        Self {
            name,
            bits: 0,
            state: EntryState::Vacant,
        }
    }

    #[inline]
    pub fn name(&self) -> MachPortName {
        self.name
    }

    /// Packed bits in the historical `ie_bits` layout
    #[inline]
    pub fn bits(&self) -> IpcEntryBits {
        let type_bits = self.right_kind().map_or(0, RightKind::type_bits);
        self.bits | type_bits
    }

    #[inline]
    pub fn state(&self) -> &EntryState {
        &self.state
    }

    /// Kind of right held, `None` for a vacant entry
    #[inline]
    pub fn right_kind(&self) -> Option<RightKind> {
        match &self.state {
            EntryState::Vacant => None,
            EntryState::Active { kind, .. } => Some(*kind),
        }
    }

    #[inline]
    pub fn is_vacant(&self) -> bool {
        matches!(self.state, EntryState::Vacant)
    }

    /// Get user reference count
    #[inline]
    pub fn urefs(&self) -> u16 {
        ie_bits_urefs(self.bits)
    }

    /// Get generation number
    #[inline]
    pub fn generation(&self) -> u32 {
        ie_bits_gen(self.bits)
    }

    /// Get the IPC object
    #[inline]
    pub fn object(&self) -> Option<&ObjectRef> {
        match &self.state {
            EntryState::Vacant => None,
            EntryState::Active { object, .. } => Some(object),
        }
    }

    /// Get request index (0 when none is pending or the entry is vacant)
    #[inline]
    pub fn request(&self) -> PortRequestIndex {
        match &self.state {
            EntryState::Vacant => 0,
            EntryState::Active { request, .. } => *request,
        }
    }

    /// Record a pending request index; ignored on a vacant entry
    pub fn set_request(&mut self, index: PortRequestIndex) {
        debug_assert!(!self.is_vacant(), "request on vacant entry {:#x}", self.name);
        if let EntryState::Active { request, .. } = &mut self.state {
            *request = index;
        }
    }

    #[inline]
    pub fn has_marequest(&self) -> bool {
        self.bits & IE_BITS_MAREQUEST != 0
    }

    pub fn set_marequest(&mut self) {
        self.bits |= IE_BITS_MAREQUEST;
    }

    pub fn clear_marequest(&mut self) {
        self.bits &= !IE_BITS_MAREQUEST;
    }

    /// Add user references
    pub fn add_urefs(&mut self, delta: u16) -> Result<(), IpcError> {
        let new_urefs = self
            .urefs()
            .checked_add(delta)
            .ok_or(IpcError::UrefsOverflow)?;
        self.bits = (self.bits & !IE_BITS_UREFS_MASK) | u32::from(new_urefs);
        Ok(())
    }

    /// Remove user references, returns true if none are left
    pub fn remove_urefs(&mut self, delta: u16) -> Result<bool, IpcError> {
        let current = self.urefs();
        if delta > current {
            return Err(IpcError::InvalidRight(self.name));
        }
        let new_urefs = current - delta;
        self.bits = (self.bits & !IE_BITS_UREFS_MASK) | u32::from(new_urefs);
        Ok(new_urefs == 0)
    }

    // ========================================================================
    // State transitions driven by the space
    // ========================================================================

    /// Bind a right. The entry must be vacant.
    pub(crate) fn bind(&mut self, kind: RightKind, object: ObjectRef, urefs: u16) {
        debug_assert!(self.is_vacant(), "bind over live entry {:#x}", self.name);
        self.bits = self.generation() | u32::from(urefs);
        self.state = EntryState::Active {
            kind,
            object,
            request: 0,
        };
    }

    /// Drop the right, returning what was bound
    pub(crate) fn unbind(&mut self) -> Option<(RightKind, ObjectRef)> {
        self.bits = self.generation();
        match core::mem::replace(&mut self.state, EntryState::Vacant) {
            EntryState::Vacant => None,
            EntryState::Active { kind, object, .. } => Some((kind, object)),
        }
    }

    /// Change the kind of a bound right, returning the previous kind
    pub(crate) fn set_kind(&mut self, new_kind: RightKind) -> Option<RightKind> {
        match &mut self.state {
            EntryState::Vacant => None,
            EntryState::Active { kind, .. } => Some(core::mem::replace(kind, new_kind)),
        }
    }

    /// Mask the bits down to the generation before parking on the free list
    pub(crate) fn reclaim(&mut self) {
        debug_assert!(self.is_vacant(), "reclaim of live entry {:#x}", self.name);
        self.bits = self.generation();
    }

    /// Take the entry off the free list, returning its (possibly new) name
    pub(crate) fn reactivate(&mut self) -> MachPortName {
        debug_assert!(self.is_vacant());
        self.bits = ie_bits_new_gen(self.bits);
        self.name = mach_port_make(mach_port_index(self.name), self.generation());
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::port::port_alloc;

    #[test]
    fn test_entry_bits() {
        assert_eq!(ie_bits_urefs(0x0000_1234), 0x1234);
        assert_eq!(ie_bits_type(MACH_PORT_TYPE_SEND), MACH_PORT_TYPE_SEND);
        assert_eq!(ie_bits_gen(0xFF00_0000), 0xFF00_0000);
        assert_eq!(ie_bits_new_gen(0x0300_0000), 0x0300_0000);
    }

    #[test]
    fn test_kind_round_trips_through_type_bits() {
        for kind in [
            RightKind::Send,
            RightKind::Receive,
            RightKind::SendReceive,
            RightKind::SendOnce,
            RightKind::PortSet,
            RightKind::DeadName,
        ] {
            assert_eq!(RightKind::from_type_bits(kind.type_bits()), Some(kind));
        }
        assert_eq!(RightKind::from_type_bits(0), None);
    }

    #[test]
    fn test_merge_rules() {
        assert_eq!(
            RightKind::Receive.merge(RightKind::Send),
            Some(RightKind::SendReceive)
        );
        assert_eq!(RightKind::Send.merge(RightKind::Send), Some(RightKind::Send));
        assert_eq!(RightKind::SendOnce.merge(RightKind::Send), None);
        assert_eq!(RightKind::Receive.merge(RightKind::Receive), None);
    }

    #[test]
    fn test_bind_unbind_keeps_object_and_kind_together() {
        let (_port, object) = port_alloc();
        let mut entry = IpcEntry::new(7);
        assert!(entry.object().is_none());
        assert_eq!(entry.bits(), 0);

        entry.bind(RightKind::Send, object, 3);
        assert_eq!(entry.right_kind(), Some(RightKind::Send));
        assert!(entry.object().is_some());
        assert_eq!(entry.bits(), MACH_PORT_TYPE_SEND | 3);

        entry.set_request(5);
        entry.set_marequest();
        assert_eq!(entry.request(), 5);

        let (kind, _object) = entry.unbind().unwrap();
        assert_eq!(kind, RightKind::Send);
        assert!(entry.is_vacant());
        assert_eq!(entry.request(), 0);
        assert_eq!(entry.bits(), 0);
    }

    #[test]
    fn test_urefs() {
        let (_port, object) = port_alloc();
        let mut entry = IpcEntry::new(1);
        entry.bind(RightKind::Send, object, 1);

        entry.add_urefs(2).unwrap();
        assert_eq!(entry.urefs(), 3);
        assert!(!entry.remove_urefs(2).unwrap());
        assert_eq!(entry.remove_urefs(2), Err(IpcError::InvalidRight(1)));
        assert!(entry.remove_urefs(1).unwrap());

        entry.add_urefs(u16::MAX).unwrap();
        assert_eq!(entry.add_urefs(1), Err(IpcError::UrefsOverflow));
    }

    #[test]
    fn test_reactivate_keeps_name_without_generation() {
        let mut entry = IpcEntry::new(9);
        entry.set_marequest();
        entry.reclaim();
        assert_eq!(entry.reactivate(), 9);
        assert!(!entry.has_marequest());
    }
}
