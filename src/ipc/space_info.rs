//! Space introspection
//!
//! Based on Mach4 ipc/mach_debug.c (`mach_port_names`, `mach_port_space_info`)
//!
//! Read-only views of a space taken under its read lock.

use alloc::vec::Vec;

use super::entry::{IpcEntryBits, RightKind};
use super::ipc_object::IpcObjectType;
use super::space::{IpcSpace, IpcSpaceRefs, SpaceId};
use super::{IpcResult, MachPortName};
use crate::kern::counters::CounterSnapshot;

/// One named right, as reported by [`names`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: MachPortName,
    /// Full `ie_bits` word: urefs, type, request flag and generation
    pub bits: IpcEntryBits,
    pub kind: RightKind,
    pub urefs: u16,
    pub object_type: IpcObjectType,
}

impl EntryInfo {
    /// Type field of the bits word
    pub fn type_bits(&self) -> u32 {
        self.kind.type_bits()
    }
}

/// List every name holding a right, in name order
pub fn names(space: &IpcSpace) -> IpcResult<Vec<EntryInfo>> {
    let guard = space.read()?;
    let infos = guard
        .iter()
        .filter_map(|entry| {
            let kind = entry.right_kind()?;
            let object = entry.object()?;
            Some(EntryInfo {
                name: entry.name(),
                bits: entry.bits(),
                kind,
                urefs: entry.urefs(),
                object_type: object.object_type(),
            })
        })
        .collect();
    Ok(infos)
}

/// Statistics for one space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceStats {
    pub id: SpaceId,
    pub refs: IpcSpaceRefs,
    /// Entries allocated and not yet freed
    pub live: usize,
    /// Nodes in the forward index, placeholder and free-listed ones included
    pub table_size: usize,
    pub free_list_len: usize,
    /// Names in the reverse index
    pub reverse_len: usize,
    pub counters: CounterSnapshot,
}

/// Snapshot a space's occupancy and counters
pub fn stats(space: &IpcSpace) -> IpcResult<SpaceStats> {
    let guard = space.read()?;
    Ok(SpaceStats {
        id: space.id(),
        refs: space.ref_count(),
        live: guard.live_count(),
        table_size: guard.table_size(),
        free_list_len: guard.free_list_len(),
        reverse_len: guard.reverse_len(),
        counters: space.counters().snapshot(),
    })
}
