//! IPC Rights - Manipulating the rights held in a space
//!
//! Based on Mach4 ipc/ipc_right.c
//!
//! The space only stores entries; deciding what a right means is done here.
//! Every operation holds the space write lock for its whole duration and
//! reports to the [`Notifier`] only after the lock is dropped.

use alloc::vec::Vec;

use super::entry::{PortRequestIndex, RightKind};
use super::ipc_object::{IpcObjectId, ObjectRef};
use super::notify::{Notification, Notifier};
use super::space::{IpcSpace, SpaceCleanup, SpaceId, SpaceWriteGuard};
use super::{IpcEntry, IpcError, IpcResult, MachPortName, MACH_PORT_NULL};

// ============================================================================
// Right Insertion
// ============================================================================

/// Merge `kind`/`urefs` into the tracked entry at `name`, which must name
/// `object`.
fn merge_into(
    guard: &mut SpaceWriteGuard<'_>,
    name: MachPortName,
    kind: RightKind,
    urefs: u16,
) -> IpcResult<()> {
    let existing = guard
        .lookup(name)
        .and_then(IpcEntry::right_kind)
        .ok_or(IpcError::InvalidRight(name))?;
    let merged = existing.merge(kind).ok_or(IpcError::InvalidRight(name))?;

    // Account urefs first so an overflow leaves the entry as it was
    guard
        .lookup_mut(name)
        .ok_or(IpcError::InvalidRight(name))?
        .add_urefs(urefs)?;
    if merged != existing {
        guard.set_kind(name, merged)?;
    }
    Ok(())
}

/// Insert a right over `object` into the space, returning its name.
///
/// Send and receive rights over an object the space already names are
/// merged into that entry (user references summed); anything else gets a
/// fresh name.
pub fn ipc_right_insert(
    space: &IpcSpace,
    kind: RightKind,
    object: ObjectRef,
    urefs: u16,
) -> IpcResult<MachPortName> {
    let mut guard = space.write()?;

    if kind.is_tracked() {
        let existing = guard
            .reverse_lookup(object.object_id())
            .map(|(name, _)| name);
        if let Some(name) = existing {
            merge_into(&mut guard, name, kind, urefs)?;
            return Ok(name);
        }
    }

    let name = guard.alloc()?;
    if let Err(err) = guard.bind(name, kind, object, urefs) {
        guard.dealloc(name);
        return Err(err);
    }
    Ok(name)
}

/// Insert a right over `object` at a caller-chosen name.
///
/// If `name` already holds a right over the same object the new right is
/// merged into it; a right over any other object is `NameExists`.
pub fn ipc_right_insert_named(
    space: &IpcSpace,
    name: MachPortName,
    kind: RightKind,
    object: ObjectRef,
    urefs: u16,
) -> IpcResult<()> {
    let mut guard = space.write()?;
    let how = guard.reserve_name(name)?;

    let held = guard
        .lookup(name)
        .and_then(|entry| entry.object())
        .map(|held| held.object_id());
    match held {
        Some(id) if id == object.object_id() => merge_into(&mut guard, name, kind, urefs),
        Some(_) => Err(IpcError::NameExists(name)),
        None => {
            if let Err(err) = guard.bind(name, kind, object, urefs) {
                guard.unreserve_name(name, how);
                return Err(err);
            }
            Ok(())
        }
    }
}

// ============================================================================
// Reference Adjustment
// ============================================================================

/// Does an entry holding `held` carry a right of kind `wanted`?
fn holds(held: RightKind, wanted: RightKind) -> bool {
    match wanted {
        RightKind::Send => held.has_send(),
        RightKind::Receive => held.has_receive(),
        other => held == other,
    }
}

/// Unbind the right at `name` and release the slot
fn release_right(guard: &mut SpaceWriteGuard<'_>, name: MachPortName) {
    if guard.unbind(name).is_some() {
        guard.dealloc(name);
    }
}

/// Adjust the user references of the `kind` right at `name` by `delta`.
///
/// When the count reaches zero the right goes away: a send+receive entry
/// keeps its other half, anything else is unbound and its slot released.
/// A receive right only accepts a delta of 0 or -1.
pub fn ipc_right_delta(
    space: &IpcSpace,
    name: MachPortName,
    kind: RightKind,
    delta: i32,
) -> IpcResult<()> {
    let mut guard = space.write()?;
    let held = guard
        .lookup(name)
        .and_then(IpcEntry::right_kind)
        .ok_or(IpcError::InvalidName(name))?;
    if !holds(held, kind) {
        return Err(IpcError::InvalidRight(name));
    }

    if kind == RightKind::Receive {
        return match delta {
            0 => Ok(()),
            -1 if held == RightKind::SendReceive => {
                guard.set_kind(name, RightKind::Send)?;
                Ok(())
            }
            -1 => {
                release_right(&mut guard, name);
                Ok(())
            }
            _ => Err(IpcError::InvalidRight(name)),
        };
    }

    let entry = guard.lookup_mut(name).ok_or(IpcError::InvalidName(name))?;
    if delta >= 0 {
        let up = u16::try_from(delta).map_err(|_| IpcError::UrefsOverflow)?;
        return entry.add_urefs(up);
    }

    let down = u16::try_from(delta.unsigned_abs()).map_err(|_| IpcError::InvalidRight(name))?;
    if !entry.remove_urefs(down)? {
        return Ok(());
    }

    if held == RightKind::SendReceive {
        guard.set_kind(name, RightKind::Receive)?;
    } else {
        release_right(&mut guard, name);
    }
    Ok(())
}

// ============================================================================
// Right Destruction
// ============================================================================

/// Notifications owed for a right that was just torn down
fn report_teardown<N: Notifier + ?Sized>(
    notifier: &N,
    space_id: SpaceId,
    name: MachPortName,
    kind: RightKind,
    request: PortRequestIndex,
    object: IpcObjectId,
) {
    if request != 0 {
        notifier.notify(Notification::port_deleted(space_id, name, request, object));
    }
    if kind.has_receive() {
        notifier.notify(Notification::no_senders(space_id, name, object));
    }
}

/// Destroy the right at `name` and release its slot
pub fn ipc_right_destroy<N: Notifier + ?Sized>(
    space: &IpcSpace,
    name: MachPortName,
    notifier: &N,
) -> IpcResult<()> {
    if name == MACH_PORT_NULL {
        return Err(IpcError::InvalidName(name));
    }

    let (kind, request, object) = {
        let mut guard = space.write()?;
        let request = guard
            .lookup(name)
            .map(IpcEntry::request)
            .ok_or(IpcError::InvalidName(name))?;
        let (kind, object) = guard.unbind(name).ok_or(IpcError::InvalidName(name))?;
        guard.dealloc(name);
        (kind, request, object)
    };

    log::trace!("{}: destroyed {} right {name:#x}", space.id(), kind.name());
    report_teardown(notifier, space.id(), name, kind, request, object.object_id());
    Ok(())
}

/// Turn every right a space holds over a dying object into a dead name.
///
/// Both the send right found through the reverse index and any send-once
/// rights over `object` are converted. Returns the affected names in name
/// order; empty if the space holds nothing over `object`. Pending requests
/// on those entries are consumed and reported as dead-name notifications.
pub fn ipc_right_dead<N: Notifier + ?Sized>(
    space: &IpcSpace,
    object: IpcObjectId,
    notifier: &N,
) -> IpcResult<Vec<MachPortName>> {
    let (names, requests) = {
        let mut guard = space.write()?;
        let mut names = Vec::new();
        if let Some((name, entry)) = guard.reverse_lookup(object) {
            if entry.right_kind().is_some_and(RightKind::has_receive) {
                // The receiver is the one killing the object
                return Err(IpcError::InvalidRight(name));
            }
            names.push(name);
        }
        // Send-once rights are not in the reverse index
        names.extend(
            guard
                .iter()
                .filter(|entry| entry.right_kind() == Some(RightKind::SendOnce))
                .filter(|entry| entry.object().is_some_and(|held| held.object_id() == object))
                .map(IpcEntry::name),
        );
        names.sort_unstable();

        let mut requests = Vec::new();
        for &name in &names {
            guard.set_kind(name, RightKind::DeadName)?;
            if let Some(entry) = guard.lookup_mut(name) {
                let request = entry.request();
                entry.set_request(0);
                if request != 0 {
                    requests.push((name, request));
                }
            }
        }
        (names, requests)
    };

    for (name, request) in requests {
        notifier.notify(Notification::dead_name(space.id(), name, request, object));
    }
    Ok(names)
}

// ============================================================================
// Space Cleanup
// ============================================================================

/// Destroy callback tearing down every right in a dying space
pub struct RightCleanup<'a, N: Notifier + ?Sized> {
    notifier: &'a N,
    cleaned: usize,
}

impl<'a, N: Notifier + ?Sized> RightCleanup<'a, N> {
    pub fn new(notifier: &'a N) -> Self {
        Self {
            notifier,
            cleaned: 0,
        }
    }

    /// Rights torn down so far
    pub fn cleaned(&self) -> usize {
        self.cleaned
    }
}

impl<N: Notifier + ?Sized> SpaceCleanup for RightCleanup<'_, N> {
    fn clean_entry(&mut self, space: &IpcSpace, name: MachPortName, entry: &mut IpcEntry) {
        let request = entry.request();
        let Some((kind, object)) = entry.unbind() else {
            return;
        };
        report_teardown(
            self.notifier,
            space.id(),
            name,
            kind,
            request,
            object.object_id(),
        );
        self.cleaned += 1;
    }
}
