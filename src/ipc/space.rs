//! IPC Space - Per-task IPC capability namespace
//!
//! Based on Mach4 ipc/ipc_space.h
//! Every task has an IPC space containing its port capabilities.
//!
//! A space holds:
//! - a forward index from name to [`IpcEntry`],
//! - a reverse index from port identity to name,
//! - a bounded free list of reclaimed entries for cheap name reuse,
//! - the active flag and the count of live entries,
//!
//! all behind one read/write content lock, plus a reference count behind a
//! separate lock. Lookups share the content lock; every mutation holds it
//! exclusively for the whole operation. `entry_alloc` and `entry_alloc_name`
//! hand the write guard back so the caller binds its right in the same
//! critical section.

use alloc::sync::Arc;
use core::fmt;
use core::ops::Deref;
use core::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use super::entry::{IpcEntry, RightKind};
use super::free_list::{FreeList, IS_FREE_LIST_SIZE_LIMIT};
use super::ipc_hash::IpcReverseHash;
use super::ipc_object::{IpcObjectId, ObjectRef};
use super::ipc_tree::IpcEntryTree;
use super::{
    mach_port_index, mach_port_valid, IpcError, IpcResult, MachPortIndex, MachPortName,
    MACH_PORT_INDEX_MAX,
};
use crate::kern::counters::{
    SpaceCounters, C_IPC_SPACE_CREATED, C_IPC_SPACE_DESTROYED, C_IPC_SPACE_FREED,
};
use crate::kern::lock::{ContentLock, ContentReadGuard, ContentWriteGuard, RefLock};

/// Space reference count type
pub type IpcSpaceRefs = u32;

/// References a new space starts with: the creator's and the active one
const IS_INITIAL_REFS: IpcSpaceRefs = 2;

// ============================================================================
// Space identity and configuration
// ============================================================================

/// Space ID type - newtype for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SpaceId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "space#{}", self.0)
    }
}

/// Next space ID counter
static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(1);

/// What a space is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// A task's capability table
    Task,
    /// Holds naked receive rights in transit; never names anything
    Special,
}

/// Tunables for a space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceConfig {
    /// Free list length, clamped to [`IS_FREE_LIST_SIZE_LIMIT`]
    pub free_list_limit: usize,
    /// Maximum nodes in the forward index, placeholder included
    pub max_entries: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            free_list_limit: IS_FREE_LIST_SIZE_LIMIT,
            max_entries: MACH_PORT_INDEX_MAX as usize,
        }
    }
}

impl SpaceConfig {
    pub fn with_free_list_limit(mut self, limit: usize) -> Self {
        self.free_list_limit = limit.min(IS_FREE_LIST_SIZE_LIMIT);
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

/// What `alloc_name` did to produce the entry at a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameAlloc {
    /// A new node was inserted
    Created,
    /// A free-listed node was taken off the list
    Revived,
    /// The node was already handed out (bound or not) and is untouched
    Existing,
}

// ============================================================================
// Space contents (protected by the content lock)
// ============================================================================

struct SpaceContent {
    active: bool,
    tree: IpcEntryTree,
    hash: IpcReverseHash,
    free_list: FreeList,
    /// Entries handed out and not yet deallocated
    live_count: usize,
}

impl SpaceContent {
    fn new(config: &SpaceConfig) -> Self {
        Self {
            active: true,
            tree: IpcEntryTree::with_placeholder(),
            hash: IpcReverseHash::new(),
            free_list: FreeList::new(config.free_list_limit),
            live_count: 0,
        }
    }

    fn lookup(&self, name: MachPortName) -> Option<&IpcEntry> {
        self.tree
            .get(mach_port_index(name))
            .filter(|entry| entry.name() == name && !entry.is_vacant())
    }

    fn lookup_mut(&mut self, name: MachPortName) -> Option<&mut IpcEntry> {
        self.tree
            .get_mut(mach_port_index(name))
            .filter(|entry| entry.name() == name && !entry.is_vacant())
    }

    fn reverse_lookup(&self, object: IpcObjectId) -> Option<(MachPortName, &IpcEntry)> {
        let name = self.hash.lookup(object)?;
        self.lookup(name).map(|entry| (name, entry))
    }

    /// Pop the free list, reactivating the entry in place
    fn alloc_fast(&mut self) -> Option<MachPortName> {
        let index = self.free_list.pop()?;
        let entry = self.tree.get_mut(index)?;
        let name = entry.reactivate();
        self.live_count += 1;
        Some(name)
    }

    fn alloc(&mut self, config: &SpaceConfig, counters: &SpaceCounters) -> IpcResult<MachPortName> {
        if let Some(name) = self.alloc_fast() {
            crate::counter!(counters.alloc_fast);
            return Ok(name);
        }

        if self.tree.len() >= config.max_entries {
            return Err(IpcError::ResourceShortage);
        }
        let (name, _entry) = self.tree.insert_alloc()?;
        self.live_count += 1;
        crate::counter!(counters.alloc_tree);
        Ok(name)
    }

    fn alloc_name(
        &mut self,
        name: MachPortName,
        config: &SpaceConfig,
        counters: &SpaceCounters,
    ) -> IpcResult<NameAlloc> {
        let index = mach_port_index(name);
        if !mach_port_valid(name) || index == 0 || index > MACH_PORT_INDEX_MAX {
            return Err(IpcError::InvalidName(name));
        }
        crate::counter!(counters.alloc_named);

        if !self.tree.contains(index) {
            if self.tree.len() >= config.max_entries {
                return Err(IpcError::ResourceShortage);
            }
            self.tree.insert(name)?;
            self.live_count += 1;
            return Ok(NameAlloc::Created);
        }

        let Some(entry) = self.tree.get_mut(index) else {
            return Err(IpcError::InvalidName(name));
        };
        if entry.is_vacant() {
            // Either parked on the free list, or already handed out and
            // not bound yet. Only the former needs reviving.
            crate::counter!(counters.free_list_scans);
            if self.free_list.unlink(index) {
                entry.reactivate();
                self.live_count += 1;
                return Ok(NameAlloc::Revived);
            }
        }
        Ok(NameAlloc::Existing)
    }

    /// Undo an `alloc_name` that returned `how`, once nothing was bound
    fn unalloc_name(&mut self, name: MachPortName, how: NameAlloc) {
        let index = mach_port_index(name);
        match how {
            NameAlloc::Existing => {}
            NameAlloc::Created => {
                debug_assert!(self.tree.get(index).is_some_and(IpcEntry::is_vacant));
                self.tree.remove(index);
                self.live_count = self.live_count.saturating_sub(1);
            }
            NameAlloc::Revived => {
                let Some(entry) = self.tree.get_mut(index) else {
                    return;
                };
                debug_assert!(entry.is_vacant());
                // The unlink just made room, so this only fails on a
                // limit-0 list, which never revives anything.
                if self.free_list.push(index) {
                    entry.reclaim();
                } else {
                    self.tree.remove(index);
                }
                self.live_count = self.live_count.saturating_sub(1);
            }
        }
    }

    fn dealloc(&mut self, name: MachPortName, counters: &SpaceCounters) {
        let index = mach_port_index(name);
        debug_assert!(index != 0, "dealloc of the null placeholder");
        debug_assert!(!self.free_list.contains(index), "double dealloc of {name:#x}");

        let Some(entry) = self.tree.get_mut(index) else {
            debug_assert!(false, "dealloc of unknown name {name:#x}");
            return;
        };
        debug_assert!(entry.is_vacant(), "dealloc of bound entry {name:#x}");
        debug_assert!(entry.request() == 0);

        crate::counter!(counters.deallocs);
        if self.free_list.push(index) {
            entry.reclaim();
            counters.free_list_high_water.update_max(self.free_list.len() as u64);
        } else {
            self.tree.remove(index);
            crate::counter!(counters.nodes_freed);
        }
        debug_assert!(self.live_count > 0);
        self.live_count = self.live_count.saturating_sub(1);
    }

    fn bind(
        &mut self,
        name: MachPortName,
        kind: RightKind,
        object: ObjectRef,
        urefs: u16,
    ) -> IpcResult<()> {
        let index = mach_port_index(name);
        if self.free_list.contains(index) {
            return Err(IpcError::InvalidName(name));
        }
        let entry = self
            .tree
            .get_mut(index)
            .filter(|entry| entry.name() == name && index != 0)
            .ok_or(IpcError::InvalidName(name))?;
        if !entry.is_vacant() {
            return Err(IpcError::NameExists(name));
        }

        if kind.is_tracked() {
            let id = object.object_id();
            if let Some(other) = self.hash.lookup(id) {
                return Err(IpcError::NameExists(other));
            }
            self.hash.insert(id, name);
        }
        entry.bind(kind, object, urefs);
        Ok(())
    }

    fn unbind(&mut self, name: MachPortName) -> Option<(RightKind, ObjectRef)> {
        let entry = self
            .tree
            .get_mut(mach_port_index(name))
            .filter(|entry| entry.name() == name)?;
        let (kind, object) = entry.unbind()?;
        if kind.is_tracked() {
            let id = object.object_id();
            if self.hash.lookup(id) == Some(name) {
                self.hash.delete(id);
            }
        }
        Some((kind, object))
    }

    fn set_kind(&mut self, name: MachPortName, new_kind: RightKind) -> IpcResult<RightKind> {
        let (old_kind, id) = {
            let entry = self.lookup(name).ok_or(IpcError::InvalidRight(name))?;
            let old_kind = entry.right_kind().ok_or(IpcError::InvalidRight(name))?;
            let id = entry
                .object()
                .map(|object| object.object_id())
                .ok_or(IpcError::InvalidRight(name))?;
            (old_kind, id)
        };

        match (old_kind.is_tracked(), new_kind.is_tracked()) {
            (true, false) => {
                self.hash.delete(id);
            }
            (false, true) => {
                if let Some(other) = self.hash.lookup(id) {
                    return Err(IpcError::NameExists(other));
                }
                self.hash.insert(id, name);
            }
            _ => {}
        }

        let entry = self.lookup_mut(name).ok_or(IpcError::InvalidRight(name))?;
        entry.set_kind(new_kind);
        Ok(old_kind)
    }
}

// ============================================================================
// Destroy callback
// ============================================================================

/// Per-entry teardown run by [`IpcSpace::destroy`]
///
/// Called once for every entry holding a right, without the content lock
/// held. The entry is freed after the call returns.
pub trait SpaceCleanup {
    fn clean_entry(&mut self, space: &IpcSpace, name: MachPortName, entry: &mut IpcEntry);
}

impl<F> SpaceCleanup for F
where
    F: FnMut(&IpcSpace, MachPortName, &mut IpcEntry),
{
    fn clean_entry(&mut self, space: &IpcSpace, name: MachPortName, entry: &mut IpcEntry) {
        self(space, name, entry)
    }
}

// ============================================================================
// IPC Space - Per-task capability namespace
// ============================================================================

/// IPC Space - contains all port capabilities for a task
///
/// From Mach4 ipc_space.h:
/// - is_references: reference count (own lock)
/// - is_active: is the space alive?
/// - the entry tables (content lock)
pub struct IpcSpace {
    /// Unique space identifier
    id: SpaceId,
    kind: SpaceKind,
    config: SpaceConfig,
    /// Reference count
    refs: RefLock,
    content: ContentLock<SpaceContent>,
    counters: SpaceCounters,
}

impl IpcSpace {
    fn new(kind: SpaceKind, config: SpaceConfig) -> Self {
        let id = SpaceId(NEXT_SPACE_ID.fetch_add(1, Ordering::SeqCst));
        crate::counter!(C_IPC_SPACE_CREATED);
        debug!("{id}: created ({kind:?})");

        Self {
            id,
            kind,
            refs: RefLock::new(IS_INITIAL_REFS),
            content: ContentLock::new(SpaceContent::new(&config)),
            config,
            counters: SpaceCounters::new(),
        }
    }

    /// Create a new IPC space
    pub fn create() -> SpaceRef {
        Self::with_config(SpaceConfig::default())
    }

    /// Create a new IPC space with specific tunables
    pub fn with_config(config: SpaceConfig) -> SpaceRef {
        SpaceRef::adopt(Self::new(SpaceKind::Task, config))
    }

    /// Create a special space for naked receive rights
    pub fn create_special() -> SpaceRef {
        SpaceRef::adopt(Self::new(SpaceKind::Special, SpaceConfig::default()))
    }

    /// Get space ID
    #[inline]
    pub fn id(&self) -> SpaceId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> SpaceKind {
        self.kind
    }

    #[inline]
    pub fn is_special(&self) -> bool {
        self.kind == SpaceKind::Special
    }

    #[inline]
    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    pub fn counters(&self) -> &SpaceCounters {
        &self.counters
    }

    /// Check if space is active
    pub fn is_active(&self) -> bool {
        self.content.read().active
    }

    /// Get current reference count
    pub fn ref_count(&self) -> IpcSpaceRefs {
        self.refs.count()
    }

    /// Drop one reference; the last one retires the structure
    fn release(&self) {
        if self.refs.release() {
            crate::counter!(C_IPC_SPACE_FREED);
            debug!("{}: last reference dropped", self.id);
        }
    }

    // ========================================================================
    // Locking
    // ========================================================================

    /// Lock the space for reading. Fails if it is no longer active.
    pub fn read(&self) -> IpcResult<SpaceReadGuard<'_>> {
        let content = self.content.read();
        if !content.active {
            return Err(IpcError::InvalidTask);
        }
        Ok(SpaceReadGuard {
            space: self,
            content,
        })
    }

    /// Lock the space for writing. Fails if it is no longer active.
    pub fn write(&self) -> IpcResult<SpaceWriteGuard<'_>> {
        let content = self.content.write();
        if !content.active {
            warn!("{}: write on inactive space", self.id);
            return Err(IpcError::InvalidTask);
        }
        Ok(SpaceWriteGuard {
            space: self,
            content,
        })
    }

    // ========================================================================
    // Entry Operations
    // ========================================================================

    /// Look up an entry by port name, returning a copy
    pub fn lookup(&self, name: MachPortName) -> IpcResult<Option<IpcEntry>> {
        let guard = self.read()?;
        Ok(guard.lookup(name).cloned())
    }

    /// Allocate a new entry.
    ///
    /// On success the space stays write-locked: the guard is returned so the
    /// caller can bind a right before anyone else sees the name.
    pub fn entry_alloc(&self) -> IpcResult<(MachPortName, SpaceWriteGuard<'_>)> {
        let mut guard = self.write()?;
        let name = guard.alloc()?;
        Ok((name, guard))
    }

    /// Allocate the entry at `name`, keeping the space write-locked.
    ///
    /// If `name` already holds a right the existing entry is left as-is;
    /// callers inspect it through the guard.
    pub fn entry_alloc_name(&self, name: MachPortName) -> IpcResult<SpaceWriteGuard<'_>> {
        let mut guard = self.write()?;
        guard.alloc_name(name)?;
        Ok(guard)
    }

    /// Find the name holding send/receive rights for `object` (reverse lookup)
    pub fn find_entry(&self, object: IpcObjectId) -> IpcResult<Option<(MachPortName, IpcEntry)>> {
        let guard = self.read()?;
        Ok(guard
            .reverse_lookup(object)
            .map(|(name, entry)| (name, entry.clone())))
    }

    /// Get number of live entries
    pub fn entry_count(&self) -> usize {
        self.content.read().live_count
    }

    /// Get number of nodes in the forward index
    pub fn table_size(&self) -> usize {
        self.content.read().tree.len()
    }

    /// Get free list length
    pub fn free_list_len(&self) -> usize {
        self.content.read().free_list.len()
    }

    // ========================================================================
    // Space Lifecycle
    // ========================================================================

    /// Destroy the space.
    ///
    /// Deactivates the space, then runs `cleanup` on every entry that holds
    /// a right and frees all entries. Only the first caller does this and
    /// gets `true`; later (or concurrent) calls return `false` at once.
    pub fn destroy<C>(&self, cleanup: &mut C) -> bool
    where
        C: SpaceCleanup + ?Sized,
    {
        let tree = {
            let mut content = self.content.write();
            if !content.active {
                return false;
            }
            content.active = false;
            content.hash = IpcReverseHash::new();
            content.free_list.clear();
            content.live_count = 0;
            core::mem::take(&mut content.tree)
        };

        // Nobody can mutate an inactive space, so the detached tree is
        // walked without the lock.
        let mut cleaned = 0usize;
        for (_index, mut entry) in tree {
            if entry.is_vacant() {
                continue;
            }
            let name = entry.name();
            cleanup.clean_entry(self, name, &mut entry);
            cleaned += 1;
        }

        crate::counter!(C_IPC_SPACE_DESTROYED);
        debug!("{}: destroyed, {cleaned} rights cleaned", self.id);
        self.release();
        true
    }
}

impl fmt::Debug for IpcSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpcSpace")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("refs", &self.refs)
            .field("content", &self.content)
            .finish()
    }
}

// ============================================================================
// Space references
// ============================================================================

/// Counted handle on a space
///
/// Cloning takes a space reference and dropping releases it, under the
/// space's reference lock only.
pub struct SpaceRef {
    space: Arc<IpcSpace>,
}

impl SpaceRef {
    /// Wrap a new space; its initial count already covers this handle
    fn adopt(space: IpcSpace) -> Self {
        Self {
            space: Arc::new(space),
        }
    }

    /// Do two handles refer to the same space?
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.space, &b.space)
    }
}

impl Clone for SpaceRef {
    fn clone(&self) -> Self {
        self.space.refs.reference();
        Self {
            space: Arc::clone(&self.space),
        }
    }
}

impl Drop for SpaceRef {
    fn drop(&mut self) {
        self.space.release();
    }
}

impl Deref for SpaceRef {
    type Target = IpcSpace;

    fn deref(&self) -> &IpcSpace {
        &self.space
    }
}

impl fmt::Debug for SpaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.space, f)
    }
}

// ============================================================================
// Guards
// ============================================================================

/// Shared access to an active space
pub struct SpaceReadGuard<'a> {
    space: &'a IpcSpace,
    content: ContentReadGuard<'a, SpaceContent>,
}

impl<'a> SpaceReadGuard<'a> {
    pub fn space(&self) -> &'a IpcSpace {
        self.space
    }

    /// Look up the entry holding a right under `name`
    pub fn lookup(&self, name: MachPortName) -> Option<&IpcEntry> {
        crate::counter!(self.space.counters.lookups);
        let entry = self.content.lookup(name);
        if entry.is_some() {
            crate::counter!(self.space.counters.lookup_hits);
        }
        entry
    }

    /// Find the entry holding send/receive rights for `object`
    pub fn reverse_lookup(&self, object: IpcObjectId) -> Option<(MachPortName, &IpcEntry)> {
        self.content.reverse_lookup(object)
    }

    /// Entries holding a right, in name order
    pub fn iter(&self) -> impl Iterator<Item = &IpcEntry> {
        self.content
            .tree
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_vacant())
    }

    pub fn live_count(&self) -> usize {
        self.content.live_count
    }

    pub fn table_size(&self) -> usize {
        self.content.tree.len()
    }

    pub fn free_list_len(&self) -> usize {
        self.content.free_list.len()
    }

    pub fn reverse_len(&self) -> usize {
        self.content.hash.len()
    }
}

/// Exclusive access to an active space
pub struct SpaceWriteGuard<'a> {
    space: &'a IpcSpace,
    content: ContentWriteGuard<'a, SpaceContent>,
}

impl<'a> SpaceWriteGuard<'a> {
    pub fn space(&self) -> &'a IpcSpace {
        self.space
    }

    /// Look up the entry holding a right under `name`
    pub fn lookup(&self, name: MachPortName) -> Option<&IpcEntry> {
        crate::counter!(self.space.counters.lookups);
        let entry = self.content.lookup(name);
        if entry.is_some() {
            crate::counter!(self.space.counters.lookup_hits);
        }
        entry
    }

    /// Mutable lookup, for adjusting urefs and request state
    pub fn lookup_mut(&mut self, name: MachPortName) -> Option<&mut IpcEntry> {
        self.content.lookup_mut(name)
    }

    /// Raw node at `name`, including entries without a right
    pub fn entry(&self, name: MachPortName) -> Option<&IpcEntry> {
        self.content
            .tree
            .get(mach_port_index(name))
            .filter(|entry| entry.name() == name)
    }

    /// Find the entry holding send/receive rights for `object`
    pub fn reverse_lookup(&self, object: IpcObjectId) -> Option<(MachPortName, &IpcEntry)> {
        self.content.reverse_lookup(object)
    }

    /// Entries holding a right, in name order
    pub fn iter(&self) -> impl Iterator<Item = &IpcEntry> {
        self.content
            .tree
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_vacant())
    }

    /// Allocate an unnamed entry, reusing the free list first
    pub fn alloc(&mut self) -> IpcResult<MachPortName> {
        if self.space.is_special() {
            return Err(IpcError::InvalidTask);
        }
        let name = self.content.alloc(&self.space.config, &self.space.counters)?;
        trace!("{}: alloc {name:#x}", self.space.id);
        Ok(name)
    }

    /// Allocate the entry at `name`.
    ///
    /// Returns the existing entry untouched if `name` already holds a
    /// right, and the same vacant entry if it was allocated but not bound.
    pub fn alloc_name(&mut self, name: MachPortName) -> IpcResult<&mut IpcEntry> {
        self.reserve_name(name)?;
        self.content
            .tree
            .get_mut(mach_port_index(name))
            .ok_or(IpcError::InvalidName(name))
    }

    /// Like [`alloc_name`](Self::alloc_name), reporting how the entry was
    /// obtained so a failed bind can be rolled back with
    /// [`unreserve_name`](Self::unreserve_name).
    pub fn reserve_name(&mut self, name: MachPortName) -> IpcResult<NameAlloc> {
        if self.space.is_special() {
            return Err(IpcError::InvalidTask);
        }
        trace!("{}: alloc name {name:#x}", self.space.id);
        self.content
            .alloc_name(name, &self.space.config, &self.space.counters)
    }

    /// Return the space to its state before `reserve_name` returned `how`.
    ///
    /// A node created by that call is removed and a revived one goes back
    /// on the free list; a node someone else already held is left alone.
    pub fn unreserve_name(&mut self, name: MachPortName, how: NameAlloc) {
        trace!("{}: unreserve {name:#x} ({how:?})", self.space.id);
        self.content.unalloc_name(name, how);
    }

    /// Release an entry whose right has already been torn down
    pub fn dealloc(&mut self, name: MachPortName) {
        trace!("{}: dealloc {name:#x}", self.space.id);
        self.content.dealloc(name, &self.space.counters);
    }

    /// Bind a right to an allocated, vacant entry
    pub fn bind(
        &mut self,
        name: MachPortName,
        kind: RightKind,
        object: ObjectRef,
        urefs: u16,
    ) -> IpcResult<()> {
        self.content.bind(name, kind, object, urefs)
    }

    /// Remove the right at `name`, leaving the entry vacant
    pub fn unbind(&mut self, name: MachPortName) -> Option<(RightKind, ObjectRef)> {
        self.content.unbind(name)
    }

    /// Change the kind of the right at `name`, returning the old kind
    pub fn set_kind(&mut self, name: MachPortName, kind: RightKind) -> IpcResult<RightKind> {
        self.content.set_kind(name, kind)
    }

    pub fn live_count(&self) -> usize {
        self.content.live_count
    }

    pub fn table_size(&self) -> usize {
        self.content.tree.len()
    }

    pub fn free_list_len(&self) -> usize {
        self.content.free_list.len()
    }

    /// Is the entry at `index` parked on the free list?
    pub fn is_free_listed(&self, index: MachPortIndex) -> bool {
        self.content.free_list.contains(index)
    }
}
