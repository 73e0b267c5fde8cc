//! Space registry
//!
//! Keeps every live space reachable by its [`SpaceId`]. The registry is an
//! ordinary object the kernel owns, not a global table; it holds one
//! [`SpaceRef`] per space until that space is destroyed through it.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use spin::Mutex;

use super::space::{IpcSpace, SpaceCleanup, SpaceConfig, SpaceId, SpaceRef};

/// All spaces known to the kernel
#[derive(Debug)]
pub struct SpaceRegistry {
    spaces: Mutex<BTreeMap<SpaceId, SpaceRef>>,
    /// Tunables given to task spaces created here
    config: SpaceConfig,
}

impl SpaceRegistry {
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    pub fn with_config(config: SpaceConfig) -> Self {
        Self {
            spaces: Mutex::new(BTreeMap::new()),
            config,
        }
    }

    fn register(&self, space: SpaceRef) -> SpaceRef {
        let handle = space.clone();
        self.spaces.lock().insert(space.id(), space);
        handle
    }

    /// Create and register a task space
    pub fn create(&self) -> SpaceRef {
        self.register(IpcSpace::with_config(self.config))
    }

    /// Create and register a special space
    pub fn create_special(&self) -> SpaceRef {
        self.register(IpcSpace::create_special())
    }

    /// Find a space by ID
    pub fn get(&self, id: SpaceId) -> Option<SpaceRef> {
        self.spaces.lock().get(&id).cloned()
    }

    /// Unregister and destroy a space.
    ///
    /// Returns false if `id` is unknown or the space was already destroyed
    /// by someone else. `cleanup` runs without the registry lock held.
    pub fn destroy<C>(&self, id: SpaceId, cleanup: &mut C) -> bool
    where
        C: SpaceCleanup + ?Sized,
    {
        let Some(space) = self.spaces.lock().remove(&id) else {
            return false;
        };
        space.destroy(cleanup)
    }

    /// IDs of all registered spaces, in creation order
    pub fn ids(&self) -> Vec<SpaceId> {
        self.spaces.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.spaces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.lock().is_empty()
    }
}

impl Default for SpaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::notify::NullNotifier;
    use crate::ipc::right::RightCleanup;

    #[test]
    fn test_create_and_get() {
        let registry = SpaceRegistry::new();
        let a = registry.create();
        let b = registry.create_special();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), [a.id(), b.id()]);

        let found = registry.get(a.id()).unwrap();
        assert!(SpaceRef::ptr_eq(&found, &a));
        assert!(registry.get(b.id()).unwrap().is_special());
    }

    #[test]
    fn test_config_applies_to_created_spaces() {
        let registry = SpaceRegistry::with_config(SpaceConfig::default().with_free_list_limit(8));
        assert_eq!(registry.create().config().free_list_limit, 8);
    }

    #[test]
    fn test_destroy_unregisters() {
        let registry = SpaceRegistry::new();
        let space = registry.create();
        let id = space.id();
        // creator + active + registry
        assert_eq!(space.ref_count(), 3);

        let mut cleanup = RightCleanup::new(&NullNotifier);
        assert!(registry.destroy(id, &mut cleanup));
        assert!(!registry.destroy(id, &mut cleanup));
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());

        assert!(!space.is_active());
        assert_eq!(space.ref_count(), 1);
    }
}
