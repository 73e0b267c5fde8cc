//! Property-based tests for IPC spaces
//!
//! Random sequences of right insertions, unbound allocations and
//! deallocations, checking after every step that the forward and reverse
//! indexes agree with a simple model of what the space should hold.

use std::collections::BTreeSet;
use std::sync::Arc;

use mach_ipc_space::ipc::notify::NullNotifier;
use mach_ipc_space::ipc::port::Port;
use mach_ipc_space::ipc::right::{ipc_right_destroy, ipc_right_insert};
use mach_ipc_space::ipc::ObjectRef;
use mach_ipc_space::{IpcSpace, MachPortName, RightKind};
use proptest::prelude::*;
use proptest::sample::Index;

// ════════════════════════════════════════════════════════════
// Strategies
// ════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Op {
    /// New port, new right
    Insert(RightKind),
    /// Another send right for a port the space already holds
    AddSend(Index),
    /// Allocate a name and leave it unbound
    AllocUnbound,
    /// Release an unbound name
    FreeUnbound(Index),
    /// Destroy a bound right
    Destroy(Index),
}

fn right_kind() -> impl Strategy<Value = RightKind> {
    prop_oneof![
        Just(RightKind::Send),
        Just(RightKind::Receive),
        Just(RightKind::SendOnce),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => right_kind().prop_map(Op::Insert),
        2 => any::<Index>().prop_map(Op::AddSend),
        2 => Just(Op::AllocUnbound),
        2 => any::<Index>().prop_map(Op::FreeUnbound),
        2 => any::<Index>().prop_map(Op::Destroy),
    ]
}

// ════════════════════════════════════════════════════════════
// Model
// ════════════════════════════════════════════════════════════

struct Bound {
    name: MachPortName,
    port: Arc<Port>,
    kind: RightKind,
}

#[derive(Default)]
struct Model {
    bound: Vec<Bound>,
    unbound: Vec<MachPortName>,
}

impl Model {
    fn apply(&mut self, space: &IpcSpace, op: Op) {
        match op {
            Op::Insert(kind) => {
                let port = Port::new_ref();
                let object: ObjectRef = port.clone();
                let name = ipc_right_insert(space, kind, object, 1).unwrap();
                self.bound.push(Bound { name, port, kind });
            }
            Op::AddSend(index) => {
                let tracked: Vec<usize> = (0..self.bound.len())
                    .filter(|&i| self.bound[i].kind.is_tracked())
                    .collect();
                if tracked.is_empty() {
                    return;
                }
                let right = &mut self.bound[tracked[index.index(tracked.len())]];
                let object: ObjectRef = right.port.clone();
                let name = ipc_right_insert(space, RightKind::Send, object, 1).unwrap();
                assert_eq!(name, right.name, "send right not merged");
                right.kind = right.kind.merge(RightKind::Send).unwrap();
            }
            Op::AllocUnbound => {
                let (name, guard) = space.entry_alloc().unwrap();
                drop(guard);
                self.unbound.push(name);
            }
            Op::FreeUnbound(index) => {
                if self.unbound.is_empty() {
                    return;
                }
                let name = self.unbound.swap_remove(index.index(self.unbound.len()));
                space.write().unwrap().dealloc(name);
            }
            Op::Destroy(index) => {
                if self.bound.is_empty() {
                    return;
                }
                let right = self.bound.swap_remove(index.index(self.bound.len()));
                ipc_right_destroy(space, right.name, &NullNotifier).unwrap();
            }
        }
    }

    fn check(&self, space: &IpcSpace) {
        let guard = space.read().unwrap();
        assert_eq!(guard.live_count(), self.bound.len() + self.unbound.len());

        let mut names = BTreeSet::new();
        for right in &self.bound {
            assert!(names.insert(right.name), "name {:#x} reused", right.name);

            let entry = guard.lookup(right.name).expect("bound right lost");
            assert_eq!(entry.right_kind(), Some(right.kind));
            let held = entry.object().map(|object| object.object_id());
            assert_eq!(held, Some(right.port.id()));

            let reverse = guard.reverse_lookup(right.port.id()).map(|(name, _)| name);
            if right.kind.is_tracked() {
                assert_eq!(reverse, Some(right.name));
            } else {
                assert_eq!(reverse, None);
            }
        }
        for &name in &self.unbound {
            assert!(names.insert(name), "name {name:#x} reused");
            assert!(guard.lookup(name).is_none());
        }

        let tracked = self.bound.iter().filter(|r| r.kind.is_tracked()).count();
        assert_eq!(guard.reverse_len(), tracked);
        assert!(guard.free_list_len() <= 64);
    }
}

// ════════════════════════════════════════════════════════════
// Properties
// ════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Forward and reverse indexes stay coherent under any interleaving
    #[test]
    fn reverse_index_stays_coherent(ops in prop::collection::vec(op(), 1..200)) {
        let space = IpcSpace::create();
        let mut model = Model::default();
        for op in ops {
            model.apply(&space, op);
            model.check(&space);
        }
    }

    /// Allocation never hands out a name that is still live
    #[test]
    fn alloc_never_aliases(rounds in 1usize..150, limit in 0usize..=64) {
        let config = mach_ipc_space::SpaceConfig::default().with_free_list_limit(limit);
        let space = IpcSpace::with_config(config);
        let mut guard = space.write().unwrap();
        let mut live = BTreeSet::new();
        for round in 0..rounds {
            let name = guard.alloc().unwrap();
            prop_assert!(live.insert(name));
            if round % 3 == 2 {
                let victim = *live.iter().next().unwrap();
                live.remove(&victim);
                guard.dealloc(victim);
            }
        }
        prop_assert_eq!(guard.live_count(), live.len());
        prop_assert!(guard.free_list_len() <= limit);
    }
}
