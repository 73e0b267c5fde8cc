//! Mach_R IPC space - per-task capability namespaces
//!
//! The IPC space of a Mach-style microkernel: each task holds a namespace
//! mapping small integer port names to entries that record the rights it
//! holds. This crate provides the space itself (forward and reverse
//! indexes, bounded free list, locking and lifecycle), the right manager
//! that interprets entries, and the registry and introspection layers
//! around it.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod ipc;
pub mod kern;

pub use ipc::{
    IpcEntry, IpcError, IpcResult, IpcSpace, MachPortName, RightKind, SpaceConfig, SpaceId,
    SpaceRef, SpaceRegistry,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
