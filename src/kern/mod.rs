//! Kern subsystem - Core kernel primitives
//!
//! Based on Mach4 kern/ directory
//! The locks and counters the IPC space is built on.

pub mod counters;
pub mod lock;
