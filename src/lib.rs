//! Workspace placeholder crate.
//!
//! This crate exists to re-export the individual workspace crates
//! (`bridge-traits`, `core-runtime`, `core-playback`) so host applications
//! can depend on `onair-workspace` without wiring each crate individually.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;
