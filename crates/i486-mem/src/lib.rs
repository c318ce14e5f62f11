//! Guest memory abstraction for the i486 execution engine.
//!
//! The CPU core addresses memory by *linear* address (segment base + offset,
//! before any paging translation). This crate only defines the byte-level bus
//! contract and a `Vec`-backed implementation used by tests and simple hosts;
//! real machine integrations provide their own [`MemoryBus`] with RAM/MMIO
//! dispatch.

mod bus;
mod vec;

pub use bus::MemoryBus;
pub use vec::VecMemory;
