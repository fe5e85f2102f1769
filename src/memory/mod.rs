//! Memory system - shared tagged key-value store.

pub mod store;

pub use store::{MemoryEntry, MemoryStats, SharedMemoryStore};
