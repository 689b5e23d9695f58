//! # Snare Store
//!
//! The object store gateway for the Snare deception platform. Secret
//! objects live in a versioned key-value store; every read returns an
//! opaque [`Version`] token and every write validates one, so concurrent
//! writers coordinate purely through optimistic concurrency.
//!
//! The gateway performs no retries of its own. Conflict handling belongs to
//! the caller, which must re-fetch and re-evaluate before writing again.

pub mod error;
pub mod gateway;
pub mod memory;

pub use error::{Result, StoreError};
pub use gateway::{ObjectStore, Version, VersionedSecret};
pub use memory::MemoryStore;
