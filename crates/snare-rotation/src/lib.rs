//! # Snare Rotation
//!
//! The rotation and reconciliation engine for the Snare deception platform.
//!
//! Every tracked secret is driven through the same cycle, independently of
//! every other: fetch the object, evaluate whether rotation is due,
//! synthesize a fresh payload if so, persist payload and timestamp in one
//! optimistic-concurrency write, and re-enqueue the object for its next
//! check. Conflicts restart the whole cycle from a fresh read; every
//! failure becomes a bounded requeue, so the engine is self-healing and no
//! object ever reaches a terminal failure state.
//!
//! - [`policy`] — pure due/next-check decisions, unit-testable without a store
//! - [`WorkQueue`] — per-key dedup so at most one reconciliation is in
//!   flight per object
//! - [`Reconciler`] — one reconciliation cycle against the store
//! - [`RotationEngine`] — the bounded worker pool and resync loop

pub mod backoff;
pub mod engine;
pub mod error;
pub mod policy;
pub mod queue;
pub mod reconciler;

pub use engine::{EngineConfig, EngineHandle, RotationEngine};
pub use error::{EngineError, Result};
pub use policy::{MIN_CHECK_DELAY, needs_rotation, next_check_delay};
pub use queue::WorkQueue;
pub use reconciler::{Outcome, ReconcileResult, Reconciler, Requeue, RetryConfig};
