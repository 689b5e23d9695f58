//! # snare-audit
//!
//! Rotation audit logging for Snare.
//!
//! This crate provides a lightweight, pluggable audit logging system for
//! the rotation engine's lifecycle events. It's designed to integrate with
//! the existing `tracing` infrastructure while supporting custom backends,
//! so the monitoring stack can consume events without the engine knowing
//! about it.
//!
//! ## Features
//!
//! - [`AuditEvent`] — Enum covering create, evaluate, rotate, and error outcomes
//! - [`AuditLogger`] — Pluggable trait for audit backends
//! - [`TracingAuditLogger`] — Default implementation using `tracing`
//!
//! ## Example
//!
//! ```rust
//! use snare_audit::{AuditEvent, AuditLogger, TracingAuditLogger};
//!
//! let logger = TracingAuditLogger::new();
//!
//! let event = AuditEvent::secret_rotated("trap-web/db-decoy", "database");
//! logger.log(&event);
//!
//! let event = AuditEvent::rotation_failed(
//!     "trap-web/db-decoy",
//!     Some("database"),
//!     "conflict retries exhausted",
//!     5,
//! );
//! logger.log(&event);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod logger;

// Re-export main types
pub use error::{AuditError, Result};
pub use events::{AuditEvent, Severity};
pub use logger::{AuditLogger, BoxedAuditLogger, NoopAuditLogger, TracingAuditLogger};
