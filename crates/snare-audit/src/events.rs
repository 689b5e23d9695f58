//! Rotation audit event types.
//!
//! This module defines the lifecycle events the engine emits: one per
//! create, evaluate, and rotate outcome, plus the error outcomes the
//! monitoring stack cares about.

use crate::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational event (e.g., a successful rotation).
    Info = 0,
    /// Low severity (e.g., a single write conflict).
    Low = 1,
    /// Medium severity (e.g., a malformed rotation interval corrected to the default).
    Medium = 2,
    /// High severity (e.g., a rotation cycle gave up after retries).
    High = 3,
    /// Critical severity (reserved; nothing the engine emits today).
    Critical = 4,
}

impl Severity {
    /// Returns the string representation of this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rotation audit event.
///
/// Every variant carries the qualified secret name and, when known, the
/// secret kind, so a single log stream can be filtered per decoy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A decoy or canary object was created by a provisioner.
    SecretCreated {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// Secret kind.
        kind: String,
    },

    /// The policy evaluator ran for an object.
    RotationEvaluated {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// Secret kind.
        kind: String,
        /// Whether rotation was due.
        due: bool,
    },

    /// A fresh payload was synthesized and persisted.
    SecretRotated {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// Secret kind.
        kind: String,
    },

    /// A declared rotation interval did not parse and the kind default was
    /// substituted.
    PolicyDefaulted {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// The raw value that failed to parse.
        raw_interval: String,
        /// The substituted default, in seconds.
        default_secs: u64,
    },

    /// A reconciliation cycle gave up and requeued the object.
    RotationFailed {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// Secret kind, when classification got that far.
        kind: Option<String>,
        /// Why the cycle failed.
        reason: String,
        /// How many attempts were made this cycle.
        attempts: u32,
    },

    /// The secure randomness source failed during synthesis.
    GenerationFailed {
        /// Unique event identifier.
        event_id: Uuid,
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// Severity level.
        severity: Severity,
        /// Qualified secret name.
        secret: String,
        /// Secret kind.
        kind: String,
        /// Why synthesis failed.
        reason: String,
    },
}

impl AuditEvent {
    /// Creates a secret-created event.
    #[must_use]
    pub fn secret_created(secret: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::SecretCreated {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::Info,
            secret: secret.into(),
            kind: kind.into(),
        }
    }

    /// Creates an evaluation event.
    #[must_use]
    pub fn rotation_evaluated(
        secret: impl Into<String>,
        kind: impl Into<String>,
        due: bool,
    ) -> Self {
        Self::RotationEvaluated {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::Info,
            secret: secret.into(),
            kind: kind.into(),
            due,
        }
    }

    /// Creates a rotation-success event.
    #[must_use]
    pub fn secret_rotated(secret: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::SecretRotated {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::Info,
            secret: secret.into(),
            kind: kind.into(),
        }
    }

    /// Creates a policy-defaulted event.
    #[must_use]
    pub fn policy_defaulted(
        secret: impl Into<String>,
        raw_interval: impl Into<String>,
        default_secs: u64,
    ) -> Self {
        Self::PolicyDefaulted {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::Medium,
            secret: secret.into(),
            raw_interval: raw_interval.into(),
            default_secs,
        }
    }

    /// Creates a rotation-failure event.
    #[must_use]
    pub fn rotation_failed(
        secret: impl Into<String>,
        kind: Option<&str>,
        reason: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self::RotationFailed {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::High,
            secret: secret.into(),
            kind: kind.map(ToString::to_string),
            reason: reason.into(),
            attempts,
        }
    }

    /// Creates a generation-failure event.
    #[must_use]
    pub fn generation_failed(
        secret: impl Into<String>,
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::GenerationFailed {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity: Severity::High,
            secret: secret.into(),
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Returns the event ID.
    #[must_use]
    pub const fn event_id(&self) -> Uuid {
        match self {
            Self::SecretCreated { event_id, .. }
            | Self::RotationEvaluated { event_id, .. }
            | Self::SecretRotated { event_id, .. }
            | Self::PolicyDefaulted { event_id, .. }
            | Self::RotationFailed { event_id, .. }
            | Self::GenerationFailed { event_id, .. } => *event_id,
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SecretCreated { timestamp, .. }
            | Self::RotationEvaluated { timestamp, .. }
            | Self::SecretRotated { timestamp, .. }
            | Self::PolicyDefaulted { timestamp, .. }
            | Self::RotationFailed { timestamp, .. }
            | Self::GenerationFailed { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the severity level.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::SecretCreated { severity, .. }
            | Self::RotationEvaluated { severity, .. }
            | Self::SecretRotated { severity, .. }
            | Self::PolicyDefaulted { severity, .. }
            | Self::RotationFailed { severity, .. }
            | Self::GenerationFailed { severity, .. } => *severity,
        }
    }

    /// Returns the qualified secret name.
    #[must_use]
    pub fn secret(&self) -> &str {
        match self {
            Self::SecretCreated { secret, .. }
            | Self::RotationEvaluated { secret, .. }
            | Self::SecretRotated { secret, .. }
            | Self::PolicyDefaulted { secret, .. }
            | Self::RotationFailed { secret, .. }
            | Self::GenerationFailed { secret, .. } => secret,
        }
    }

    /// Returns the event type as a string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::SecretCreated { .. } => "secret_created",
            Self::RotationEvaluated { .. } => "rotation_evaluated",
            Self::SecretRotated { .. } => "secret_rotated",
            Self::PolicyDefaulted { .. } => "policy_defaulted",
            Self::RotationFailed { .. } => "rotation_failed",
            Self::GenerationFailed { .. } => "generation_failed",
        }
    }

    /// Serializes the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(AuditError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test_case(Severity::Info, "info")]
    #[test_case(Severity::Medium, "medium")]
    #[test_case(Severity::Critical, "critical")]
    fn severity_display(severity: Severity, expected: &str) {
        assert_eq!(severity.to_string(), expected);
    }

    #[test]
    fn rotated_event_is_info() {
        let event = AuditEvent::secret_rotated("trap-web/db-decoy", "database");
        assert_eq!(event.severity(), Severity::Info);
        assert_eq!(event.event_type(), "secret_rotated");
        assert_eq!(event.secret(), "trap-web/db-decoy");
    }

    #[test]
    fn policy_defaulted_is_medium() {
        let event = AuditEvent::policy_defaulted("trap-web/db-decoy", "12x", 43200);
        assert_eq!(event.severity(), Severity::Medium);
        assert_eq!(event.event_type(), "policy_defaulted");
    }

    #[test]
    fn failure_events_are_high() {
        let event =
            AuditEvent::rotation_failed("trap-web/db-decoy", Some("database"), "conflict", 5);
        assert_eq!(event.severity(), Severity::High);

        let event = AuditEvent::generation_failed("trap-web/db-decoy", "database", "no entropy");
        assert_eq!(event.severity(), Severity::High);
    }

    #[test]
    fn evaluated_event_records_decision() {
        let event = AuditEvent::rotation_evaluated("trap-web/api-decoy", "api", true);
        match event {
            AuditEvent::RotationEvaluated { due, .. } => assert!(due),
            other => panic!("expected RotationEvaluated, got {other:?}"),
        }
    }

    #[test]
    fn event_ids_are_unique() {
        let a = AuditEvent::secret_rotated("a/b", "ssh");
        let b = AuditEvent::secret_rotated("a/b", "ssh");
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn event_serde_roundtrip() {
        let event = AuditEvent::rotation_failed("trap-web/db-decoy", None, "store down", 3);
        let json = event.to_json().expect("serialize");
        assert!(json.contains(r#""type":"rotation_failed""#));
        let restored: AuditEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(event, restored);
    }
}
