//! Audit logging backends.
//!
//! This module provides the [`AuditLogger`] trait and default implementations.

use crate::events::{AuditEvent, Severity};

/// Trait for audit logging backends.
///
/// Implement this trait to create custom audit log destinations
/// (e.g., file, database, external monitoring collector).
pub trait AuditLogger: Send + Sync {
    /// Logs an audit event.
    fn log(&self, event: &AuditEvent);

    /// Logs an audit event if the severity is at or above the minimum.
    fn log_if_severe(&self, event: &AuditEvent, min_severity: Severity) {
        if event.severity() >= min_severity {
            self.log(event);
        }
    }
}

/// Audit logger that uses the `tracing` infrastructure.
///
/// Events are logged at appropriate tracing levels based on severity:
/// - Info, Low → `tracing::info!`
/// - Medium → `tracing::warn!`
/// - High, Critical → `tracing::error!`
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLogger {
    /// Optional prefix for all log messages.
    prefix: Option<String>,
}

impl TracingAuditLogger {
    /// Creates a new tracing-based audit logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tracing-based audit logger with a prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: &AuditEvent) {
        let event_id = event.event_id();
        let event_type = event.event_type();
        let severity = event.severity();
        let secret = event.secret();

        // Serialize to JSON for structured logging (ignore errors)
        let json = event.to_json().unwrap_or_else(|_| "{}".to_string());

        let prefix = self.prefix.as_deref().unwrap_or("AUDIT");

        match severity {
            Severity::Info | Severity::Low => {
                tracing::info!(
                    target: "snare_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    %secret,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
            Severity::Medium => {
                tracing::warn!(
                    target: "snare_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    %secret,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
            Severity::High | Severity::Critical => {
                tracing::error!(
                    target: "snare_audit",
                    %event_id,
                    %event_type,
                    %severity,
                    %secret,
                    event_json = %json,
                    "[{prefix}] {event_type}"
                );
            }
        }
    }
}

/// A no-op audit logger for testing or disabled scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

impl NoopAuditLogger {
    /// Creates a new no-op audit logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLogger for NoopAuditLogger {
    fn log(&self, _event: &AuditEvent) {
        // Intentionally does nothing
    }
}

/// A boxed audit logger for dynamic dispatch.
pub type BoxedAuditLogger = Box<dyn AuditLogger>;

impl AuditLogger for BoxedAuditLogger {
    fn log(&self, event: &AuditEvent) {
        (**self).log(event);
    }
}
