//! Typed policy view of a stored object.
//!
//! Raw label and annotation strings are parsed here, once, at the store
//! boundary. Downstream code (policy evaluation, reconciliation) only ever
//! sees the typed [`DecoySpec`].

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{
    CREDENTIAL_KIND_LABEL, LAST_ROTATION_ANNOTATION, ROTATION_INTERVAL_ANNOTATION, SecretKind,
    SecretObject,
};

/// Where the effective rotation interval came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSource {
    /// The object declared a valid interval.
    Declared,
    /// No interval was declared; the kind default applies.
    DefaultedAbsent,
    /// The declared interval did not parse; the kind default applies.
    ///
    /// An invalid interval is never treated as "never rotate".
    DefaultedInvalid,
}

/// The typed rotation policy of a managed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoySpec {
    /// The kind of the tracked secret.
    pub kind: SecretKind,
    /// Effective rotation interval (declared if valid, kind default otherwise).
    pub interval: Duration,
    /// Provenance of `interval`, for warning-level logging.
    pub interval_source: IntervalSource,
    /// Timestamp of the last successful rotation, if recorded and parsable.
    pub last_rotation: Option<DateTime<Utc>>,
    /// True when a `last-rotation` annotation was present but unparsable.
    /// The object is then treated as due, never as permanently fresh.
    pub last_rotation_invalid: bool,
}

impl DecoySpec {
    /// Classifies a stored object.
    ///
    /// Returns `None` for objects without a marker label; the engine
    /// coexists with unrelated objects by ignoring them. Canary markers win
    /// over credential markers if an object carries both.
    #[must_use]
    pub fn from_object(object: &SecretObject) -> Option<Self> {
        let kind = if object.is_canary_token() {
            SecretKind::CanaryToken
        } else if object.is_decoy_credential() {
            let label = object
                .labels
                .get(CREDENTIAL_KIND_LABEL)
                .map(String::as_str)
                .unwrap_or_default();
            SecretKind::from_label_value(label)
        } else {
            return None;
        };

        let (interval, interval_source) = parse_interval(
            object.annotations.get(ROTATION_INTERVAL_ANNOTATION),
            kind,
        );

        let raw_last = object.annotations.get(LAST_ROTATION_ANNOTATION);
        let last_rotation = raw_last.and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|t| t.with_timezone(&Utc))
        });
        let last_rotation_invalid = raw_last.is_some() && last_rotation.is_none();

        Some(Self {
            kind,
            interval,
            interval_source,
            last_rotation,
            last_rotation_invalid,
        })
    }
}

fn parse_interval(raw: Option<&String>, kind: SecretKind) -> (Duration, IntervalSource) {
    match raw {
        None => (kind.default_interval(), IntervalSource::DefaultedAbsent),
        Some(raw) => match humantime::parse_duration(raw) {
            Ok(interval) if interval > Duration::ZERO => (interval, IntervalSource::Declared),
            _ => (kind.default_interval(), IntervalSource::DefaultedInvalid),
        },
    }
}
