//! Core types for the decoy secret model.
//!
//! This module defines the fundamental types shared across the platform:
//! - [`SecretName`]: a validated, namespace-qualified identifier
//! - [`SecretKind`]: the closed set of decoy categories
//! - [`SecretObject`]: the stored representation of a secret, including the
//!   marker labels and rotation annotations that make up the engine's
//!   external interface

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generate;

/// Label marking an object as a managed decoy credential.
pub const DECOY_CREDENTIAL_LABEL: &str = "deception.snare.io/decoy-credential";

/// Label marking an object as a managed canary token.
pub const CANARY_TOKEN_LABEL: &str = "deception.snare.io/canary-token";

/// Label naming the credential kind of a decoy credential.
pub const CREDENTIAL_KIND_LABEL: &str = "deception.snare.io/credential-kind";

/// Annotation holding the declared rotation interval as a duration string.
pub const ROTATION_INTERVAL_ANNOTATION: &str = "deception.snare.io/rotation-interval";

/// Annotation holding the timestamp of the last successful rotation (RFC 3339).
pub const LAST_ROTATION_ANNOTATION: &str = "deception.snare.io/last-rotation";

/// A validated, namespace-qualified name for a tracked secret.
///
/// Both segments must:
/// - Be between 1 and 253 characters
/// - Contain only lowercase alphanumeric characters, hyphens, underscores,
///   and periods
/// - Start with an alphanumeric character
/// - Not end with a hyphen or period
///
/// The canonical textual form is `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName {
    namespace: String,
    name: String,
}

impl SecretName {
    /// Maximum length of a name segment.
    pub const MAX_SEGMENT_LENGTH: usize = 253;

    /// Creates a new `SecretName` after validating both segments.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is invalid.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();
        Self::validate_segment("namespace", &namespace)?;
        Self::validate_segment("name", &name)?;
        Ok(Self { namespace, name })
    }

    /// Returns the namespace segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn validate_segment(label: &str, segment: &str) -> Result<()> {
        if segment.is_empty() {
            return Err(Error::InvalidSecretName {
                reason: format!("{label} cannot be empty"),
            });
        }

        if segment.len() > Self::MAX_SEGMENT_LENGTH {
            return Err(Error::InvalidSecretName {
                reason: format!(
                    "{label} exceeds maximum length of {} characters",
                    Self::MAX_SEGMENT_LENGTH
                ),
            });
        }

        let first = segment.chars().next().ok_or_else(|| Error::InvalidSecretName {
            reason: format!("{label} cannot be empty"),
        })?;
        if !first.is_ascii_alphanumeric() {
            return Err(Error::InvalidSecretName {
                reason: format!("{label} must start with an alphanumeric character"),
            });
        }

        if segment.ends_with('-') || segment.ends_with('.') {
            return Err(Error::InvalidSecretName {
                reason: format!("{label} cannot end with a hyphen or period"),
            });
        }

        for c in segment.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' && c != '.' {
                return Err(Error::InvalidSecretName {
                    reason: format!(
                        "{label} contains invalid character '{c}'; only lowercase alphanumeric, hyphens, underscores, and periods are allowed"
                    ),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl TryFrom<String> for SecretName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        let (namespace, name) = value.split_once('/').ok_or_else(|| Error::InvalidSecretName {
            reason: "expected `namespace/name` form".to_string(),
        })?;
        Self::new(namespace, name)
    }
}

impl std::str::FromStr for SecretName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<SecretName> for String {
    fn from(name: SecretName) -> Self {
        name.to_string()
    }
}

/// The closed set of decoy categories.
///
/// The kind of a tracked secret is immutable and determines both its payload
/// schema and its default rotation cadence. Adding a kind means extending
/// this enum; every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretKind {
    /// SSH login decoy (`username`, `password`).
    Ssh,
    /// Database login decoy (`username`, `password`, `database`, `host`).
    Database,
    /// API key pair decoy (`api_key`, `api_secret`).
    Api,
    /// Cloud-style access key decoy (`access_key_id`, `secret_access_key`, `region`).
    Aws,
    /// Catch-all single-token decoy (`token`).
    Generic,
    /// Opaque tripwire value (`token`); any sighting signals a breach.
    CanaryToken,
}

impl SecretKind {
    /// All credential kinds, in a stable order.
    pub const CREDENTIAL_KINDS: [Self; 5] =
        [Self::Ssh, Self::Database, Self::Api, Self::Aws, Self::Generic];

    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Database => "database",
            Self::Api => "api",
            Self::Aws => "aws",
            Self::Generic => "generic",
            Self::CanaryToken => "canary-token",
        }
    }

    /// Resolves a `credential-kind` label value.
    ///
    /// Unknown or empty values classify as [`SecretKind::Generic`], so a
    /// mislabeled decoy still rotates rather than falling out of management.
    #[must_use]
    pub fn from_label_value(value: &str) -> Self {
        match value {
            "ssh" => Self::Ssh,
            "database" => Self::Database,
            "api" => Self::Api,
            "aws" => Self::Aws,
            _ => Self::Generic,
        }
    }

    /// Returns true for decoy credential kinds (everything but canary tokens).
    #[must_use]
    pub const fn is_credential(&self) -> bool {
        !matches!(self, Self::CanaryToken)
    }

    /// Default rotation interval applied when an object declares none, or
    /// declares one that does not parse.
    #[must_use]
    pub const fn default_interval(&self) -> Duration {
        match self {
            Self::CanaryToken => Duration::from_secs(6 * 60 * 60),
            _ => Duration::from_secs(12 * 60 * 60),
        }
    }

    /// The exact payload field set for this kind.
    #[must_use]
    pub const fn payload_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Ssh => &["username", "password"],
            Self::Database => &["username", "password", "database", "host"],
            Self::Api => &["api_key", "api_secret"],
            Self::Aws => &["access_key_id", "secret_access_key", "region"],
            Self::Generic | Self::CanaryToken => &["token"],
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored secret object.
///
/// This is the unit the object store persists: marker labels and rotation
/// annotations (string maps) plus the payload (byte-string fields). The
/// store may hold unrelated objects of the same shape; only objects carrying
/// a marker label are managed by the rotation engine.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretObject {
    /// Namespace-qualified identity.
    pub name: SecretName,
    /// Marker and kind labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Rotation metadata annotations.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Payload fields; the key set is fixed per kind for managed objects.
    #[serde(default)]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl SecretObject {
    /// Creates an empty object with the given name.
    #[must_use]
    pub fn new(name: SecretName) -> Self {
        Self {
            name,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }

    /// Creates a decoy credential object for external provisioners.
    ///
    /// The payload is left empty and no `last-rotation` is recorded, so the
    /// engine's first reconciliation synthesizes a payload immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is not a credential kind.
    pub fn decoy_credential(name: SecretName, kind: SecretKind, interval: Duration) -> Result<Self> {
        if !kind.is_credential() {
            return Err(Error::NotACredential {
                kind: kind.to_string(),
            });
        }

        let mut object = Self::new(name);
        object
            .labels
            .insert(DECOY_CREDENTIAL_LABEL.to_string(), "true".to_string());
        object
            .labels
            .insert(CREDENTIAL_KIND_LABEL.to_string(), kind.as_str().to_string());
        object.annotations.insert(
            ROTATION_INTERVAL_ANNOTATION.to_string(),
            humantime::format_duration(interval).to_string(),
        );
        Ok(object)
    }

    /// Creates a canary token object for external provisioners.
    ///
    /// The initial token is generated immediately so the tripwire is armed
    /// from the moment the object exists.
    ///
    /// # Errors
    ///
    /// Returns an error if secure randomness is unavailable.
    pub fn canary_token(name: SecretName, interval: Duration) -> Result<Self> {
        let mut object = Self::new(name);
        object
            .labels
            .insert(CANARY_TOKEN_LABEL.to_string(), "true".to_string());
        object.annotations.insert(
            ROTATION_INTERVAL_ANNOTATION.to_string(),
            humantime::format_duration(interval).to_string(),
        );
        object.annotations.insert(
            LAST_ROTATION_ANNOTATION.to_string(),
            Utc::now().to_rfc3339(),
        );
        object.data = generate::synthesize(SecretKind::CanaryToken)?;
        Ok(object)
    }

    /// Returns true if this object carries the decoy credential marker.
    #[must_use]
    pub fn is_decoy_credential(&self) -> bool {
        self.labels
            .get(DECOY_CREDENTIAL_LABEL)
            .is_some_and(|v| v == "true")
    }

    /// Returns true if this object carries the canary token marker.
    #[must_use]
    pub fn is_canary_token(&self) -> bool {
        self.labels
            .get(CANARY_TOKEN_LABEL)
            .is_some_and(|v| v == "true")
    }
}

impl fmt::Debug for SecretObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose payload bytes in debug output
        let fields: Vec<&str> = self.data.keys().map(String::as_str).collect();
        f.debug_struct("SecretObject")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("annotations", &self.annotations)
            .field("data", &format_args!("[REDACTED; fields {fields:?}]"))
            .finish()
    }
}
