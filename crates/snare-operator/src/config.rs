//! Operator configuration: resource profiles and decoy manifests.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use snare_rotation::{EngineConfig, RetryConfig};
use snare_secrets::SecretKind;

/// Resource posture of the operator.
///
/// The profile picks worker count and resync cadence only; rotation
/// correctness never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Minimal footprint: one worker, relaxed resync.
    Light,
    /// Default posture.
    Medium,
    /// Aggressive polling for dense honeypot populations.
    Heavy,
}

impl Profile {
    /// Number of reconciliation workers for this profile.
    #[must_use]
    pub const fn workers(&self) -> usize {
        match self {
            Self::Light => 1,
            Self::Medium => 2,
            Self::Heavy => 4,
        }
    }

    /// Store resync cadence for this profile.
    #[must_use]
    pub const fn resync_interval(&self) -> Duration {
        match self {
            Self::Light => Duration::from_secs(60),
            Self::Medium => Duration::from_secs(30),
            Self::Heavy => Duration::from_secs(15),
        }
    }
}

/// Builds the engine configuration from a profile plus optional overrides.
#[must_use]
pub fn engine_config(
    profile: Profile,
    workers: Option<usize>,
    resync: Option<Duration>,
) -> EngineConfig {
    EngineConfig {
        workers: workers.unwrap_or_else(|| profile.workers()),
        resync_interval: resync.unwrap_or_else(|| profile.resync_interval()),
        retry: RetryConfig::default(),
    }
}

/// A provisioning manifest: the decoys and tripwires to seed into the store.
///
/// This stands in for the external provisioner that creates objects in a
/// full deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Objects to create.
    pub decoys: Vec<DecoyEntry>,
}

/// One decoy or canary to provision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoyEntry {
    /// Namespace segment of the object name.
    pub namespace: String,
    /// Name segment of the object name.
    pub name: String,
    /// Kind of secret to plant.
    pub kind: SecretKind,
    /// Optional rotation interval (e.g. `12h`, `90m`). Kind default when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_interval: Option<String>,
}

impl DecoyEntry {
    /// Resolves the declared interval, falling back to the kind default.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.rotation_interval
            .as_deref()
            .and_then(|raw| humantime::parse_duration(raw).ok())
            .filter(|d| *d > Duration::ZERO)
            .unwrap_or_else(|| self.kind.default_interval())
    }
}

impl Manifest {
    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing manifest {}", path.display()))
    }

    /// A sample manifest covering every kind.
    #[must_use]
    pub fn sample() -> Self {
        let entry = |name: &str, kind: SecretKind, interval: Option<&str>| DecoyEntry {
            namespace: "trap-web".to_string(),
            name: name.to_string(),
            kind,
            rotation_interval: interval.map(ToString::to_string),
        };
        Self {
            decoys: vec![
                entry("ssh-decoy", SecretKind::Ssh, None),
                entry("db-decoy", SecretKind::Database, Some("12h")),
                entry("api-decoy", SecretKind::Api, Some("8h")),
                entry("aws-decoy", SecretKind::Aws, None),
                entry("fallback-decoy", SecretKind::Generic, Some("24h")),
                entry("tripwire", SecretKind::CanaryToken, Some("6h")),
            ],
        }
    }
}
