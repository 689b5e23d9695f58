//! The store gateway contract.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use snare_secrets::{SecretName, SecretObject};

use crate::error::Result;

/// Opaque optimistic-concurrency token returned on every read.
///
/// A token is only meaningful when presented back to the store it came
/// from; callers never inspect or arithmetic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Wraps a raw store revision. Only backends construct versions.
    #[must_use]
    pub const fn new(revision: u64) -> Self {
        Self(revision)
    }

    /// The raw revision, for backend comparison and error reporting.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetched object together with the version token guarding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedSecret {
    /// The object as currently stored.
    pub object: SecretObject,
    /// Token required for the next write.
    pub version: Version,
}

/// Read/update access to the versioned object store.
///
/// `update` is usable in a read-modify-write pattern: on a
/// [`StoreError::Conflict`](crate::StoreError::Conflict) the caller must
/// re-fetch and redo its whole evaluate step, because the fields it decided
/// on may have changed concurrently. The gateway itself never retries.
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetches an object and its current version token.
    fn fetch(&self, name: &SecretName) -> impl Future<Output = Result<VersionedSecret>> + Send;

    /// Replaces an object, validating the caller's version token.
    ///
    /// The whole object (payload and annotations) is written in one call,
    /// so a rotation's payload and timestamp land atomically.
    fn update(
        &self,
        name: &SecretName,
        expected: Version,
        object: SecretObject,
    ) -> impl Future<Output = Result<Version>> + Send;

    /// Creates a new object. Provisioner surface; the rotation engine never
    /// creates objects itself.
    fn insert(&self, object: SecretObject) -> impl Future<Output = Result<Version>> + Send;

    /// Deletes an object. Provisioner surface.
    fn remove(&self, name: &SecretName) -> impl Future<Output = Result<()>> + Send;

    /// Lists every object name currently in the store, managed or not.
    fn list(&self) -> impl Future<Output = Result<Vec<SecretName>>> + Send;
}
