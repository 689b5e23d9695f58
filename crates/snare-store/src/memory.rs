//! In-memory store backend.
//!
//! Versioning is a per-object monotonically increasing revision. The lock
//! is held only for the duration of a map operation; contention between
//! writers surfaces as version conflicts, not blocking.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use snare_secrets::{SecretName, SecretObject};
use tracing::trace;

use crate::error::{Result, StoreError};
use crate::gateway::{ObjectStore, Version, VersionedSecret};

struct StoredObject {
    object: SecretObject,
    revision: u64,
}

/// An in-memory [`ObjectStore`] backend.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<SecretName, StoredObject>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    async fn fetch(&self, name: &SecretName) -> Result<VersionedSecret> {
        let objects = self.objects.read();
        let stored = objects.get(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;
        Ok(VersionedSecret {
            object: stored.object.clone(),
            version: Version::new(stored.revision),
        })
    }

    async fn update(
        &self,
        name: &SecretName,
        expected: Version,
        object: SecretObject,
    ) -> Result<Version> {
        let mut objects = self.objects.write();
        let stored = objects.get_mut(name).ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
        })?;

        if stored.revision != expected.revision() {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                expected: expected.revision(),
            });
        }

        stored.object = object;
        stored.revision += 1;
        trace!(object = %name, revision = stored.revision, "object updated");
        Ok(Version::new(stored.revision))
    }

    async fn insert(&self, object: SecretObject) -> Result<Version> {
        let mut objects = self.objects.write();
        let name = object.name.clone();
        if objects.contains_key(&name) {
            return Err(StoreError::AlreadyExists {
                name: name.to_string(),
            });
        }
        objects.insert(name.clone(), StoredObject { object, revision: 1 });
        trace!(object = %name, "object inserted");
        Ok(Version::new(1))
    }

    async fn remove(&self, name: &SecretName) -> Result<()> {
        let mut objects = self.objects.write();
        if objects.remove(name).is_none() {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }
        trace!(object = %name, "object removed");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SecretName>> {
        Ok(self.objects.read().keys().cloned().collect())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("objects", &self.len())
            .finish()
    }
}
