//! In-memory blob store for local runs and tests.

use crate::registration::auth::Identity;
use crate::registration::error::RegistrationError;
use crate::registration::form::ImageFile;
use crate::registration::image_storage::BlobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Objects are kept until the store is dropped. URLs use the `memory://` scheme.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, ImageFile>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url_for(path: &str) -> String {
        format!("memory://{}", path)
    }

    pub fn get(&self, path: &str) -> Option<ImageFile> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(path).cloned())
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        identity: &Identity,
        path: &str,
        file: &ImageFile,
    ) -> Result<String, RegistrationError> {
        self.objects
            .write()
            .map_err(|_| RegistrationError::StorageError("memory store lock poisoned".to_string()))?
            .insert(path.to_string(), file.clone());

        debug!("Stored {} bytes for '{}' at {}", file.data.len(), identity.uid, path);
        Ok(Self::url_for(path))
    }

    async fn download(
        &self,
        _identity: &Identity,
        path: &str,
    ) -> Result<Vec<u8>, RegistrationError> {
        self.get(path)
            .map(|file| file.data)
            .ok_or_else(|| RegistrationError::ObjectNotFound(path.to_string()))
    }
}
