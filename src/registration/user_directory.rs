//! User directory stored next to the user's pictures
//! Structure: users/{uid}/profile.json

use crate::registration::auth::Identity;
use crate::registration::error::RegistrationError;
use crate::registration::form::ImageFile;
use crate::registration::image_storage::BlobStore;
use crate::registration::user_info::UserRecord;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Where completed signups are persisted.
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    async fn save(&self, identity: &Identity, record: &UserRecord)
        -> Result<(), RegistrationError>;
}

pub struct StorageUserDirectory {
    store: Arc<dyn BlobStore>,
}

impl StorageUserDirectory {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Get the profile path for a user
    fn get_profile_path(&self, uid: &str) -> String {
        format!("users/{}/profile.json", uid)
    }

    pub async fn get_record(&self, identity: &Identity) -> Result<UserRecord, RegistrationError> {
        let content = self
            .store
            .download(identity, &self.get_profile_path(&identity.uid))
            .await
            .map_err(|e| match e {
                RegistrationError::ObjectNotFound(_) => {
                    RegistrationError::UserNotFound(identity.uid.clone())
                }
                other => other,
            })?;

        serde_json::from_slice(&content).map_err(|e| {
            RegistrationError::StorageError(format!(
                "Unreadable user record for '{}': {}",
                identity.uid, e
            ))
        })
    }

    pub async fn find_record(
        &self,
        identity: &Identity,
    ) -> Result<Option<UserRecord>, RegistrationError> {
        match self.get_record(identity).await {
            Ok(record) => Ok(Some(record)),
            Err(RegistrationError::UserNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl UserRecordStore for StorageUserDirectory {
    async fn save(
        &self,
        identity: &Identity,
        record: &UserRecord,
    ) -> Result<(), RegistrationError> {
        if record.uid != identity.uid {
            return Err(RegistrationError::ValidationError(format!(
                "Record for '{}' cannot be saved by '{}'",
                record.uid, identity.uid
            )));
        }

        let json_content = serde_json::to_string_pretty(record)?;
        let profile_path = self.get_profile_path(&record.uid);
        let file = ImageFile::new("profile.json", "application/json", json_content.into_bytes());

        self.store.upload(identity, &profile_path, &file).await?;

        info!("Saved user '{}' at path: {}", record.uid, profile_path);
        Ok(())
    }
}
