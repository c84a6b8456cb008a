//! Scripted providers that record every call.

#![allow(dead_code)]

use async_trait::async_trait;
use lets_connect::registration::{
    AuthErrorCode, BlobStore, FederatedProvider, Identity, IdentityProvider, ImageFile,
    ProfileUpdate, RegistrationError, SignupForm, UserRecord, UserRecordStore,
};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockIdentityProvider {
    pub calls: Mutex<Vec<String>>,
    pub create_error: Mutex<Option<RegistrationError>>,
    pub update_error: Mutex<Option<RegistrationError>>,
    pub federated_error: Mutex<Option<RegistrationError>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create(err: RegistrationError) -> Self {
        let mock = Self::new();
        *mock.create_error.lock().unwrap() = Some(err);
        mock
    }

    pub fn failing_create_with_code(code: &str) -> Self {
        Self::failing_create(RegistrationError::Auth(AuthErrorCode::from_code(code)))
    }

    pub fn failing_update(err: RegistrationError) -> Self {
        let mock = Self::new();
        *mock.update_error.lock().unwrap() = Some(err);
        mock
    }

    pub fn failing_federated(err: RegistrationError) -> Self {
        let mock = Self::new();
        *mock.federated_error.lock().unwrap() = Some(err);
        mock
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, RegistrationError> {
        self.record("create_account");
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(Identity::new("uid-123", Some(email.to_string()), "id-token"))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, RegistrationError> {
        self.record("sign_in_with_password");
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(Identity::new("uid-123", Some(email.to_string()), "id-token"))
    }

    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, RegistrationError> {
        self.record("update_profile");
        if let Some(err) = self.update_error.lock().unwrap().take() {
            return Err(err);
        }
        let mut updated = identity.clone();
        updated.display_name = update.display_name.clone();
        Ok(updated)
    }

    async fn federated_sign_in(
        &self,
        _provider: FederatedProvider,
    ) -> Result<Identity, RegistrationError> {
        self.record("federated_sign_in");
        if let Some(err) = self.federated_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(Identity::new("google-uid", Some("g@example.com".into()), "id-token"))
    }

    async fn delete_account(&self, _identity: &Identity) -> Result<(), RegistrationError> {
        self.record("delete_account");
        Ok(())
    }
}

/// Fails uploads whose path is in `failing_paths`.
#[derive(Default)]
pub struct MockBlobStore {
    pub uploads: Mutex<Vec<String>>,
    pub failing_paths: Mutex<HashSet<String>>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(paths: &[&str]) -> Self {
        let mock = Self::new();
        mock.failing_paths
            .lock()
            .unwrap()
            .extend(paths.iter().map(|p| p.to_string()));
        mock
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn url_for(path: &str) -> String {
        format!("https://storage.test/{}", path)
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn upload(
        &self,
        _identity: &Identity,
        path: &str,
        file: &ImageFile,
    ) -> Result<String, RegistrationError> {
        self.uploads.lock().unwrap().push(path.to_string());
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(RegistrationError::StorageError(format!(
                "Failed to upload {}.",
                file.file_name
            )));
        }
        Ok(Self::url_for(path))
    }

    async fn download(
        &self,
        _identity: &Identity,
        path: &str,
    ) -> Result<Vec<u8>, RegistrationError> {
        Err(RegistrationError::ObjectNotFound(path.to_string()))
    }
}

#[derive(Default)]
pub struct MockRecordStore {
    pub saved: Mutex<Vec<UserRecord>>,
    pub fail: bool,
}

#[async_trait]
impl UserRecordStore for MockRecordStore {
    async fn save(
        &self,
        _identity: &Identity,
        record: &UserRecord,
    ) -> Result<(), RegistrationError> {
        if self.fail {
            return Err(RegistrationError::StorageError("permission denied".into()));
        }
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn image(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

pub fn valid_form() -> SignupForm {
    SignupForm {
        name: "Chioma".into(),
        age: "24".into(),
        location: "Lagos, Nigeria".into(),
        state_of_origin: "Enugu".into(),
        interests: "Reading, Hiking, , Coding".into(),
        email: "chioma@example.com".into(),
        password: "secret123".into(),
        confirm_password: "secret123".into(),
    }
}
