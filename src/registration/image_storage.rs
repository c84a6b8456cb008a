//! Image storage for user pictures
//! Structure: users/{uid}/profile_{file} and users/{uid}/additional_{index}_{file}

use crate::registration::auth::Identity;
use crate::registration::config::RegistrationConfig;
use crate::registration::error::RegistrationError;
use crate::registration::form::ImageFile;
use crate::registration::http::{get, post_bytes, HttpsClient};
use async_trait::async_trait;
use hyper::StatusCode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::{info, warn};

/// Characters left as-is in an encoded object name; everything else, `/`
/// included, is escaped the way Firebase download URLs expect.
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Get the user folder prefix
pub fn user_folder(uid: &str) -> String {
    format!("users/{}/", uid)
}

pub fn profile_image_path(uid: &str, file_name: &str) -> String {
    format!("{}profile_{}", user_folder(uid), file_name)
}

/// `index` is zero-based, in selection order.
pub fn additional_image_path(uid: &str, index: usize, file_name: &str) -> String {
    format!("{}additional_{}_{}", user_folder(uid), index, file_name)
}

/// Token-bearing download URL for an object, as Firebase hands them out.
pub fn download_url(endpoint: &str, bucket: &str, path: &str, token: &str) -> String {
    format!(
        "{}/b/{}/o/{}?alt=media&token={}",
        endpoint,
        bucket,
        utf8_percent_encode(path, OBJECT_NAME),
        token
    )
}

/// Binary object storage returning durable download URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `file` to `path` on behalf of `identity` and return its URL.
    async fn upload(
        &self,
        identity: &Identity,
        path: &str,
        file: &ImageFile,
    ) -> Result<String, RegistrationError>;

    async fn download(&self, identity: &Identity, path: &str)
        -> Result<Vec<u8>, RegistrationError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl UploadResponse {
    fn download_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
    }
}

fn upload_failed(file_name: &str) -> RegistrationError {
    RegistrationError::StorageError(format!("Failed to upload {}.", file_name))
}

fn parse_upload_response(
    file_name: &str,
    body: &[u8],
) -> Result<UploadResponse, RegistrationError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Unreadable upload response for {}: {}", file_name, e);
        upload_failed(file_name)
    })
}

/// Firebase Storage REST client.
pub struct FirebaseStorage {
    client: HttpsClient,
    endpoint: String,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(config: &RegistrationConfig, client: HttpsClient) -> Self {
        info!("FirebaseStorage initialized with bucket: {}", config.storage_bucket);

        Self {
            client,
            endpoint: config.storage_endpoint.trim_end_matches('/').to_string(),
            bucket: config.storage_bucket.clone(),
        }
    }

    fn upload_url(&self, path: &str) -> String {
        format!(
            "{}/b/{}/o?name={}",
            self.endpoint,
            self.bucket,
            utf8_percent_encode(path, OBJECT_NAME)
        )
    }

    pub fn download_url(&self, path: &str, token: &str) -> String {
        download_url(&self.endpoint, &self.bucket, path, token)
    }
}

#[async_trait]
impl BlobStore for FirebaseStorage {
    async fn upload(
        &self,
        identity: &Identity,
        path: &str,
        file: &ImageFile,
    ) -> Result<String, RegistrationError> {
        let response = post_bytes(
            &self.client,
            &self.upload_url(path),
            &file.content_type,
            &format!("Firebase {}", identity.id_token),
            file.data.clone(),
        )
        .await
        .map_err(|e| {
            warn!("Upload of {} to {} failed: {}", file.file_name, path, e);
            upload_failed(&file.file_name)
        })?;

        if !response.status.is_success() {
            warn!("Upload of {} to {} returned {}", file.file_name, path, response.status);
            return Err(upload_failed(&file.file_name));
        }

        let uploaded = parse_upload_response(&file.file_name, &response.body)?;
        let token = uploaded.download_token().ok_or_else(|| {
            warn!("No download token returned for {}", uploaded.name);
            upload_failed(&file.file_name)
        })?;

        info!("Uploaded image for user '{}': {}", identity.uid, uploaded.name);
        Ok(self.download_url(&uploaded.name, token))
    }

    async fn download(
        &self,
        identity: &Identity,
        path: &str,
    ) -> Result<Vec<u8>, RegistrationError> {
        let url = format!(
            "{}/b/{}/o/{}?alt=media",
            self.endpoint,
            self.bucket,
            utf8_percent_encode(path, OBJECT_NAME)
        );

        let response = get(&self.client, &url, &format!("Firebase {}", identity.id_token)).await?;

        match response.status {
            status if status.is_success() => Ok(response.body.to_vec()),
            StatusCode::NOT_FOUND => Err(RegistrationError::ObjectNotFound(path.to_string())),
            status => Err(RegistrationError::StorageError(format!(
                "Failed to download {}: status {}",
                path, status
            ))),
        }
    }
}
