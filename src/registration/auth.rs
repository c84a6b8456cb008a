//! Firebase Authentication

use crate::registration::auth_code::AuthErrorCode;
use crate::registration::config::RegistrationConfig;
use crate::registration::error::RegistrationError;
use crate::registration::http::{post_json, HttpsClient};
use async_trait::async_trait;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

const GOOGLE_SCOPES: &[&str] = &["openid", "email", "profile"];

/// A signed-in account as issued by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>, id_token: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
            display_name: None,
            id_token: id_token.into(),
            refresh_token: None,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ProfileUpdate {
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    pub fn provider_id(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

/// Account creation, credential checks and profile updates.
///
/// Failures that carry a provider code are reported as
/// [`RegistrationError::Auth`], everything else (transport, parsing) uses the
/// other variants.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, RegistrationError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, RegistrationError>;

    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, RegistrationError>;

    /// Opens the provider's consent window and waits for it to complete.
    async fn federated_sign_in(
        &self,
        provider: FederatedProvider,
    ) -> Result<Identity, RegistrationError>;

    async fn delete_account(&self, identity: &Identity) -> Result<(), RegistrationError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl AccountResponse {
    fn into_identity(self, previous: Option<&Identity>) -> Result<Identity, RegistrationError> {
        let id_token = match (self.id_token, previous) {
            (Some(token), _) => token,
            (None, Some(prev)) => prev.id_token.clone(),
            (None, None) => {
                return Err(RegistrationError::Http(
                    "Identity response did not include an ID token".to_string(),
                ))
            }
        };

        Ok(Identity {
            uid: self.local_id,
            email: self.email.or_else(|| previous.and_then(|p| p.email.clone())),
            display_name: self.display_name,
            id_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    error: RestError,
}

#[derive(Debug, Deserialize)]
struct RestError {
    message: String,
}

fn rest_error(status: StatusCode, body: &[u8]) -> RegistrationError {
    match serde_json::from_slice::<RestErrorBody>(body) {
        Ok(parsed) => {
            RegistrationError::Auth(AuthErrorCode::from_rest_message(&parsed.error.message))
        }
        Err(_) => RegistrationError::Http(format!(
            "Identity Toolkit returned {}: {}",
            status,
            String::from_utf8_lossy(body)
        )),
    }
}

fn parse_response<R: DeserializeOwned>(method: &str, body: &[u8]) -> Result<R, RegistrationError> {
    serde_json::from_slice(body).map_err(|e| {
        RegistrationError::Http(format!("Unreadable accounts:{} response: {}", method, e))
    })
}

fn map_oauth_error(err: yup_oauth2::Error) -> RegistrationError {
    match &err {
        yup_oauth2::Error::AuthError(auth_err)
            if matches!(auth_err.error, yup_oauth2::error::AuthErrorCode::AccessDenied) =>
        {
            RegistrationError::Auth(AuthErrorCode::PopupClosedByUser)
        }
        _ => RegistrationError::Federated(err.to_string()),
    }
}

/// Releases the popup slot when the federated flow ends, however it ends.
struct PopupGuard<'a>(&'a AtomicBool);

impl Drop for PopupGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Only one consent window may be open at a time.
fn claim_popup(flag: &AtomicBool) -> Result<PopupGuard<'_>, RegistrationError> {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map_err(|_| RegistrationError::Auth(AuthErrorCode::CancelledPopupRequest))?;
    Ok(PopupGuard(flag))
}

/// Identity Toolkit REST client.
pub struct FirebaseAuth {
    client: HttpsClient,
    endpoint: String,
    api_key: String,
    google_client_secret: Option<PathBuf>,
    popup_open: AtomicBool,
}

impl FirebaseAuth {
    pub fn new(config: &RegistrationConfig, client: HttpsClient) -> Self {
        info!("FirebaseAuth initialized with endpoint: {}", config.auth_endpoint);

        Self {
            client,
            endpoint: config.auth_endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            google_client_secret: config.google_client_secret.clone(),
            popup_open: AtomicBool::new(false),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key)
    }

    async fn call<T: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        payload: &T,
    ) -> Result<R, RegistrationError> {
        debug!("Identity Toolkit call: accounts:{}", method);
        let response = post_json(&self.client, &self.url(method), payload).await?;

        if !response.status.is_success() {
            return Err(rest_error(response.status, &response.body));
        }

        parse_response(method, &response.body)
    }

    /// Runs the Google installed-app consent flow through a loopback redirect.
    async fn google_access_token(&self) -> Result<String, RegistrationError> {
        let secret_path = self.google_client_secret.as_ref().ok_or_else(|| {
            RegistrationError::ConfigError("google_client_secret is not configured".to_string())
        })?;

        let secret = yup_oauth2::read_application_secret(secret_path)
            .await
            .map_err(RegistrationError::CredentialsFileError)?;

        let authenticator =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .build()
                .await
                .map_err(|e| {
                    RegistrationError::Federated(format!("Failed to build authenticator: {}", e))
                })?;

        let token = authenticator
            .token(GOOGLE_SCOPES)
            .await
            .map_err(map_oauth_error)?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| {
                RegistrationError::Federated("Google returned no access token".to_string())
            })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, RegistrationError> {
        let response: AccountResponse = self
            .call(
                "signUp",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        let identity = response.into_identity(None)?;
        info!("Created account '{}'", identity.uid);
        Ok(identity)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, RegistrationError> {
        let response: AccountResponse = self
            .call(
                "signInWithPassword",
                &json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        response.into_identity(None)
    }

    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, RegistrationError> {
        let response: AccountResponse = self
            .call(
                "update",
                &json!({
                    "idToken": identity.id_token,
                    "displayName": update.display_name,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        response.into_identity(Some(identity))
    }

    async fn federated_sign_in(
        &self,
        provider: FederatedProvider,
    ) -> Result<Identity, RegistrationError> {
        let _popup = claim_popup(&self.popup_open)?;

        let access_token = match provider {
            FederatedProvider::Google => self.google_access_token().await?,
        };

        let post_body = format!(
            "access_token={}&providerId={}",
            access_token,
            provider.provider_id()
        );
        let response: AccountResponse = self
            .call(
                "signInWithIdp",
                &json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let identity = response.into_identity(None)?;
        info!("Signed in '{}' with {}", identity.uid, provider);
        Ok(identity)
    }

    async fn delete_account(&self, identity: &Identity) -> Result<(), RegistrationError> {
        let _: serde_json::Value = self
            .call("delete", &json!({ "idToken": identity.id_token }))
            .await?;

        info!("Deleted account '{}'", identity.uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_error_parsing() {
        let body = br#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let err = rest_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.auth_code(), Some(&AuthErrorCode::EmailAlreadyInUse));

        let err = rest_error(StatusCode::BAD_GATEWAY, b"<html>upstream</html>");
        assert!(matches!(err, RegistrationError::Http(_)));
    }

    #[test]
    fn test_unreadable_response_is_http_error() {
        let err = parse_response::<AccountResponse>("signUp", b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, RegistrationError::Http(_)));
        assert!(err.reason().starts_with("Unreadable accounts:signUp response"));
    }

    #[test]
    fn test_update_response_keeps_previous_token() {
        let previous = Identity::new("uid-1", Some("ada@example.com".into()), "old-token");
        let response: AccountResponse =
            serde_json::from_str(r#"{"localId":"uid-1","displayName":"Ada"}"#).unwrap();

        let identity = response.into_identity(Some(&previous)).unwrap();
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert_eq!(identity.id_token, "old-token");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_signup_response_requires_token() {
        let response: AccountResponse = serde_json::from_str(r#"{"localId":"uid-1"}"#).unwrap();
        assert!(response.into_identity(None).is_err());
    }

    #[test]
    fn test_second_popup_is_cancelled() {
        let flag = AtomicBool::new(false);
        let first = claim_popup(&flag).unwrap();

        let second = claim_popup(&flag);
        assert!(matches!(
            second,
            Err(RegistrationError::Auth(AuthErrorCode::CancelledPopupRequest))
        ));

        drop(first);
        assert!(claim_popup(&flag).is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let identity = Identity::new("uid-1", None, "very-secret");
        assert!(!format!("{:?}", identity).contains("very-secret"));
    }

    #[test]
    fn test_profile_update_serialization() {
        let update = ProfileUpdate::display_name("Ada");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "displayName": "Ada" })
        );
    }
}
