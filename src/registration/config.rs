//! Configuration for user registration

use crate::registration::error::RegistrationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://firebasestorage.googleapis.com/v0";
pub const DEFAULT_LANDING_ROUTE: &str = "/chat";

/// Firebase web app settings plus the knobs of the signup flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationConfig {
    pub api_key: String,
    #[serde(default)]
    pub auth_domain: String,
    #[serde(default)]
    pub project_id: String,
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,
    /// OAuth client secret JSON used for Google sign-in
    #[serde(default)]
    pub google_client_secret: Option<PathBuf>,
    #[serde(default = "default_landing_route")]
    pub landing_route: String,
    /// Write `users/{uid}/profile.json` after a successful signup
    #[serde(default)]
    pub persist_profiles: bool,
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_storage_endpoint() -> String {
    DEFAULT_STORAGE_ENDPOINT.to_string()
}

fn default_landing_route() -> String {
    DEFAULT_LANDING_ROUTE.to_string()
}

impl RegistrationConfig {
    pub fn new(api_key: impl Into<String>, storage_bucket: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            storage_bucket: storage_bucket.into(),
            ..Self::default()
        }
    }

    pub fn with_google_client_secret(mut self, path: impl Into<PathBuf>) -> Self {
        self.google_client_secret = Some(path.into());
        self
    }

    pub fn with_persisted_profiles(mut self) -> Self {
        self.persist_profiles = true;
        self
    }

    /// Load a TOML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistrationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RegistrationError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RegistrationError> {
        toml::from_str(text)
            .map_err(|e| RegistrationError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("FIREBASE_API_KEY") {
            self.api_key = key;
        }
        if let Some(bucket) = lookup("FIREBASE_STORAGE_BUCKET") {
            self.storage_bucket = bucket;
        }
        if let Some(host) = lookup("FIREBASE_AUTH_EMULATOR_HOST") {
            self.auth_endpoint = format!("http://{}/identitytoolkit.googleapis.com/v1", host);
        }
    }

    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.api_key.trim().is_empty() {
            return Err(RegistrationError::ConfigError(
                "api_key cannot be empty".to_string(),
            ));
        }
        if self.storage_bucket.trim().is_empty() {
            return Err(RegistrationError::ConfigError(
                "storage_bucket cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            auth_domain: String::new(),
            project_id: String::new(),
            storage_bucket: String::new(),
            messaging_sender_id: None,
            app_id: None,
            auth_endpoint: default_auth_endpoint(),
            storage_endpoint: default_storage_endpoint(),
            google_client_secret: None,
            landing_route: default_landing_route(),
            persist_profiles: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = RegistrationConfig::from_toml_str(
            r#"
            api_key = "key"
            storage_bucket = "lets-connect.appspot.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth_endpoint, DEFAULT_AUTH_ENDPOINT);
        assert_eq!(config.storage_endpoint, DEFAULT_STORAGE_ENDPOINT);
        assert_eq!(config.landing_route, "/chat");
        assert!(!config.persist_profiles);
        assert!(config.google_client_secret.is_none());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = RegistrationConfig::new("  ", "bucket");
        assert!(matches!(
            config.validate(),
            Err(RegistrationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = RegistrationConfig::new("key", "bucket")
            .with_google_client_secret("client_secret.json")
            .with_persisted_profiles();

        assert_eq!(
            config.google_client_secret.as_deref(),
            Some(Path::new("client_secret.json"))
        );
        assert!(config.persist_profiles);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = RegistrationConfig::new("key", "bucket");
        config.apply_overrides(|key| match key {
            "FIREBASE_STORAGE_BUCKET" => Some("other-bucket".to_string()),
            "FIREBASE_AUTH_EMULATOR_HOST" => Some("localhost:9099".to_string()),
            _ => None,
        });

        assert_eq!(config.api_key, "key");
        assert_eq!(config.storage_bucket, "other-bucket");
        assert_eq!(
            config.auth_endpoint,
            "http://localhost:9099/identitytoolkit.googleapis.com/v1"
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key = \"key\"\nstorage_bucket = \"bucket\"\n\
             landing_route = \"/profile\"\npersist_profiles = true"
        )
        .unwrap();

        let config = RegistrationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.landing_route, "/profile");
        assert!(config.persist_profiles);
    }
}
