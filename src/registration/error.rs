//! Error types for user registration

use crate::registration::auth_code::AuthErrorCode;
use std::fmt;
use thiserror::Error;

/// Failures reported by the identity provider, blob store or record store.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Authentication failed: {0}")]
    Auth(AuthErrorCode),

    #[error("Federated sign-in failed: {0}")]
    Federated(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse credentials: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("Firebase Storage API error: {0}")]
    StorageError(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl RegistrationError {
    pub fn auth_code(&self) -> Option<&AuthErrorCode> {
        match self {
            RegistrationError::Auth(code) => Some(code),
            _ => None,
        }
    }

    /// The failure detail without the variant's prefix.
    pub fn reason(&self) -> String {
        match self {
            RegistrationError::Auth(code) => code.to_string(),
            RegistrationError::CredentialsFileError(e) => e.to_string(),
            RegistrationError::CredentialsParseError(e) => e.to_string(),
            RegistrationError::Federated(msg)
            | RegistrationError::StorageError(msg)
            | RegistrationError::Http(msg)
            | RegistrationError::ObjectNotFound(msg)
            | RegistrationError::UserNotFound(msg)
            | RegistrationError::ConfigError(msg)
            | RegistrationError::ValidationError(msg) => msg.clone(),
        }
    }
}

/// Pre-flight checks that fail before any provider is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Profile picture is required.")]
    MissingProfileImage,

    #[error("Email and password are required.")]
    MissingCredentials,
}

/// The user action a failure happened in; only used to word messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    EmailSignup,
    FederatedSignIn,
    Login,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::EmailSignup => write!(f, "signup"),
            Operation::FederatedSignIn => write!(f, "Google Sign-in"),
            Operation::Login => write!(f, "login"),
        }
    }
}

/// Terminal outcome of a submission. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignupError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{}", .0.user_message())]
    Identity(AuthErrorCode),

    #[error("Failed to upload profile picture. Registration incomplete. {reason}")]
    MandatoryUpload { reason: String },

    #[error("An unexpected error occurred during {operation}.")]
    Unexpected { operation: Operation },
}

impl SignupError {
    /// Map a provider failure: coded identity errors keep their code, anything
    /// else becomes the generic message for `operation`.
    pub fn from_provider(err: &RegistrationError, operation: Operation) -> Self {
        match err.auth_code() {
            Some(code) => SignupError::Identity(code.clone()),
            None => SignupError::Unexpected { operation },
        }
    }
}

/// A best-effort additional image that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalUploadError {
    pub index: usize,
    pub file_name: String,
    pub reason: String,
}

impl fmt::Display for OptionalUploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "additional picture {} ({}): {}",
            self.index + 1,
            self.file_name,
            self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_provider_error_keeps_code() {
        let err = RegistrationError::Auth(AuthErrorCode::WeakPassword);
        let mapped = SignupError::from_provider(&err, Operation::EmailSignup);
        assert_eq!(mapped, SignupError::Identity(AuthErrorCode::WeakPassword));
        assert_eq!(
            mapped.to_string(),
            "Password should be at least 6 characters long."
        );
    }

    #[test]
    fn test_uncoded_provider_error_is_unexpected() {
        let err = RegistrationError::Http("connection reset".into());
        assert_eq!(
            SignupError::from_provider(&err, Operation::EmailSignup).to_string(),
            "An unexpected error occurred during signup."
        );
        assert_eq!(
            SignupError::from_provider(&err, Operation::FederatedSignIn).to_string(),
            "An unexpected error occurred during Google Sign-in."
        );
    }

    #[test]
    fn test_reason_drops_variant_prefix() {
        let err = RegistrationError::StorageError("Failed to upload me.png.".into());
        assert_eq!(err.to_string(), "Firebase Storage API error: Failed to upload me.png.");
        assert_eq!(err.reason(), "Failed to upload me.png.");
    }

    #[test]
    fn test_mandatory_upload_message() {
        let err = SignupError::MandatoryUpload {
            reason: "Failed to upload me.png.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to upload profile picture. Registration incomplete. Failed to upload me.png."
        );
    }
}
