//! Identity provider error codes and their user-facing messages

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    OperationNotAllowed,
    PopupClosedByUser,
    CancelledPopupRequest,
    Other(String),
}

impl AuthErrorCode {
    /// Parse an SDK-style code such as `auth/email-already-in-use`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/operation-not-allowed" => AuthErrorCode::OperationNotAllowed,
            "auth/popup-closed-by-user" => AuthErrorCode::PopupClosedByUser,
            "auth/cancelled-popup-request" => AuthErrorCode::CancelledPopupRequest,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    /// Parse the `error.message` field of an Identity Toolkit REST response.
    ///
    /// Some messages carry a detail suffix (`WEAK_PASSWORD : Password should be
    /// at least 6 characters`), only the part before ` : ` is significant.
    pub fn from_rest_message(message: &str) -> Self {
        let key = message.split(" : ").next().unwrap_or(message).trim();
        match key {
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "INVALID_EMAIL" => AuthErrorCode::InvalidEmail,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "OPERATION_NOT_ALLOWED" => AuthErrorCode::OperationNotAllowed,
            other => AuthErrorCode::Other(format!(
                "auth/{}",
                other.to_ascii_lowercase().replace('_', "-")
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::OperationNotAllowed => "auth/operation-not-allowed",
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::CancelledPopupRequest => "auth/cancelled-popup-request",
            AuthErrorCode::Other(code) => code,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => "This email address is already in use.",
            AuthErrorCode::InvalidEmail => "Please enter a valid email address.",
            AuthErrorCode::WeakPassword => "Password should be at least 6 characters long.",
            AuthErrorCode::OperationNotAllowed => {
                "Email/password accounts are not enabled. Contact support."
            }
            AuthErrorCode::PopupClosedByUser => "Google Sign-in popup closed before completion.",
            AuthErrorCode::CancelledPopupRequest => "Only one sign-in popup allowed at a time.",
            AuthErrorCode::Other(_) => {
                "An unknown authentication error occurred. Please try again."
            }
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_to_fixed_messages() {
        let table = [
            ("auth/email-already-in-use", "This email address is already in use."),
            ("auth/invalid-email", "Please enter a valid email address."),
            ("auth/weak-password", "Password should be at least 6 characters long."),
            (
                "auth/operation-not-allowed",
                "Email/password accounts are not enabled. Contact support.",
            ),
            (
                "auth/popup-closed-by-user",
                "Google Sign-in popup closed before completion.",
            ),
            (
                "auth/cancelled-popup-request",
                "Only one sign-in popup allowed at a time.",
            ),
        ];

        for (code, message) in table {
            let parsed = AuthErrorCode::from_code(code);
            assert_eq!(parsed.user_message(), message);
            assert_eq!(parsed.as_str(), code);
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let code = AuthErrorCode::from_code("auth/network-request-failed");
        assert_eq!(code, AuthErrorCode::Other("auth/network-request-failed".into()));
        assert_eq!(
            code.user_message(),
            "An unknown authentication error occurred. Please try again."
        );
    }

    #[test]
    fn test_rest_messages() {
        assert_eq!(
            AuthErrorCode::from_rest_message("EMAIL_EXISTS"),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            AuthErrorCode::from_rest_message(
                "WEAK_PASSWORD : Password should be at least 6 characters"
            ),
            AuthErrorCode::WeakPassword
        );
        assert_eq!(
            AuthErrorCode::from_rest_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthErrorCode::Other("auth/too-many-attempts-try-later".into())
        );
    }
}
