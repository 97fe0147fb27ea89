//! Error types for the Firebase clients

use crate::service::{AuthError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Failed to read credentials file: {0}")]
    CredentialsFileError(#[from] std::io::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    TransportError(String),

    /// Error envelope returned by a Google REST API.
    #[error("Firebase API error {status}: {code}")]
    ApiError { status: u16, code: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No signed-in user")]
    NotSignedIn,
}

/// Renders an Identity Toolkit error code the way the Firebase web SDK does.
pub fn auth_message(code: &str) -> (Option<&'static str>, String) {
    // "WEAK_PASSWORD : Password should be at least 6 characters"
    let head = code.split(" : ").next().unwrap_or(code).trim();
    let mapped = match head {
        "EMAIL_EXISTS" => Some("auth/email-already-in-use"),
        "INVALID_EMAIL" => Some("auth/invalid-email"),
        "MISSING_EMAIL" => Some("auth/missing-email"),
        "MISSING_PASSWORD" => Some("auth/missing-password"),
        "WEAK_PASSWORD" => Some("auth/weak-password"),
        "EMAIL_NOT_FOUND" => Some("auth/user-not-found"),
        "INVALID_PASSWORD" => Some("auth/wrong-password"),
        "INVALID_LOGIN_CREDENTIALS" => Some("auth/invalid-credential"),
        "INVALID_IDP_RESPONSE" => Some("auth/invalid-credential"),
        "USER_DISABLED" => Some("auth/user-disabled"),
        "OPERATION_NOT_ALLOWED" => Some("auth/operation-not-allowed"),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => Some("auth/too-many-requests"),
        "TOKEN_EXPIRED" => Some("auth/user-token-expired"),
        "INVALID_ID_TOKEN" => Some("auth/invalid-user-token"),
        _ => None,
    };
    match mapped {
        Some(sdk_code) => (mapped, format!("Firebase: Error ({sdk_code}).")),
        None => (None, format!("Firebase: {head}.")),
    }
}

impl From<ServiceError> for AuthError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ApiError { code, .. } => {
                let (sdk_code, message) = auth_message(&code);
                let err = AuthError::new(message);
                match sdk_code {
                    Some(c) => err.with_code(c),
                    None => err,
                }
            }
            ServiceError::TransportError(_) => {
                AuthError::new("Firebase: Error (auth/network-request-failed).")
                    .with_code("auth/network-request-failed")
            }
            other => AuthError::new(other.to_string()),
        }
    }
}

impl From<ServiceError> for StoreError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ApiError { status, code } => {
                StoreError::new(format!("FirebaseError: [code={}]: {}", status, code))
            }
            other => StoreError::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_use_sdk_wording() {
        let (code, msg) = auth_message("EMAIL_EXISTS");
        assert_eq!(code, Some("auth/email-already-in-use"));
        assert_eq!(msg, "Firebase: Error (auth/email-already-in-use).");
    }

    #[test]
    fn detail_suffix_is_ignored() {
        let (code, msg) = auth_message("WEAK_PASSWORD : Password should be at least 6 characters");
        assert_eq!(code, Some("auth/weak-password"));
        assert_eq!(msg, "Firebase: Error (auth/weak-password).");
    }

    #[test]
    fn unknown_codes_pass_through() {
        let (code, msg) = auth_message("QUOTA_EXCEEDED");
        assert_eq!(code, None);
        assert_eq!(msg, "Firebase: QUOTA_EXCEEDED.");
    }

    #[test]
    fn transport_failures_become_network_errors() {
        let err: AuthError = ServiceError::TransportError("connection reset".into()).into();
        assert_eq!(err.code.as_deref(), Some("auth/network-request-failed"));
    }

    #[test]
    fn api_errors_keep_code_for_store() {
        let err: StoreError = ServiceError::ApiError {
            status: 403,
            code: "PERMISSION_DENIED".into(),
        }
        .into();
        assert_eq!(err.message, "FirebaseError: [code=403]: PERMISSION_DENIED");
    }
}
