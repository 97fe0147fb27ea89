//! Google sign-in provider
//!
//! The descriptor is what the form hands to `sign_in_federated`. The token
//! source runs Google's installed-app OAuth flow (browser consent, loopback
//! redirect) and yields the access token that Identity Toolkit exchanges for a
//! Firebase session.

use crate::firebase::error::ServiceError;
use crate::service::ProviderDescriptor;
use std::path::PathBuf;
use tracing::info;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub const GOOGLE_PROVIDER_ID: &str = "google.com";

#[derive(Debug, Clone)]
pub struct GoogleAuthProvider {
    descriptor: ProviderDescriptor,
}

impl GoogleAuthProvider {
    pub fn new() -> Self {
        Self {
            descriptor: ProviderDescriptor {
                provider_id: GOOGLE_PROVIDER_ID.to_string(),
                scopes: vec![
                    "openid".to_string(),
                    "email".to_string(),
                    "profile".to_string(),
                ],
            },
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }
}

impl Default for GoogleAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a fresh consent flow for every sign-in. Tokens are kept in memory by
/// the per-call authenticator only, so one visitor's Google grant is never
/// handed to another.
pub struct GoogleTokenSource {
    client_secret_path: PathBuf,
}

impl GoogleTokenSource {
    pub fn new(client_secret_path: impl Into<PathBuf>) -> Self {
        Self {
            client_secret_path: client_secret_path.into(),
        }
    }

    pub async fn access_token(&self, scopes: &[String]) -> Result<String, ServiceError> {
        let secret = yup_oauth2::read_application_secret(&self.client_secret_path)
            .await
            .map_err(|e| {
                ServiceError::CredentialsFileError(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to read OAuth client file '{}': {}",
                        self.client_secret_path.display(),
                        e
                    ),
                ))
            })?;

        let auth =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .build()
                .await
                .map_err(|e| {
                    ServiceError::AuthError(format!("Failed to build authenticator: {}", e))
                })?;

        info!("Requesting Google consent for scopes {:?}", scopes);
        let token = auth
            .token(scopes)
            .await
            .map_err(|e| ServiceError::AuthError(format!("Google sign-in failed: {}", e)))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::AuthError("Google returned no access token".to_string()))
    }
}
