//! Firebase Authentication over the Identity Toolkit REST API

use crate::firebase::app::FirebaseApp;
use crate::firebase::error::ServiceError;
use crate::firebase::provider::GoogleTokenSource;
use crate::firebase::rest::RestClient;
use crate::service::{AuthError, Credential, Identity, IdentityService, ProviderDescriptor};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const IDENTITY_TOOLKIT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Common shape of the `accounts:*` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AccountResponse {
    /// The signed-in identity, carrying this response's ID token as its
    /// credential.
    pub fn identity(&self) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            display_name: non_empty(&self.display_name),
            email: non_empty(&self.email),
            photo_url: non_empty(&self.photo_url),
            credential: non_empty(&self.id_token)
                .map(Credential::bearer)
                .unwrap_or_default(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

pub struct FirebaseAuth {
    app: Arc<FirebaseApp>,
    rest: RestClient,
    google: GoogleTokenSource,
}

impl FirebaseAuth {
    pub fn new(app: Arc<FirebaseApp>, rest: RestClient, google: GoogleTokenSource) -> Self {
        Self { app, rest, google }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            IDENTITY_TOOLKIT,
            method,
            self.app.options().api_key
        )
    }

    async fn call(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<AccountResponse, ServiceError> {
        let url = self.endpoint(method);
        self.rest.post(&url, None, &body).await
    }

    /// `requestUri` sent with IdP exchanges; must be an authorized domain.
    fn request_uri(&self) -> String {
        format!("https://{}", self.app.options().auth_domain)
    }
}

#[async_trait]
impl IdentityService for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account = self
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        info!("Created account {}", account.local_id);
        Ok(account.identity())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account = self
            .call(
                "signInWithPassword",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;
        info!("Signed in {}", account.local_id);
        Ok(account.identity())
    }

    async fn sign_in_federated(
        &self,
        provider: &ProviderDescriptor,
    ) -> Result<Identity, AuthError> {
        let access_token = self.google.access_token(&provider.scopes).await?;
        let post_body = format!(
            "access_token={}&providerId={}",
            access_token, provider.provider_id
        );
        let account = self
            .call(
                "signInWithIdp",
                json!({
                    "postBody": post_body,
                    "requestUri": self.request_uri(),
                    "returnIdpCredential": true,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        info!("Signed in {} via {}", account.local_id, provider.provider_id);
        Ok(account.identity())
    }

    async fn update_display_name(&self, identity: &Identity, name: &str) -> Result<(), AuthError> {
        let id_token = identity
            .credential
            .token()
            .ok_or(ServiceError::NotSignedIn)?;
        self.call(
            "update",
            json!({ "idToken": id_token, "displayName": name, "returnSecureToken": true }),
        )
        .await?;
        Ok(())
    }
}
