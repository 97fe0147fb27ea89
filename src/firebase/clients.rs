//! Shared service handles, built once at startup and passed by handle

use crate::firebase::app::FirebaseApp;
use crate::firebase::auth::FirebaseAuth;
use crate::firebase::config::AppConfig;
use crate::firebase::error::ServiceError;
use crate::firebase::firestore::Firestore;
use crate::firebase::provider::{GoogleAuthProvider, GoogleTokenSource};
use crate::firebase::rest::RestClient;
use crate::service::{DocumentStore, IdentityService};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ServiceClients {
    pub app: Arc<FirebaseApp>,
    pub auth: Arc<dyn IdentityService>,
    pub db: Arc<dyn DocumentStore>,
    pub provider: GoogleAuthProvider,
}

impl ServiceClients {
    pub fn initialize(config: &AppConfig) -> Result<Self, ServiceError> {
        config.firebase.validate()?;

        let app = FirebaseApp::new(config.firebase.clone());
        let rest = RestClient::new()?;
        let google = GoogleTokenSource::new(config.oauth_client_secret_path.clone());

        let auth = FirebaseAuth::new(app.clone(), rest.clone(), google);
        let db = Firestore::new(app.clone(), rest);

        info!(
            "Firebase clients initialized for project: {}",
            config.firebase.project_id
        );

        Ok(Self {
            app,
            auth: Arc::new(auth),
            db: Arc::new(db),
            provider: GoogleAuthProvider::new(),
        })
    }

    pub fn from_parts(
        app: Arc<FirebaseApp>,
        auth: Arc<dyn IdentityService>,
        db: Arc<dyn DocumentStore>,
        provider: GoogleAuthProvider,
    ) -> Self {
        Self {
            app,
            auth,
            db,
            provider,
        }
    }
}
