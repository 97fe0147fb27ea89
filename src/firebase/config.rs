//! Configuration for the Firebase clients and the form service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::firebase::error::ServiceError;

/// Web app options of the Firebase project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    pub fn new(
        api_key: impl Into<String>,
        auth_domain: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            auth_domain: auth_domain.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::ConfigError("firebase.api_key is empty".to_string()));
        }
        if self.project_id.is_empty() {
            return Err(ServiceError::ConfigError(
                "firebase.project_id is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Unknown keys are rejected so a stale setting fails loudly at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub listen_addr: String,
    /// Route the browser is sent to after a successful sign-in.
    pub landing_route: String,
    pub users_collection: String,
    /// Google OAuth client ("installed" application secret JSON).
    pub oauth_client_secret_path: PathBuf,
    /// Mounted forms untouched for this long are unmounted.
    pub form_idle_timeout_secs: u64,
    /// Upper bound on mounted forms; the least recently used one is evicted.
    pub max_forms: usize,
    pub firebase: FirebaseConfig,
}

impl AppConfig {
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn form_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.form_idle_timeout_secs)
    }

    pub fn from_toml(text: &str) -> Result<Self, ServiceError> {
        toml::from_str(text).map_err(|e| ServiceError::ConfigError(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::CredentialsFileError(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_toml(&text)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            landing_route: "/dashboard".to_string(),
            users_collection: "users".to_string(),
            oauth_client_secret_path: PathBuf::from("credentials/google-oauth-client.json"),
            form_idle_timeout_secs: 15 * 60,
            max_forms: 10_000,
            firebase: FirebaseConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [firebase]
            api_key = "key"
            auth_domain = "demo.firebaseapp.com"
            project_id = "demo"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen_addr, "127.0.0.1:3000");
        assert_eq!(cfg.landing_route, "/dashboard");
        assert_eq!(cfg.users_collection, "users");
        assert_eq!(cfg.form_idle_timeout(), Duration::from_secs(900));
        assert_eq!(cfg.max_forms, 10_000);
        assert_eq!(cfg.firebase.project_id, "demo");
        assert!(cfg.firebase.storage_bucket.is_none());
        assert!(cfg.firebase.validate().is_ok());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_toml(
            r#"
            listen_addr = "0.0.0.0:8080"
            landing_route = "/home"
            form_idle_timeout_secs = 60
            max_forms = 50

            [firebase]
            api_key = "key"
            auth_domain = "demo.firebaseapp.com"
            project_id = "demo"
            storage_bucket = "demo.appspot.com"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.landing_route, "/home");
        assert_eq!(cfg.form_idle_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.max_forms, 50);
        assert_eq!(cfg.firebase.storage_bucket.as_deref(), Some("demo.appspot.com"));
    }

    #[test]
    fn token_cache_setting_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            token_cache_path = "credentials/google-tokens.json"

            [firebase]
            api_key = "key"
            auth_domain = "demo.firebaseapp.com"
            project_id = "demo"
            "#,
        )
        .unwrap_err();

        match err {
            ServiceError::ConfigError(msg) => assert!(msg.contains("token_cache_path"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let cfg = FirebaseConfig::new("", "demo.firebaseapp.com", "demo");
        assert!(matches!(cfg.validate(), Err(ServiceError::ConfigError(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            AppConfig::from_toml("listen_addr = ["),
            Err(ServiceError::ConfigError(_))
        ));
    }
}
