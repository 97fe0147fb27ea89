//! Firebase application context
//!
//! Holds the project options the auth and Firestore clients are built from.
//! It carries no signed-in user; each sign-in's credential travels with the
//! `Identity` it produced.

use crate::firebase::config::FirebaseConfig;
use std::sync::Arc;

#[derive(Debug)]
pub struct FirebaseApp {
    options: FirebaseConfig,
}

impl FirebaseApp {
    pub fn new(options: FirebaseConfig) -> Arc<Self> {
        Arc::new(Self { options })
    }

    pub fn options(&self) -> &FirebaseConfig {
        &self.options
    }

    pub fn project_id(&self) -> &str {
        &self.options.project_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_exposes_its_options() {
        let app = FirebaseApp::new(FirebaseConfig::new("key", "demo.firebaseapp.com", "demo"));
        assert_eq!(app.project_id(), "demo");
        assert_eq!(app.options().auth_domain, "demo.firebaseapp.com");
    }
}
