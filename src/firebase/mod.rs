//! Firebase client layer: Identity Toolkit auth, Firestore documents, Google sign-in

pub mod app;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod firestore;
pub mod provider;
pub mod rest;

pub use app::FirebaseApp;
pub use clients::ServiceClients;
pub use config::{AppConfig, FirebaseConfig};
pub use error::ServiceError;
pub use provider::GoogleAuthProvider;
