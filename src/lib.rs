//! Financely sign-up / log-in service backed by Firebase Authentication and
//! Cloud Firestore.

pub mod api;
pub mod firebase;
pub mod form;
pub mod service;
