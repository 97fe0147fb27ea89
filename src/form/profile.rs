//! User profile document
//! Structure: {users_collection}/{uid} -> { name, email, photoURL, createdAt }

use crate::service::{Document, DocumentStore, FieldValue, Identity, StoreError};
use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDocument {
    pub name: String,
    pub email: String,
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProfileDocument {
    /// Profile seeded from what the identity knows, with `fallback_name`
    /// standing in for a missing display name.
    pub fn from_identity(identity: &Identity, fallback_name: &str, created_at: DateTime<Utc>) -> Self {
        let name = identity
            .display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback_name);
        Self {
            name: name.to_string(),
            email: identity.email.clone().unwrap_or_default(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            created_at,
        }
    }

    pub fn to_fields(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".to_string(), FieldValue::String(self.name.clone()));
        doc.insert("email".to_string(), FieldValue::String(self.email.clone()));
        doc.insert(
            "photoURL".to_string(),
            FieldValue::String(self.photo_url.clone()),
        );
        doc.insert("createdAt".to_string(), FieldValue::Timestamp(self.created_at));
        doc
    }

    pub fn from_fields(doc: &Document) -> Option<Self> {
        let text = |key: &str| doc.get(key).and_then(FieldValue::as_str).map(str::to_string);
        Some(Self {
            name: text("name")?,
            email: text("email").unwrap_or_default(),
            photo_url: text("photoURL").unwrap_or_default(),
            created_at: doc.get("createdAt").and_then(FieldValue::as_timestamp)?,
        })
    }
}

/// Writes a profile for `identity` unless one already exists.
///
/// Read-then-write, not a transaction: two first logins racing for the same
/// identity may both write. The write is a full overwrite of the same shape,
/// so the only visible effect is a later `createdAt`.
///
/// Both calls act with the identity's own credential.
///
/// Returns whether a document was written.
pub async fn ensure_profile_document(
    db: &dyn DocumentStore,
    collection: &str,
    identity: &Identity,
    fallback_name: &str,
) -> Result<bool, StoreError> {
    let credential = &identity.credential;
    if db
        .get_document(credential, collection, &identity.uid)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    let profile = ProfileDocument::from_identity(identity, fallback_name, Utc::now());
    db.put_document(credential, collection, &identity.uid, profile.to_fields())
        .await?;

    info!("Created profile document {}/{}", collection, identity.uid);
    Ok(true)
}
