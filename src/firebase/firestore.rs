//! Cloud Firestore document client over the REST API
//! Documents live at projects/{project}/databases/(default)/documents/{collection}/{key}

use crate::firebase::app::FirebaseApp;
use crate::firebase::error::ServiceError;
use crate::firebase::rest::RestClient;
use crate::service::{Credential, Document, DocumentStore, FieldValue, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

const FIRESTORE: &str = "https://firestore.googleapis.com/v1";

pub struct Firestore {
    app: Arc<FirebaseApp>,
    rest: RestClient,
}

impl Firestore {
    pub fn new(app: Arc<FirebaseApp>, rest: RestClient) -> Self {
        Self { app, rest }
    }

    fn document_url(&self, collection: &str, key: &str) -> String {
        let options = self.app.options();
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}?key={}",
            FIRESTORE, options.project_id, collection, key, options.api_key
        )
    }
}

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        // int64 travels as a decimal string
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
    }
}

pub fn decode_value(value: &Value) -> Option<FieldValue> {
    let obj = value.as_object()?;
    let (kind, inner) = obj.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(FieldValue::Null),
        "booleanValue" => inner.as_bool().map(FieldValue::Bool),
        "integerValue" => match inner {
            Value::String(s) => s.parse().ok().map(FieldValue::Integer),
            other => other.as_i64().map(FieldValue::Integer),
        },
        "stringValue" => inner.as_str().map(|s| FieldValue::String(s.to_string())),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc))),
        _ => None,
    }
}

pub fn encode_document(fields: &Document) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    json!({ "fields": encoded })
}

/// Decodes the `fields` of a Firestore document; unsupported value kinds
/// (maps, arrays, references...) are skipped.
pub fn decode_document(body: &Value) -> Document {
    let mut doc = Document::new();
    if let Some(fields) = body.get("fields").and_then(Value::as_object) {
        for (name, raw) in fields {
            match decode_value(raw) {
                Some(v) => {
                    doc.insert(name.clone(), v);
                }
                None => warn!("Skipping unsupported Firestore field '{}'", name),
            }
        }
    }
    doc
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn get_document(
        &self,
        credential: &Credential,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, key);

        match self.rest.get::<Value>(&url, credential.token()).await {
            Ok(body) => Ok(Some(decode_document(&body))),
            Err(ServiceError::ApiError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put_document(
        &self,
        credential: &Credential,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, key);

        // PATCH without an update mask replaces the whole document
        self.rest
            .patch::<Value>(&url, credential.token(), &encode_document(&fields))
            .await?;

        info!("Wrote document {}/{}", collection, key);
        Ok(())
    }
}
