//! JSON-over-HTTPS client shared by the Identity Toolkit and Firestore clients

use crate::firebase::error::ServiceError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

#[derive(Clone)]
pub struct RestClient {
    http: HttpsClient,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl RestClient {
    pub fn new() -> Result<Self, ServiceError> {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| {
                ServiceError::TransportError(format!("Failed to load native roots: {}", e))
            })?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let http = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);
        Ok(Self { http })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<T, ServiceError> {
        self.send(Method::GET, url, bearer, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<T, ServiceError> {
        self.send(Method::POST, url, bearer, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<T, ServiceError> {
        self.send(Method::PATCH, url, bearer, Some(body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
    ) -> Result<T, ServiceError> {
        let payload = match body {
            Some(v) => Bytes::from(serde_json::to_vec(v)?),
            None => Bytes::new(),
        };

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder
            .body(Full::new(payload))
            .map_err(|e| ServiceError::TransportError(format!("Invalid request: {}", e)))?;

        let response = self.http.request(request).await.map_err(|e| {
            ServiceError::TransportError(format!("{} {} failed: {}", method, strip_query(url), e))
        })?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ServiceError::TransportError(format!("Failed to read body: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Drops the query string so API keys never reach the logs.
fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Builds an `ApiError` from a Google error envelope, falling back to the
/// HTTP reason phrase when the body is not one.
pub fn api_error(status: StatusCode, body: &[u8]) -> ServiceError {
    let code = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.is_empty() => env.error.message,
        Ok(env) => env.error.status.unwrap_or_default(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("UNKNOWN")
            .to_string(),
    };
    ServiceError::ApiError {
        status: status.as_u16(),
        code,
    }
}
