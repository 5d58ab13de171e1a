//! HTTP request executor for the AlumNet backend.
//!
//! Builds and sends one request at a time, attaches whatever credential
//! the [`TokenProvider`] can produce, and normalizes every failure into
//! an [`ApiError`]. Callers never see a raw transport error.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::auth::{TokenKind, TokenProvider};
use crate::config::ClientConfig;

use super::error::{codes, ApiError};

/// Path prefix every request is issued under.
const API_PREFIX: &str = "/api";

/// Header carrying the dev session blob in local-identity mode.
const DEV_TOKEN_HEADER: &str = "x-dev-token";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the unauthenticated health probe. Much shorter than the
/// request timeout: a probe that takes this long is an unhealthy answer.
const HEALTH_PROBE_TIMEOUT_SECS: u64 = 5;

/// A flat query parameter set; `None` values are omitted entirely.
pub type QueryParams<'a> = [(&'a str, Option<String>)];

/// API client for the AlumNet backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenProvider>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<TokenProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, endpoint)
    }

    /// Attach the auth credential, if one is available, under the header
    /// the server expects for the active identity mode. Exactly one of
    /// the two header shapes is ever present.
    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        let Some(token) = self.tokens.get_auth_token() else {
            return headers;
        };

        let (name, value) = match token.kind {
            TokenKind::Dev => (
                header::HeaderName::from_static(DEV_TOKEN_HEADER),
                header::HeaderValue::from_str(&token.value),
            ),
            TokenKind::Bearer => (
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token.value)),
            ),
        };

        match value {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(e) => {
                // Degrade to an unauthenticated request; the server will
                // answer 401 through the normal error path.
                warn!(error = %e, "token not representable as a header value, sending without");
            }
        }
        headers
    }

    /// Execute one request and decode the JSON response as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        extra_headers: Option<header::HeaderMap>,
    ) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!(%method, %url, "sending API request");

        let mut builder = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json")
            .headers(self.auth_headers());
        if let Some(extra) = extra_headers {
            builder = builder.headers(extra);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e, codes::NETWORK_ERROR))?;

        Self::decode(response, codes::HTTP_ERROR).await
    }

    /// Multipart submission path. The transport sets the content type
    /// (with its boundary); failures carry the upload-specific codes.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        debug!(%url, "uploading multipart form");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e, codes::UPLOAD_ERROR))?;

        Self::decode(response, codes::UPLOAD_FAILED).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        fallback_code: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status, &body, fallback_code));
        }

        // Schema correctness is the caller's responsibility; a payload
        // that does not fit T is still a client-visible failure.
        response.json().await.map_err(|e| {
            ApiError::new(
                format!("Failed to decode response: {}", e),
                codes::REQUEST_FAILED,
                status.as_u16(),
            )
        })
    }

    // ===== Convenience wrappers =====

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams<'_>,
    ) -> Result<T, ApiError> {
        let endpoint = match build_query_string(params) {
            Some(query) => format!("{}?{}", endpoint, query),
            None => endpoint.to_string(),
        };
        self.request(&endpoint, Method::GET, None, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        self.request(endpoint, Method::POST, Some(body), None).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        self.request(endpoint, Method::PUT, Some(body), None).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, ApiError> {
        self.request(endpoint, Method::PATCH, Some(body), None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, Method::DELETE, None, None).await
    }

    /// Unauthenticated probe of `{base_url}/health`. Only the status is
    /// interpreted; the body is ignored. Never fails.
    pub async fn probe_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        let result = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(HEALTH_PROBE_TIMEOUT_SECS))
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }
}

/// Serialize flat key-value parameters into a query string, skipping
/// absent values. Returns `None` when nothing remains.
fn build_query_string(params: &QueryParams<'_>) -> Option<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            any = true;
        }
    }
    any.then(|| serializer.finish())
}
