// stockroom-client/src/client/http_oneshot.rs
// Oneshot HTTP client - in-process calls (feature "in-process")

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::Request;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use crate::{ClientError, ClientResult};

use super::http::HttpClient;

/// Oneshot HTTP client
///
/// Calls an axum Router directly through tower's `oneshot`, with no sockets
/// involved. Used to run the returns workflow against an in-process backend.
///
/// # Example
///
/// ```ignore
/// use stockroom_client::OneshotHttpClient;
///
/// let router = stockroom_mock::build_app(state);
/// let client = OneshotHttpClient::new(router);
/// let items: ApiResponse<Vec<LineItemRecord>> =
///     client.get("/api/transactions/TX-001/line-items").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Router,
    token: Option<String>,
}

impl OneshotHttpClient {
    /// `router` must already have its state attached
    pub fn new(router: Router) -> Self {
        Self {
            router,
            token: None,
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn build_request(
        &self,
        method: http::Method,
        path: &str,
        body: Body,
    ) -> Result<Request<Body>, ClientError> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = &self.token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {}", e)))?;

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body_bytes).to_string();
            return Err(super::error_from_body(status, text));
        }

        serde_json::from_slice(&body_bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.build_request(http::Method::GET, path, Body::empty())?;
        self.execute(request).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        let request = self.build_request(http::Method::POST, path, Body::from(bytes))?;
        self.execute(request).await
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
