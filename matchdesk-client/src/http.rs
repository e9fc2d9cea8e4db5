//! HTTP client core
//!
//! Issues REST calls against the configured origin, attaches the bearer
//! token from the session store, and performs a single refresh-and-retry
//! cycle when the server rejects an access token with 401. Every other
//! error propagates unchanged to the caller.

use crate::session::SessionStore;
use log::{debug, warn};
use matchdesk_core::{AdminError, AdminResult, ApiConfig, ErrorContext};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters, appended in order
    pub params: Vec<(String, String)>,
    /// JSON request body
    pub body: Option<Value>,
    /// Extra headers for this request only
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// Wire shape of the token-refresh endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Authenticated REST client
///
/// The session store is injected at construction and consulted on every
/// dispatch; there is no global header state. Concurrent 401s coalesce on a
/// single in-flight refresh behind `refresh_gate`.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    /// Create a new client for the configured origin
    pub fn new(config: &ApiConfig, session: SessionStore) -> AdminResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
                AdminError::Config {
                    message: format!("Invalid user agent: {}", e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("http_client").with_operation("new"),
                }
            })?,
        );

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| AdminError::Config {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("new"),
            })?;

        debug!("Created API client for {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue an authenticated request
    ///
    /// Attaches the stored access token as a bearer credential when one
    /// exists. On a 401 the request is retried exactly once after a token
    /// refresh; a second 401 (or any other failure) propagates to the
    /// caller.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> AdminResult<Value> {
        // Attempt counter local to this call: one retry per originating
        // request, no matter how many 401s recur.
        let mut attempt: u8 = 0;
        loop {
            let token = self.session.access_token().await?;
            let response = self
                .execute(method.clone(), path, &options, token.as_deref())
                .await?;

            if response.status().as_u16() == 401 && attempt == 0 {
                attempt += 1;

                if self.session.refresh_token().await?.is_none() {
                    // Nothing to refresh with; the 401 is terminal.
                    return Err(Self::response_error(response, "send").await);
                }

                debug!("401 on {} {}, refreshing session", method, path);
                self.refresh_session(token.as_deref()).await?;
                continue;
            }

            return Self::into_value(response).await;
        }
    }

    /// Issue a request without bearer authentication or retry
    ///
    /// Used for the login and refresh endpoints, which authenticate by
    /// payload rather than by header.
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> AdminResult<Value> {
        let response = self.execute(method, path, &options, None).await?;
        Self::into_value(response).await
    }

    pub async fn get(&self, path: &str, params: Vec<(String, String)>) -> AdminResult<Value> {
        self.send(Method::GET, path, RequestOptions::new().with_params(params))
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> AdminResult<Value> {
        self.send(Method::POST, path, RequestOptions::new().with_body(body))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> AdminResult<Value> {
        self.send(Method::PUT, path, RequestOptions::new().with_body(body))
            .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> AdminResult<Value> {
        self.send(Method::PATCH, path, RequestOptions::new().with_body(body))
            .await
    }

    pub async fn delete(&self, path: &str, body: Option<Value>) -> AdminResult<Value> {
        let mut options = RequestOptions::new();
        if let Some(body) = body {
            options = options.with_body(body);
        }
        self.send(Method::DELETE, path, options).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> AdminResult<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut request = self.http.request(method.clone(), &url);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        for (key, value) in &options.headers {
            request = request.header(key, value);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        request.send().await.map_err(|e| AdminError::Network {
            message: format!("Request to {} failed: {}", url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client")
                .with_operation("execute")
                .with_metadata("method", method.as_str())
                .with_metadata("url", &url)
                .with_suggestion("Check network connectivity and API status"),
        })
    }

    /// Exchange the refresh token for a new access/refresh pair
    ///
    /// Concurrent callers coalesce on one in-flight refresh: whoever enters
    /// the gate after a successful renewal finds a token that differs from
    /// the one it failed with and returns without another round trip. On
    /// refresh failure all stored credentials are cleared and the error
    /// instructs the caller to return to the login view.
    async fn refresh_session(&self, failed_token: Option<&str>) -> AdminResult<()> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.session.access_token().await? {
            if Some(current.as_str()) != failed_token {
                debug!("Session already refreshed by a concurrent request");
                return Ok(());
            }
        }

        let Some(refresh_token) = self.session.refresh_token().await? else {
            return Err(AdminError::Authentication {
                message: "Session was cleared while refreshing".to_string(),
                source: None,
                context: Self::relogin_context("refresh_session"),
            });
        };

        let result = self
            .send_raw(
                Method::POST,
                "/auth/refresh",
                RequestOptions::new()
                    .with_body(serde_json::json!({ "refreshToken": refresh_token })),
            )
            .await
            .and_then(|value| Ok(serde_json::from_value::<RefreshResponse>(value)?));

        match result {
            Ok(pair) => {
                self.session
                    .store_tokens(&pair.access_token, &pair.refresh_token)
                    .await?;
                debug!("Session refreshed");
                Ok(())
            }
            Err(err) => {
                warn!("Token refresh failed: {}", err);
                if let Err(clear_err) = self.session.clear().await {
                    warn!(
                        "Failed to clear credentials after refresh failure: {}",
                        clear_err
                    );
                }
                Err(AdminError::Authentication {
                    message: "Session refresh failed".to_string(),
                    source: Some(Box::new(err)),
                    context: Self::relogin_context("refresh_session"),
                })
            }
        }
    }

    fn relogin_context(operation: &str) -> ErrorContext {
        ErrorContext::new("http_client")
            .with_operation(operation)
            .with_metadata("redirect_to", "/login")
            .with_suggestion("Log in again")
    }

    async fn response_error(response: reqwest::Response, operation: &str) -> AdminError {
        let status = response.status();
        let url = response.url().clone();

        let mut body = response.text().await.unwrap_or_default();
        if body.is_empty() {
            body = status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string();
        }

        AdminError::Http {
            status: status.as_u16(),
            body,
            context: ErrorContext::new("http_client")
                .with_operation(operation)
                .with_metadata("url", url.as_str())
                .with_suggestion(match status.as_u16() {
                    401 => "Check your access token",
                    403 => "Check account permissions",
                    404 => "Resource not found or not accessible",
                    _ => "Check network connectivity and API status",
                }),
        }
    }

    async fn into_value(response: reqwest::Response) -> AdminResult<Value> {
        if !response.status().is_success() {
            return Err(Self::response_error(response, "send").await);
        }

        let text = response.text().await.map_err(|e| AdminError::Network {
            message: format!("Failed to read response body: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("read_body"),
        })?;

        if text.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchdesk_core::AdminConfig;

    #[test]
    fn test_client_creation() {
        let config = AdminConfig::default();
        let client = ApiClient::new(&config.api, SessionStore::in_memory());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = AdminConfig::default();
        config.api.base_url = "https://api.example.com/".to_string();
        let client = ApiClient::new(&config.api, SessionStore::in_memory()).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .with_param("page", 2)
            .with_body(serde_json::json!({"name": "test"}))
            .with_header("X-Request-Id", "abc");

        assert_eq!(options.params, vec![("page".to_string(), "2".to_string())]);
        assert!(options.body.is_some());
        assert_eq!(
            options.headers.get("X-Request-Id").map(String::as_str),
            Some("abc")
        );
    }
}
