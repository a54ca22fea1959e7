//! Generic HTTP client capability for talking to an IQ server.
//!
//! The typed REST bindings live elsewhere; everything they need from the
//! transport is `request(method, endpoint, body) -> (status, body)`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{IqError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw response from the remote server.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as lossy UTF-8, for error messages and display.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal transport contract used by REST bindings.
///
/// A non-2xx status is not an error; only transport failures are.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(&self, method: Method, endpoint: &str, body: Option<Vec<u8>>)
    -> Result<HttpResponse>;

    async fn get(&self, endpoint: &str) -> Result<HttpResponse> {
        self.request(Method::GET, endpoint, None).await
    }

    async fn post(&self, endpoint: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    async fn put(&self, endpoint: &str, body: Vec<u8>) -> Result<HttpResponse> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    async fn delete(&self, endpoint: &str) -> Result<HttpResponse> {
        self.request(Method::DELETE, endpoint, None).await
    }
}

/// Basic-auth credentials for an IQ server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// reqwest-backed [`HttpClient`] bound to a base URL.
#[derive(Debug, Clone)]
pub struct IqClient {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    default_headers: Vec<(String, String)>,
}

impl IqClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| IqError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(IqError::InvalidUrl(format!(
                "Unsupported scheme: {}",
                base_url.scheme()
            )));
        }

        // Relative endpoints are joined onto the base path, which requires a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
            default_headers: Vec::new(),
        })
    }

    /// Authenticates every request with HTTP basic auth.
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password,
        });
        self
    }

    /// Adds a header sent with every request unless the request sets the same
    /// header itself.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint such as `/api/v2/applications` against the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| IqError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }

    /// Sends a request with extra per-request headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.client.request(method.clone(), url);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            );
        }
        for (name, value) in &self.default_headers {
            if headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!("{} {} -> {}", method, endpoint, status);
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for IqClient {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        self.request_with_headers(method, endpoint, body, &[]).await
    }
}
