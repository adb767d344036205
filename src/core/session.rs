//! Session State
//!
//! Connection details, credentials, the active token and the authenticated
//! API handle of one client instance.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::core::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{FtdError, TokenError};
use crate::types::{ActiveToken, Credentials, FtdConfig};

/// Name of the bearer header.
pub const AUTHORIZATION: &str = "authorization";

/// Shared, lock-guarded session. Token refresh and setup bypass take the write
/// lock; operations only snapshot an [`ApiHandle`] under the read lock.
pub type SessionHandle = Arc<RwLock<SessionState>>;

/// Mutable state of one client instance.
pub struct SessionState {
    base_url: String,
    api_prefix: String,
    credentials: Credentials,
    token: Option<ActiveToken>,
    headers: HashMap<String, String>,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
    proxy: Option<String>,
    api: Option<ApiHandle>,
}

impl SessionState {
    pub fn new(config: &FtdConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            base_url: config.base_url(),
            api_prefix: config.api_prefix.clone(),
            credentials: config.credentials.clone(),
            token: None,
            headers,
            transport,
            timeout: config.timeout,
            proxy: config.proxy.clone(),
            api: None,
        }
    }

    /// Wrap into a shareable handle.
    pub fn into_handle(self) -> SessionHandle {
        Arc::new(RwLock::new(self))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL joined with the API prefix.
    pub fn api_root(&self) -> String {
        format!("{}{}", self.base_url, self.api_prefix)
    }

    /// Absolute URL of an API path.
    pub fn api_url(&self, path: &str) -> String {
        join(&self.api_root(), path)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> Option<&ActiveToken> {
        self.token.as_ref()
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    /// Request against an API path carrying the session headers.
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.api_url(path))
            .headers(&self.headers)
            .timeout(self.timeout)
    }

    /// Request against a path outside the API prefix (e.g. `/api/versions`).
    pub fn root_request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, join(&self.base_url, path))
            .headers(&self.headers)
            .timeout(self.timeout)
    }

    /// The authenticated handle, if one has been built.
    pub fn api_handle(&self) -> Option<ApiHandle> {
        self.api.clone()
    }

    /// Build (or rebuild) the authenticated handle from a snapshot of the
    /// session headers.
    pub fn build_api_handle(&mut self) -> Result<ApiHandle, FtdError> {
        if !self.headers.contains_key(AUTHORIZATION) {
            tracing::error!("API handle requested but no auth token is present");
            return Err(FtdError::Token(TokenError::MissingAuthorization));
        }

        let handle = ApiHandle {
            root: self.api_root(),
            headers: self.headers.clone(),
            transport: self.transport.clone(),
            timeout: self.timeout,
        };
        self.api = Some(handle.clone());
        Ok(handle)
    }

    /// Drop the bearer header. The raw grant is kept for revocation.
    pub(crate) fn clear_authorization(&mut self) -> bool {
        self.headers.remove(AUTHORIZATION).is_some()
    }

    /// Install a new token in the session headers and in any existing handle.
    pub(crate) fn install_token(&mut self, token: ActiveToken) {
        let bearer = token.bearer_header();
        self.headers.insert(AUTHORIZATION.to_string(), bearer.clone());
        if let Some(api) = self.api.as_mut() {
            api.headers.insert(AUTHORIZATION.to_string(), bearer);
        }
        self.token = Some(token);
    }
}

fn join(root: &str, path: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Authenticated sub-client used by resource operations.
///
/// Holds a copy of the session headers taken when it was built; the token
/// manager updates it in place on re-authentication.
#[derive(Clone)]
pub struct ApiHandle {
    root: String,
    headers: HashMap<String, String>,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl ApiHandle {
    /// Bearer header this handle sends.
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).map(String::as_str)
    }

    pub fn url(&self, path: &str) -> String {
        join(&self.root, path)
    }

    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.url(path))
            .headers(&self.headers)
            .timeout(self.timeout)
    }

    /// Send a request without interpreting the status.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FtdError> {
        self.transport.send(request).await
    }

    /// Send a request, turning non-2xx responses into API errors.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FtdError> {
        self.send(request).await?.error_for_status()
    }

    /// GET and deserialize.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, FtdError> {
        let request = self.request(HttpMethod::Get, path).query(query);
        self.execute(request).await?.json()
    }

    /// POST a JSON body and deserialize the response.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FtdError> {
        let request = self.request(HttpMethod::Post, path).json(body)?;
        self.execute(request).await?.json()
    }

    /// PUT a JSON body and deserialize the response.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FtdError> {
        let request = self.request(HttpMethod::Put, path).json(body)?;
        self.execute(request).await?.json()
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), FtdError> {
        let request = self.request(HttpMethod::Delete, path);
        self.execute(request).await?;
        Ok(())
    }
}
