//! FTD Client
//!
//! High-level client tying the session, token manager and invoker together.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

use crate::core::{
    ApiHandle, HttpMethod, HttpTransport, MultipartPart, ReqwestHttpTransport, SessionHandle,
    SessionState,
};
use crate::error::{FtdError, FtdResult, TokenError};
use crate::resilience::Invoker;
use crate::services::{ObjectKind, ObjectService, SystemService};
use crate::token::{DefaultTokenManager, TokenManager, TokenOutcome};
use crate::types::{ActiveToken, ApiVersions, FtdConfig};

/// Unauthenticated API version endpoint, relative to the base URL.
pub const API_VERSIONS_PATH: &str = "/api/versions";

/// Form field the device expects uploaded files in.
pub const UPLOAD_FIELD: &str = "fileToUpload";

/// Client for an FDM-managed Firepower Threat Defense device.
pub struct FtdClient {
    config: FtdConfig,
    tokens: Arc<dyn TokenManager>,
    invoker: Invoker,
}

impl FtdClient {
    /// Create a client with the reqwest transport. No request is made until
    /// [`login`](Self::login).
    pub fn new(config: FtdConfig) -> FtdResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::from_config(&config)?);
        Ok(Self::with_components(
            config,
            transport,
            Arc::new(DefaultTokenManager::new()),
        ))
    }

    /// Create a client with custom implementations.
    pub fn with_components(
        config: FtdConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenManager>,
    ) -> Self {
        let session = SessionState::new(&config, transport).into_handle();
        let invoker = Invoker::new(session, tokens.clone(), config.recovery.clone());
        Self {
            config,
            tokens,
            invoker,
        }
    }

    /// Create a client and log in.
    pub async fn connect(config: FtdConfig) -> FtdResult<Self> {
        let client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    pub fn config(&self) -> &FtdConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        self.invoker.session()
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Acquire a token and (re)build the API handle.
    #[instrument(skip(self), fields(host = %self.config.host))]
    pub async fn login(&self) -> FtdResult<()> {
        let mut session = self.session().write().await;

        match self.tokens.acquire_token(&mut session).await? {
            TokenOutcome::Accepted => {
                session.build_api_handle()?;
                tracing::info!("Logged in to the FTD");
                Ok(())
            }
            TokenOutcome::Rejected(response) => Err(FtdError::Token(TokenError::Rejected {
                status: response.status,
                body: response.body,
            })),
        }
    }

    /// Revoke the current token.
    ///
    /// The token stays in the session, so the next call exercises the
    /// re-authentication path. A rejected revocation is returned, not raised.
    #[instrument(skip(self), fields(host = %self.config.host))]
    pub async fn logout(&self) -> FtdResult<TokenOutcome> {
        let session = self.session().read().await;
        self.tokens.revoke_token(&session).await
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Option<ActiveToken> {
        self.session().read().await.token().cloned()
    }

    /// Preferred API version. Does not require authentication.
    #[instrument(skip(self), fields(host = %self.config.host))]
    pub async fn api_version(&self) -> FtdResult<Option<String>> {
        let (request, transport) = {
            let session = self.session().read().await;
            (
                session.root_request(HttpMethod::Get, API_VERSIONS_PATH),
                session.transport(),
            )
        };

        let versions: ApiVersions = transport.send(request).await?.error_for_status()?.json()?;
        Ok(versions.preferred().map(str::to_string))
    }

    pub async fn is_provisioned(&self) -> FtdResult<bool> {
        self.invoker.is_provisioned().await
    }

    /// Skip the first-boot setup wizard.
    #[instrument(skip(self), fields(host = %self.config.host))]
    pub async fn bypass_first_boot(&self) -> FtdResult<()> {
        self.invoker.bypass_first_boot().await
    }

    /// Run any operation through the recovering invoker.
    pub async fn invoke<T, F, Fut>(&self, operation: &str, call: F) -> FtdResult<Option<T>>
    where
        F: Fn(ApiHandle) -> Fut,
        Fut: Future<Output = FtdResult<T>>,
    {
        self.invoker.invoke(operation, call).await
    }

    pub fn objects(&self, kind: ObjectKind) -> ObjectService<'_> {
        ObjectService::new(&self.invoker, kind)
    }

    pub fn system(&self) -> SystemService<'_> {
        SystemService::new(&self.invoker)
    }

    /// POST to an endpoint outside the object surface with the session
    /// headers. An empty response body yields an empty JSON object.
    pub async fn post(&self, endpoint: &str, body: Option<&Value>) -> FtdResult<Value> {
        self.post_with(endpoint, body, None, None).await
    }

    /// Upload a file, e.g. an upgrade package or a backup.
    pub async fn upload_file(&self, endpoint: &str, file: &Path) -> FtdResult<Value> {
        self.post_with(endpoint, None, Some(file), None).await
    }

    /// Raw POST.
    ///
    /// With `file`, the file is sent as the `fileToUpload` part of a
    /// multipart form and `body` is ignored. `headers`, when given, are sent
    /// instead of the session headers.
    #[instrument(skip(self, body, headers), fields(host = %self.config.host))]
    pub async fn post_with(
        &self,
        endpoint: &str,
        body: Option<&Value>,
        file: Option<&Path>,
        headers: Option<&HashMap<String, String>>,
    ) -> FtdResult<Value> {
        let upload = match file {
            Some(file) => Some(upload_part(file).await?),
            None => None,
        };

        let (mut request, transport) = {
            let session = self.session().read().await;
            (
                session.request(HttpMethod::Post, endpoint),
                session.transport(),
            )
        };
        if let Some(headers) = headers {
            request.headers = headers.clone();
        }
        request = match (upload, body) {
            (Some(part), _) => request.part(part),
            (None, Some(body)) => request.json(body)?,
            (None, None) => request,
        };

        let response = transport.send(request).await?.error_for_status()?;
        if response.body.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        response.json()
    }
}

async fn upload_part(file: &Path) -> FtdResult<MultipartPart> {
    let data = tokio::fs::read(file).await.map_err(|e| FtdError::File {
        path: file.display().to_string(),
        message: e.to_string(),
    })?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(MultipartPart::File {
        name: UPLOAD_FIELD.to_string(),
        file_name,
        content_type: "application/octet-stream".to_string(),
        data,
    })
}
