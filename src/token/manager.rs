//! Token Manager
//!
//! Acquires and revokes FDM bearer tokens through the password grant. All
//! writes to the session's token go through this module.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::core::{HttpMethod, HttpResponse, SessionState};
use crate::error::{FtdError, TokenError};
use crate::types::{ActiveToken, PasswordGrantRequest, RevokeTokenRequest, TokenGrant};

/// Token endpoint, relative to the API prefix.
pub const TOKEN_PATH: &str = "/fdm/token";

/// Result of a token-endpoint exchange.
///
/// A rejected exchange is not an error: the raw response is handed back so the
/// caller can inspect it.
#[derive(Debug, Clone)]
pub enum TokenOutcome {
    Accepted,
    Rejected(HttpResponse),
}

impl TokenOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Token manager interface.
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Drop the current bearer header and request a fresh token.
    async fn acquire_token(&self, session: &mut SessionState) -> Result<TokenOutcome, FtdError>;

    /// Revoke the current token. The token stays in the session.
    async fn revoke_token(&self, session: &SessionState) -> Result<TokenOutcome, FtdError>;
}

/// Default token manager talking to the device token endpoint.
#[derive(Debug, Default, Clone)]
pub struct DefaultTokenManager;

impl DefaultTokenManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenManager for DefaultTokenManager {
    async fn acquire_token(&self, session: &mut SessionState) -> Result<TokenOutcome, FtdError> {
        if session.clear_authorization() {
            tracing::debug!("Existing Authorization token found. Deleting...");
        }

        let credentials = session.credentials();
        let body = PasswordGrantRequest::new(
            &credentials.username,
            credentials.password.expose_secret(),
        );
        let request = session.request(HttpMethod::Post, TOKEN_PATH).json(&body)?;

        let response = session.transport().send(request).await?;

        if !response.is_success() {
            tracing::error!(
                status = response.status,
                "Failed to acquire a token from the FTD. Check your credentials and try again."
            );
            return Ok(TokenOutcome::Rejected(response));
        }

        let grant: TokenGrant = response.json()?;
        session.install_token(ActiveToken::new(grant));
        tracing::debug!("Token successfully acquired");

        Ok(TokenOutcome::Accepted)
    }

    async fn revoke_token(&self, session: &SessionState) -> Result<TokenOutcome, FtdError> {
        let token = session
            .token()
            .ok_or(FtdError::Token(TokenError::NotAcquired))?;

        let body = RevokeTokenRequest::for_token(token.access_token());
        let request = session.request(HttpMethod::Post, TOKEN_PATH).json(&body)?;

        let response = session.transport().send(request).await?;

        if response.is_success() {
            tracing::warn!("Logout successful. The API token is no longer valid.");
            Ok(TokenOutcome::Accepted)
        } else {
            tracing::error!(status = response.status, "Failed to log out of the FTD.");
            Ok(TokenOutcome::Rejected(response))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock token manager for testing.
///
/// Each acquisition installs `mock-token-<n>` without touching the network.
#[derive(Default)]
pub struct MockTokenManager {
    acquire_count: Mutex<usize>,
    revoke_count: Mutex<usize>,
    next_rejection: Mutex<Option<HttpResponse>>,
}

impl MockTokenManager {
    /// Create new mock token manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next acquisition with this response.
    pub fn reject_next(&self, response: HttpResponse) -> &Self {
        *lock(&self.next_rejection) = Some(response);
        self
    }

    /// Number of acquisitions performed.
    pub fn acquire_count(&self) -> usize {
        *lock(&self.acquire_count)
    }

    /// Number of revocations performed.
    pub fn revoke_count(&self) -> usize {
        *lock(&self.revoke_count)
    }
}

#[async_trait]
impl TokenManager for MockTokenManager {
    async fn acquire_token(&self, session: &mut SessionState) -> Result<TokenOutcome, FtdError> {
        let n = {
            let mut count = lock(&self.acquire_count);
            *count += 1;
            *count
        };

        session.clear_authorization();

        if let Some(response) = lock(&self.next_rejection).take() {
            return Ok(TokenOutcome::Rejected(response));
        }

        session.install_token(ActiveToken::new(TokenGrant {
            access_token: format!("mock-token-{}", n),
            token_type: "Bearer".to_string(),
            expires_in: Some(1800),
            refresh_token: None,
            refresh_expires_in: None,
            extra: HashMap::new(),
        }));

        Ok(TokenOutcome::Accepted)
    }

    async fn revoke_token(&self, session: &SessionState) -> Result<TokenOutcome, FtdError> {
        session
            .token()
            .ok_or(FtdError::Token(TokenError::NotAcquired))?;
        *lock(&self.revoke_count) += 1;
        Ok(TokenOutcome::Accepted)
    }
}
