//! Token Types
//!
//! Payloads exchanged with the FDM token endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Grant type accepted by the FDM token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "revoke_token")]
    RevokeToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::RevokeToken => "revoke_token",
        }
    }
}

/// Password grant request body.
#[derive(Debug, Serialize)]
pub struct PasswordGrantRequest<'a> {
    pub grant_type: GrantType,
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> PasswordGrantRequest<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self {
            grant_type: GrantType::Password,
            username,
            password,
        }
    }
}

/// Revocation request body. The device expects the current token in both
/// fields.
#[derive(Debug, Serialize)]
pub struct RevokeTokenRequest<'a> {
    pub grant_type: GrantType,
    pub access_token: &'a str,
    pub token_to_revoke: &'a str,
}

impl<'a> RevokeTokenRequest<'a> {
    pub fn for_token(token: &'a str) -> Self {
        Self {
            grant_type: GrantType::RevokeToken,
            access_token: token,
            token_to_revoke: token,
        }
    }
}

/// Token grant returned by the device.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGrant {
    /// Bearer token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<u64>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// The token currently held by a session.
#[derive(Clone, Debug)]
pub struct ActiveToken {
    /// Parsed grant.
    pub grant: TokenGrant,
    /// When the grant was stored.
    pub acquired_at: DateTime<Utc>,
}

impl ActiveToken {
    pub fn new(grant: TokenGrant) -> Self {
        Self {
            grant,
            acquired_at: Utc::now(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.grant.access_token)
    }

    pub fn access_token(&self) -> &str {
        &self.grant.access_token
    }
}
