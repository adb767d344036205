//! FTD Error Types
//!
//! Error hierarchy for the FDM client, including the structured error body
//! returned by the device.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::ErrorKind;

/// Root error type for the FTD integration.
#[derive(Error, Debug)]
pub enum FtdError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Mapping error: {message}")]
    Mapping { message: String },

    #[error("Cannot read {path}: {message}")]
    File { path: String, message: String },

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// Fatal error enriched with the operation that produced it.
    #[error("{operation} failed ({kind}): {source}")]
    Operation {
        operation: String,
        kind: ErrorKind,
        #[source]
        source: Box<FtdError>,
    },
}

impl FtdError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "FTD_CONFIG",
            Self::Network(_) => "FTD_NETWORK",
            Self::Api(_) => "FTD_API",
            Self::Mapping { .. } => "FTD_MAPPING",
            Self::File { .. } => "FTD_FILE",
            Self::Token(_) => "FTD_TOKEN",
            Self::Setup(_) => "FTD_SETUP",
            Self::Operation { source, .. } => source.error_code(),
        }
    }

    /// Create a mapping error from any displayable cause.
    pub fn mapping(message: impl std::fmt::Display) -> Self {
        Self::Mapping {
            message: message.to_string(),
        }
    }

    /// Wrap this error with the identity of the failing operation.
    ///
    /// Already enriched errors are returned unchanged so nested invocations
    /// keep the innermost operation name.
    pub fn enrich(self, operation: &str, kind: ErrorKind) -> Self {
        match self {
            Self::Operation { .. } => self,
            other => Self::Operation {
                operation: operation.to_string(),
                kind,
                source: Box::new(other),
            },
        }
    }

    /// The error underneath any operation enrichment.
    pub fn root(&self) -> &FtdError {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status of the underlying API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Api(e) => Some(e.status),
            Self::Token(TokenError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Name of the operation this error was enriched with.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Operation { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Classified kind recorded at enrichment time.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Operation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid host: {host}")]
    InvalidHost { host: String },

    #[error("Unsupported URL scheme: {scheme}")]
    InvalidScheme { scheme: String },

    #[error("Invalid proxy URL: {url}")]
    InvalidProxy { url: String },

    #[error("Invalid environment variable {name}: {message}")]
    InvalidEnvironment { name: String, message: String },

    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Failed to read response body: {message}")]
    Body { message: String },
}

/// Token-related error.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token request rejected with HTTP {status}")]
    Rejected { status: u16, body: String },

    #[error("No access token has been acquired")]
    NotAcquired,

    #[error("No Authorization header available to build the API handle")]
    MissingAuthorization,
}

/// First-boot setup error.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Device is still unprovisioned after the setup bypass")]
    StillUnprovisioned,
}

/// Non-2xx response from the device, with its parsed error messages.
#[derive(Error, Debug, Clone)]
#[error("HTTP {status}{}", summary(.messages))]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Messages from the FDM error body, in the order received.
    pub messages: Vec<ApiMessage>,
    /// Raw response body.
    pub body: String,
}

fn summary(messages: &[ApiMessage]) -> String {
    match messages.first() {
        Some(m) if messages.len() > 1 => {
            format!(": {} (+{} more)", m.description, messages.len() - 1)
        }
        Some(m) => format!(": {}", m.description),
        None => String::new(),
    }
}

impl ApiError {
    /// Build from a raw status and body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let messages = parse_error_body(body)
            .map(|b| b.error.messages)
            .unwrap_or_default();

        Self {
            status,
            messages,
            body: body.to_string(),
        }
    }
}

/// A single message from an FDM error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// FDM error body envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FdmErrorBody {
    pub error: FdmErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FdmErrorDetail {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

/// Parse an FDM error body.
pub fn parse_error_body(body: &str) -> Option<FdmErrorBody> {
    serde_json::from_str(body).ok()
}

/// Result type for FTD operations.
pub type FtdResult<T> = Result<T, FtdError>;
