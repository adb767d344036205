//! Configuration Types
//!
//! FTD client configuration types.

use secrecy::SecretString;
use std::time::Duration;

use crate::builders::FtdConfigBuilder;
use crate::error::{ConfigurationError, FtdError};

/// Default API path prefix for FDM-managed devices.
pub const DEFAULT_API_PREFIX: &str = "/api/fdm/latest";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wait before retrying a locked or scheduling-conflicted call.
pub const DEFAULT_RECOVERY_BACKOFF: Duration = Duration::from_secs(10);

/// FTD client configuration.
#[derive(Clone, Debug)]
pub struct FtdConfig {
    /// URL scheme, `https` unless talking to a plain-HTTP test endpoint.
    pub scheme: String,
    /// Management address of the device (IP or hostname).
    pub host: String,
    /// Management port, when not the standard 443.
    pub port: Option<u16>,
    /// Login credentials.
    pub credentials: Credentials,
    /// Verify the device TLS certificate. Self-signed appliances need `false`.
    pub verify_tls: bool,
    /// Proxy URL (`http://`, `https://` or `socks5://`).
    pub proxy: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
    /// API path prefix appended to the base URL.
    pub api_prefix: String,
    /// Recovery behaviour of the invocation layer.
    pub recovery: RecoveryPolicy,
}

impl FtdConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> FtdConfigBuilder {
        FtdConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FTDIP` (required): management address of the device
    /// - `FTDUSER` (required): username
    /// - `FTDPASS` (required): password
    /// - `FDMPORT` (optional): alternate management port
    /// - `VERIFY` (optional): any value enables TLS verification
    /// - `PROXIES` (optional): proxy URL
    /// - `FTD_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> Result<Self, FtdError> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| {
                FtdError::Configuration(ConfigurationError::MissingField {
                    field: name.to_string(),
                })
            })
        };

        let mut builder = FtdConfigBuilder::new()
            .host(required("FTDIP")?)
            .username(required("FTDUSER")?)
            .password(required("FTDPASS")?)
            .verify_tls(std::env::var("VERIFY").is_ok());

        if let Ok(port) = std::env::var("FDMPORT") {
            let port = port.parse::<u16>().map_err(|e| {
                FtdError::Configuration(ConfigurationError::InvalidEnvironment {
                    name: "FDMPORT".to_string(),
                    message: e.to_string(),
                })
            })?;
            builder = builder.port(port);
        }

        if let Ok(proxy) = std::env::var("PROXIES") {
            builder = builder.proxy(proxy);
        }

        if let Ok(timeout) = std::env::var("FTD_TIMEOUT") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                FtdError::Configuration(ConfigurationError::InvalidEnvironment {
                    name: "FTD_TIMEOUT".to_string(),
                    message: e.to_string(),
                })
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Base URL of the device, e.g. `https://10.0.0.1:8443`.
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }
}

/// Username/password pair used for the password grant.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Recovery behaviour of the invocation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Wait before retrying a call rejected with HTTP 423.
    pub lock_backoff: Duration,
    /// Wait before retrying a call that failed to schedule a deployment job.
    pub scheduling_backoff: Duration,
    /// Re-check provisioning after the first-boot bypass and fail fast if the
    /// device is still unprovisioned.
    pub verify_bypass: bool,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            lock_backoff: DEFAULT_RECOVERY_BACKOFF,
            scheduling_backoff: DEFAULT_RECOVERY_BACKOFF,
            verify_bypass: false,
        }
    }
}
