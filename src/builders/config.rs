//! Configuration Builder
//!
//! Fluent builder for FTD client configuration.

use secrecy::SecretString;
use std::time::Duration;

use crate::error::{ConfigurationError, FtdError};
use crate::types::{
    Credentials, FtdConfig, RecoveryPolicy, DEFAULT_API_PREFIX, DEFAULT_TIMEOUT,
};

/// FTD configuration builder.
#[derive(Default)]
pub struct FtdConfigBuilder {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<SecretString>,
    verify_tls: bool,
    proxy: Option<String>,
    timeout: Duration,
    api_prefix: Option<String>,
    recovery: RecoveryPolicy,
}

impl FtdConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self {
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
            ..Default::default()
        }
    }

    /// Set the management address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the URL scheme (default `https`).
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set an alternate management port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the API path prefix.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set the full recovery policy.
    pub fn recovery(mut self, policy: RecoveryPolicy) -> Self {
        self.recovery = policy;
        self
    }

    /// Set the wait used for locked and scheduling-conflicted calls.
    pub fn recovery_backoff(mut self, backoff: Duration) -> Self {
        self.recovery.lock_backoff = backoff;
        self.recovery.scheduling_backoff = backoff;
        self
    }

    /// Re-check provisioning after a first-boot bypass.
    pub fn verify_bypass(mut self, verify: bool) -> Self {
        self.recovery.verify_bypass = verify;
        self
    }

    /// Build the FTD configuration.
    pub fn build(self) -> Result<FtdConfig, FtdError> {
        let host = self.host.ok_or_else(|| {
            FtdError::Configuration(ConfigurationError::MissingField {
                field: "host".to_string(),
            })
        })?;

        if host.is_empty() || host.contains('/') {
            return Err(FtdError::Configuration(ConfigurationError::InvalidHost {
                host,
            }));
        }

        let username = self.username.ok_or_else(|| {
            FtdError::Configuration(ConfigurationError::MissingField {
                field: "username".to_string(),
            })
        })?;

        let password = self.password.ok_or_else(|| {
            FtdError::Configuration(ConfigurationError::MissingField {
                field: "password".to_string(),
            })
        })?;

        if let Some(proxy) = &self.proxy {
            if url::Url::parse(proxy).is_err() {
                return Err(FtdError::Configuration(ConfigurationError::InvalidProxy {
                    url: proxy.clone(),
                }));
            }
        }

        let api_prefix = self
            .api_prefix
            .map(|p| format!("/{}", p.trim_matches('/')))
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());

        let scheme = self.scheme.unwrap_or_else(|| "https".to_string());
        if scheme != "https" && scheme != "http" {
            return Err(FtdError::Configuration(ConfigurationError::InvalidScheme {
                scheme,
            }));
        }

        Ok(FtdConfig {
            scheme,
            host,
            port: self.port,
            credentials: Credentials { username, password },
            verify_tls: self.verify_tls,
            proxy: self.proxy,
            timeout: self.timeout,
            api_prefix,
            recovery: self.recovery,
        })
    }
}

/// Create a new FTD configuration builder.
pub fn ftd_config() -> FtdConfigBuilder {
    FtdConfigBuilder::new()
}
