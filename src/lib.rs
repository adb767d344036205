//! FTD Integration Module
//!
//! Client for the device-management API of FDM-managed Firepower Threat
//! Defense appliances, built around a resilient invocation layer.
//!
//! # Features
//!
//! - Password-grant token acquisition and revocation
//! - Transparent re-authentication when a token is rejected (401)
//! - First-boot setup wizard bypass when the device is unprovisioned (403)
//! - Duplicate-object errors (422) treated as no-op success
//! - Fixed backoff and single retry for database locks (423) and deployment
//!   scheduling conflicts
//! - Fatal errors enriched with the failing operation's name
//!
//! # Example
//!
//! ```rust,ignore
//! use ftd_integration::{ftd_config, FtdClient, ListParams, ObjectKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ftd_config()
//!         .host("192.168.45.45")
//!         .username("admin")
//!         .password("Admin123")
//!         .verify_tls(false)
//!         .build()?;
//!
//!     let client = FtdClient::connect(config).await?;
//!
//!     let created: Option<serde_json::Value> = client
//!         .objects(ObjectKind::Network)
//!         .create(&serde_json::json!({
//!             "name": "obj-1.1.1.1",
//!             "subType": "HOST",
//!             "value": "1.1.1.1",
//!             "type": "networkobject"
//!         }))
//!         .await?;
//!
//!     // `None` means the object already existed.
//!     println!("{:?}", created);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration and payload types
//! - `error`: error hierarchy and FDM error bodies
//! - `core`: HTTP transport and session state
//! - `token`: token acquisition and revocation
//! - `setup`: first-boot detection and bypass
//! - `resilience`: error classification and the recovering invoker
//! - `services`: object collections and device-level operations
//! - `builders`: fluent configuration builder
//! - `client`: high-level client

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod resilience;
pub mod services;
pub mod setup;
pub mod token;
pub mod types;

pub use client::{FtdClient, API_VERSIONS_PATH, UPLOAD_FIELD};

pub use builders::{ftd_config, FtdConfigBuilder};

pub use error::{
    parse_error_body, ApiError, ApiMessage, ConfigurationError, FdmErrorBody, FtdError,
    FtdResult, NetworkError, SetupError, TokenError,
};

pub use types::{
    ActiveToken, ApiVersions, CliCommand, CliCommandResult, Credentials, DeploymentJob,
    EasySetupStatus, FtdConfig, ItemList, ListParams, Paging, RecoveryPolicy,
    SmartAgentConnection, SystemInformation, TokenGrant,
};

pub use core::{
    ApiHandle, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    MultipartPart, ReqwestHttpTransport, SessionHandle, SessionState,
};

pub use token::{DefaultTokenManager, MockTokenManager, TokenManager, TokenOutcome};

pub use setup::{FirstBootBypass, ProvisioningState};

pub use resilience::{ClassifiedError, ErrorClassifier, ErrorKind, Invoker, RecoveryAction};

pub use services::{ObjectKind, ObjectService, SystemService};
