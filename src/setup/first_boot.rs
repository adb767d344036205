//! First-Boot Bypass
//!
//! Detects a device that never completed its setup wizard and skips the wizard
//! by activating evaluation licensing and marking the wizard complete.
//!
//! The calls here are single attempts. Re-authentication and best-effort
//! sequencing are layered on top by the invoker.

use crate::core::{ApiHandle, HttpMethod};
use crate::error::FtdResult;
use crate::types::{EasySetupStatus, SmartAgentConnection};

/// Setup-wizard status endpoint.
pub const SETUP_STATUS_PATH: &str = "/easysetup/easysetupstatus";

/// Smart-licensing connection endpoint.
pub const LICENSE_CONNECTION_PATH: &str = "/license/smartagentconnections";

/// Provisioning state of the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvisioningState {
    /// Setup wizard never run; configuration APIs answer 403.
    Unprovisioned,
    Ready,
}

impl ProvisioningState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Setup-wizard detection and bypass calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstBootBypass;

impl FirstBootBypass {
    pub fn new() -> Self {
        Self
    }

    /// Query the setup-wizard status.
    ///
    /// 403 means unprovisioned and 2xx means ready. Any other status is
    /// returned as an API error.
    pub async fn provisioning_state(&self, api: &ApiHandle) -> FtdResult<ProvisioningState> {
        let response = api
            .send(api.request(HttpMethod::Get, SETUP_STATUS_PATH))
            .await?;

        match response.status {
            403 => Ok(ProvisioningState::Unprovisioned),
            _ => response.error_for_status().map(|_| ProvisioningState::Ready),
        }
    }

    /// Step 1: register an evaluation-mode licensing connection.
    pub async fn register_evaluation_license(&self, api: &ApiHandle) -> FtdResult<()> {
        let request = api
            .request(HttpMethod::Post, LICENSE_CONNECTION_PATH)
            .json(&SmartAgentConnection::evaluation())?;
        api.execute(request).await?;
        Ok(())
    }

    /// Step 2: mark the setup wizard complete with no pending page.
    pub async fn complete_setup_wizard(&self, api: &ApiHandle) -> FtdResult<()> {
        let request = api
            .request(HttpMethod::Post, SETUP_STATUS_PATH)
            .json(&EasySetupStatus::completed())?;
        api.execute(request).await?;
        Ok(())
    }
}
