//! Device-level operations: CLI commands, system information, deployment and
//! file download.

use crate::core::HttpMethod;
use crate::error::{FtdError, FtdResult};
use crate::resilience::Invoker;
use crate::types::{CliCommand, CliCommandResult, DeploymentJob, SystemInformation};

pub const COMMAND_PATH: &str = "/action/command";
pub const SYSTEM_INFO_PATH: &str = "/operational/systeminfo/default";
pub const DEPLOY_PATH: &str = "/operational/deploy";
pub const DOWNLOAD_DISK_FILE_PATH: &str = "/action/downloaddiskfile";

/// Service for device-level operations.
pub struct SystemService<'a> {
    invoker: &'a Invoker,
}

impl<'a> SystemService<'a> {
    pub fn new(invoker: &'a Invoker) -> Self {
        Self { invoker }
    }

    /// Run a CLI command and return its output.
    pub async fn run_cli_command(&self, command: &str) -> FtdResult<Option<String>> {
        let body = &CliCommand::new(command);
        let result: Option<CliCommandResult> = self
            .invoker
            .invoke("run_cli_command", |api| async move {
                api.post(COMMAND_PATH, body).await
            })
            .await?;

        Ok(result.and_then(|r| r.command_output))
    }

    pub async fn system_information(&self) -> FtdResult<Option<SystemInformation>> {
        self.invoker
            .invoke("get_system_information", |api| async move {
                api.get(SYSTEM_INFO_PATH, Vec::new()).await
            })
            .await
    }

    /// Start a deployment of pending changes.
    ///
    /// Scheduling conflicts are retried once after the configured backoff.
    pub async fn deploy(&self) -> FtdResult<Option<DeploymentJob>> {
        self.invoker
            .invoke("deploy", |api| async move {
                let request = api.request(HttpMethod::Post, DEPLOY_PATH);
                api.execute(request).await?.json()
            })
            .await
    }

    /// Download a file from the device's disk-file directory.
    pub async fn download_disk_file(&self, file_name: &str) -> FtdResult<Option<String>> {
        let path = &format!("{}/{}", DOWNLOAD_DISK_FILE_PATH, file_name);
        self.invoker
            .invoke("download_disk_file", |api| async move {
                let request = api.request(HttpMethod::Get, path);
                Ok::<_, FtdError>(api.execute(request).await?.body)
            })
            .await
    }
}
