//! System and collection payloads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response of the unauthenticated `/api/versions` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersions {
    #[serde(default)]
    pub supported_versions: Vec<String>,
}

impl ApiVersions {
    /// Preferred version, the first one advertised.
    pub fn preferred(&self) -> Option<&str> {
        self.supported_versions.first().map(String::as_str)
    }
}

/// CLI command request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliCommand {
    pub command_input: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

impl CliCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command_input: command.into(),
            object_type: "Command".to_string(),
        }
    }
}

/// CLI command response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliCommandResult {
    #[serde(default)]
    pub command_output: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Device information from `/operational/systeminfo/default`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInformation {
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub platform_model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub vdb_version: Option<serde_json::Value>,
    #[serde(default)]
    pub sru_version: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Deployment job returned when a deployment is started.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub queued_time: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Paged collection returned by list endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemList<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Paging metadata.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub prev: Vec<String>,
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub pages: Option<u32>,
}

/// Query parameters for list endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub offset: u32,
    /// FDM filter expression, e.g. `name:obj-1.1.1.1` or `fts~1.1.1.1`.
    pub filter: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: 9999,
            offset: 0,
            filter: None,
        }
    }
}

impl ListParams {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// A `key:` filter with nothing to search on.
    pub fn has_empty_filter_value(&self) -> bool {
        match &self.filter {
            Some(filter) => filter
                .split_once(':')
                .map(|(_, value)| value.is_empty())
                .unwrap_or(false),
            None => false,
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ];
        if let Some(filter) = &self.filter {
            query.push(("filter".to_string(), filter.clone()));
        }
        query
    }
}
