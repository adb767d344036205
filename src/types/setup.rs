//! First-boot setup payloads.

use serde::{Deserialize, Serialize};

/// Smart-licensing connection registration. An evaluation connection carries
/// no token and no version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAgentConnection {
    pub token: Option<String>,
    pub connection_type: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub version: Option<String>,
}

impl SmartAgentConnection {
    pub fn evaluation() -> Self {
        Self {
            token: None,
            connection_type: "EVALUATION".to_string(),
            object_type: "smartagentconnection".to_string(),
            version: None,
        }
    }
}

/// Setup-wizard status object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EasySetupStatus {
    pub task_complete: bool,
    pub next_page: Option<String>,
    pub current_page: Option<String>,
    #[serde(rename = "type")]
    pub object_type: String,
    pub version: Option<String>,
}

impl EasySetupStatus {
    /// Wizard marked complete with no pending page.
    pub fn completed() -> Self {
        Self {
            task_complete: true,
            next_page: None,
            current_page: None,
            object_type: "easysetupstatus".to_string(),
            version: None,
        }
    }
}
