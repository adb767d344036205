//! Error Classification
//!
//! Maps a failed call to an [`ErrorKind`] and the single [`RecoveryAction`]
//! the invoker will attempt for it.

use std::fmt;
use std::time::Duration;

use crate::error::{ApiMessage, FtdError};
use crate::types::RecoveryPolicy;

/// 422 message codes meaning the object already exists.
pub const DUPLICATE_CODES: [&str; 4] = [
    "duplicateName",
    "duplicateSyslogServerIPAddressAndPortNumber",
    "manualNatDuplicateRule",
    "objectNatDupRuleWithSameOrigNetwork",
];

/// 422 description returned when a deployment job could not be scheduled.
pub const SCHEDULING_FAILURE: &str = "Failed to schedule deployment job";

/// Kind of a failed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    UnprocessableDuplicate,
    UnprocessableSchedulingConflict,
    UnprocessableOther,
    SchemaMappingError,
    Locked,
    Unclassified,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::UnprocessableDuplicate => "UnprocessableDuplicate",
            Self::UnprocessableSchedulingConflict => "UnprocessableSchedulingConflict",
            Self::UnprocessableOther => "UnprocessableOther",
            Self::SchemaMappingError => "SchemaMappingError",
            Self::Locked => "Locked",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call with its kind, status and FDM messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// HTTP status, absent for mapping and transport failures.
    pub status: Option<u16>,
    pub messages: Vec<ApiMessage>,
}

impl ClassifiedError {
    /// The message that decided a 422 classification, if any.
    pub fn matched_message(&self) -> Option<&ApiMessage> {
        match self.kind {
            ErrorKind::UnprocessableDuplicate => self
                .messages
                .iter()
                .find(|m| DUPLICATE_CODES.contains(&m.code.as_str())),
            ErrorKind::UnprocessableSchedulingConflict => self
                .messages
                .iter()
                .find(|m| m.description == SCHEDULING_FAILURE),
            _ => None,
        }
    }
}

/// Corrective step for a classified error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryAction {
    ReauthenticateAndRetry,
    /// Bypass the setup wizard, but only if the device is unprovisioned.
    BypassSetupAndRetry,
    SkipAsNoOp,
    WaitAndRetry(Duration),
    Propagate,
}

impl RecoveryAction {
    /// Whether the action ends with a second attempt of the operation.
    pub fn retries(&self) -> bool {
        matches!(
            self,
            Self::ReauthenticateAndRetry | Self::BypassSetupAndRetry | Self::WaitAndRetry(_)
        )
    }
}

/// Total mapping from failures to recovery actions.
#[derive(Clone, Debug, Default)]
pub struct ErrorClassifier {
    policy: RecoveryPolicy,
}

impl ErrorClassifier {
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RecoveryPolicy {
        &self.policy
    }

    /// Classify an HTTP status and the messages of its error body.
    ///
    /// For 422 every message is scanned in order and the first one that is a
    /// duplicate or a scheduling failure decides the kind.
    pub fn classify(&self, status: u16, messages: &[ApiMessage]) -> ClassifiedError {
        let kind = match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            422 => classify_unprocessable(messages),
            423 => ErrorKind::Locked,
            _ => ErrorKind::Unclassified,
        };

        ClassifiedError {
            kind,
            status: Some(status),
            messages: messages.to_vec(),
        }
    }

    /// Classify any client error.
    pub fn classify_error(&self, error: &FtdError) -> ClassifiedError {
        match error.root() {
            FtdError::Api(api) => self.classify(api.status, &api.messages),
            FtdError::Mapping { .. } => ClassifiedError {
                kind: ErrorKind::SchemaMappingError,
                status: None,
                messages: Vec::new(),
            },
            other => ClassifiedError {
                kind: ErrorKind::Unclassified,
                status: other.status(),
                messages: Vec::new(),
            },
        }
    }

    /// Recovery action for a classified error.
    pub fn action_for(&self, classified: &ClassifiedError) -> RecoveryAction {
        match classified.kind {
            ErrorKind::Unauthorized => RecoveryAction::ReauthenticateAndRetry,
            ErrorKind::Forbidden => RecoveryAction::BypassSetupAndRetry,
            ErrorKind::UnprocessableDuplicate => RecoveryAction::SkipAsNoOp,
            ErrorKind::UnprocessableSchedulingConflict => {
                RecoveryAction::WaitAndRetry(self.policy.scheduling_backoff)
            }
            ErrorKind::Locked => RecoveryAction::WaitAndRetry(self.policy.lock_backoff),
            ErrorKind::UnprocessableOther
            | ErrorKind::SchemaMappingError
            | ErrorKind::Unclassified => RecoveryAction::Propagate,
        }
    }
}

fn classify_unprocessable(messages: &[ApiMessage]) -> ErrorKind {
    for message in messages {
        if DUPLICATE_CODES.contains(&message.code.as_str()) {
            return ErrorKind::UnprocessableDuplicate;
        }
        if message.description == SCHEDULING_FAILURE {
            return ErrorKind::UnprocessableSchedulingConflict;
        }
    }
    ErrorKind::UnprocessableOther
}
