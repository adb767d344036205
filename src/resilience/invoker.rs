//! Invocation Wrapper
//!
//! Runs an operation against the session's API handle and, when it fails,
//! performs at most one recovery action before retrying it exactly once.
//!
//! ```text
//! EXECUTING -> SUCCESS
//!           -> CLASSIFYING -> SkipAsNoOp              -> SUCCESS (no value)
//!                          -> Propagate               -> TERMINAL_FAILURE
//!                          -> RECOVERING -> RETRYING  -> SUCCESS | TERMINAL_FAILURE
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{ApiHandle, SessionHandle, AUTHORIZATION};
use crate::error::{FtdError, FtdResult, SetupError, TokenError};
use crate::resilience::{ErrorClassifier, ErrorKind, RecoveryAction};
use crate::setup::FirstBootBypass;
use crate::token::{TokenManager, TokenOutcome};
use crate::types::RecoveryPolicy;

/// Resilient invoker shared by every remote operation of a client.
pub struct Invoker {
    session: SessionHandle,
    tokens: Arc<dyn TokenManager>,
    bypass: FirstBootBypass,
    classifier: ErrorClassifier,
    /// Serializes first-boot bypass sequences.
    setup_gate: Mutex<()>,
}

impl Invoker {
    pub fn new(
        session: SessionHandle,
        tokens: Arc<dyn TokenManager>,
        policy: RecoveryPolicy,
    ) -> Self {
        Self {
            session,
            tokens,
            bypass: FirstBootBypass::new(),
            classifier: ErrorClassifier::new(policy),
            setup_gate: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Invoke an operation with recovery.
    ///
    /// `call` receives the current API handle and may be called twice. Returns
    /// `Ok(None)` when the call was skipped as a duplicate-object no-op.
    pub async fn invoke<T, F, Fut>(&self, operation: &str, call: F) -> FtdResult<Option<T>>
    where
        F: Fn(ApiHandle) -> Fut,
        Fut: Future<Output = FtdResult<T>>,
    {
        self.run(operation, &call, true).await
    }

    /// Whether the device has completed its setup wizard.
    ///
    /// Runs with re-authentication on 401 but never triggers a bypass.
    pub fn is_provisioned(&self) -> BoxFuture<'_, FtdResult<bool>> {
        async move {
            let bypass = self.bypass;
            let state = self
                .run(
                    "is_provisioned",
                    &|api: ApiHandle| async move { bypass.provisioning_state(&api).await },
                    false,
                )
                .await?;
            Ok(state.is_some_and(|s| s.is_ready()))
        }
        .boxed()
    }

    /// Skip the setup wizard: activate evaluation licensing, then mark the
    /// wizard complete.
    ///
    /// Both steps are best-effort. Failures that survive recovery are logged
    /// and the sequence continues. With `verify_bypass` set, provisioning is
    /// re-checked afterwards. A call that waited for another bypass to finish
    /// re-checks provisioning first and returns early if the device is ready.
    pub fn bypass_first_boot(&self) -> BoxFuture<'_, FtdResult<()>> {
        async move {
            let _gate = match self.setup_gate.try_lock() {
                Ok(gate) => gate,
                Err(_) => {
                    let gate = self.setup_gate.lock().await;
                    if self.is_provisioned().await? {
                        tracing::debug!("Setup wizard already bypassed by another call");
                        return Ok(());
                    }
                    gate
                }
            };
            let bypass = self.bypass;

            if let Err(error) = self
                .run(
                    "register_evaluation_license",
                    &|api: ApiHandle| async move { bypass.register_evaluation_license(&api).await },
                    false,
                )
                .await
            {
                tracing::warn!(error = %error, "Failed to activate evaluation licensing");
            }

            if let Err(error) = self
                .run(
                    "complete_setup_wizard",
                    &|api: ApiHandle| async move { bypass.complete_setup_wizard(&api).await },
                    false,
                )
                .await
            {
                tracing::warn!(error = %error, "Failed to mark the setup wizard complete");
            }

            if self.classifier.policy().verify_bypass && !self.is_provisioned().await? {
                tracing::error!("Device is still unprovisioned after the setup wizard bypass");
                return Err(FtdError::Setup(SetupError::StillUnprovisioned));
            }

            Ok(())
        }
        .boxed()
    }

    async fn run<T, F, Fut>(
        &self,
        operation: &str,
        call: &F,
        allow_bypass: bool,
    ) -> FtdResult<Option<T>>
    where
        F: Fn(ApiHandle) -> Fut,
        Fut: Future<Output = FtdResult<T>>,
    {
        let api = self
            .api_handle()
            .await
            .map_err(|e| e.enrich(operation, ErrorKind::Unclassified))?;
        let used_token = api.authorization().map(str::to_string);

        let error = match call(api).await {
            Ok(value) => return Ok(Some(value)),
            Err(error) => error,
        };

        // Raised by a nested invocation that already gave up.
        if error.operation().is_some() {
            return Err(error);
        }

        let classified = self.classifier.classify_error(&error);
        let kind = classified.kind;

        match self.classifier.action_for(&classified) {
            RecoveryAction::Propagate => {
                tracing::error!(operation, kind = %kind, "Invoker called by {}, but we got an error: {}", operation, error);
                return Err(error.enrich(operation, kind));
            }
            RecoveryAction::SkipAsNoOp => {
                let description = classified
                    .matched_message()
                    .map(|m| m.description.as_str())
                    .unwrap_or_default();
                tracing::error!(operation, "{} Skipping...", description);
                return Ok(None);
            }
            RecoveryAction::ReauthenticateAndRetry => {
                tracing::error!(operation, "Invoker called by {}, but our token appears to be invalid: {}", operation, error);
                tracing::error!("Attempting to obtain a new token...");
                self.reauthenticate(used_token.as_deref())
                    .await
                    .map_err(|e| e.enrich(operation, kind))?;
                tracing::warn!(operation, "New token acquired. Now executing the original call to {}", operation);
            }
            RecoveryAction::BypassSetupAndRetry => {
                if !allow_bypass {
                    tracing::error!(operation, "Forbidden during setup handling: {}", error);
                    return Err(error.enrich(operation, kind));
                }

                match self.is_provisioned().await {
                    Ok(false) => {
                        tracing::warn!(
                            operation,
                            "{} was called but the setup wizard has not yet been executed. \
                             Skipping the setup wizard and activating an evaluation license.",
                            operation
                        );
                        self.bypass_first_boot()
                            .await
                            .map_err(|e| e.enrich(operation, kind))?;
                        tracing::warn!("Setup wizard and licensing stage appears to have been successful.");
                        tracing::warn!(operation, "Executing the original call to {}", operation);
                    }
                    Ok(true) => {
                        tracing::error!(operation, "There is a problem accessing the FTD's API: {}", error);
                        return Err(error.enrich(operation, kind));
                    }
                    Err(check) => {
                        tracing::error!(operation, error = %check, "Could not determine the provisioning state");
                        return Err(error.enrich(operation, kind));
                    }
                }
            }
            RecoveryAction::WaitAndRetry(delay) => {
                match kind {
                    ErrorKind::Locked => tracing::error!(
                        operation,
                        "We got a database locked response from the API. Waiting {:?} and then retrying.",
                        delay
                    ),
                    _ => tracing::error!(
                        operation,
                        "We failed to schedule the deployment job. Waiting {:?} and then retrying.",
                        delay
                    ),
                }
                tokio::time::sleep(delay).await;
            }
        }

        let api = self
            .api_handle()
            .await
            .map_err(|e| e.enrich(operation, kind))?;

        match call(api).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.operation().is_some() => Err(error),
            Err(error) => {
                let retry_kind = self.classifier.classify_error(&error).kind;
                tracing::error!(
                    operation,
                    kind = %retry_kind,
                    "Retry of {} failed after {} recovery: {}",
                    operation,
                    kind,
                    error
                );
                Err(error.enrich(operation, retry_kind))
            }
        }
    }

    /// Current API handle, built on first use.
    async fn api_handle(&self) -> FtdResult<ApiHandle> {
        if let Some(api) = self.session.read().await.api_handle() {
            return Ok(api);
        }
        self.session.write().await.build_api_handle()
    }

    /// Acquire a new token unless another call already replaced the one that
    /// was rejected.
    async fn reauthenticate(&self, rejected: Option<&str>) -> FtdResult<()> {
        let mut session = self.session.write().await;

        let current = session.headers().get(AUTHORIZATION).map(String::as_str);
        if current.is_some() && current != rejected {
            tracing::debug!("Token already refreshed by another call");
            return Ok(());
        }

        match self.tokens.acquire_token(&mut session).await? {
            TokenOutcome::Accepted => {
                if session.api_handle().is_none() {
                    session.build_api_handle()?;
                }
                Ok(())
            }
            TokenOutcome::Rejected(response) => Err(FtdError::Token(TokenError::Rejected {
                status: response.status,
                body: response.body,
            })),
        }
    }
}
