//! Tokenization orchestrator.
//!
//! Drives one attempt end-to-end: create the payment handle, run step-up
//! authentication when the backend demands a redirect, then poll the handle
//! until it is payable. At most one attempt is in flight per client; a
//! second concurrent call fails fast without touching the network.

use crate::config::SdkConfig;
use crate::error::{CoreError, Correlation, SdkError, SdkResult};
use crate::model::{HandleStatus, PaymentHandle};
use crate::threeds::device::{DeviceSession, SessionParams};
use crate::threeds::session::{StepUpSession, ThreeDsOptions};
use crate::tokenize::api::Api;
use crate::tokenize::options::TokenizeOptions;
use crate::tokenize::poller::StatusPoller;
use crate::tokenize::request;
use crate::transport::{HttpTransport, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Clears the single-flight flag on every exit path, including cancellation.
struct AttemptGuard {
    flag: Arc<AtomicBool>,
}

impl AttemptGuard {
    /// Claims the flag; `None` when another attempt already holds it.
    fn acquire(flag: Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Entry point of the SDK. One instance per merchant integration; cheap to
/// clone handles internally, but tokenization itself is single-flight.
pub struct TokenizationClient {
    api: Api,
    device: Arc<dyn DeviceSession>,
    config: SdkConfig,
    correlation: Correlation,
    in_flight: Arc<AtomicBool>,
}

impl std::fmt::Debug for TokenizationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizationClient")
            .field("config", &self.config)
            .field("correlation", &self.correlation)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl TokenizationClient {
    /// Builds a client over the real HTTP transport. Fails with
    /// `SdkNotInitialized` when the configuration is unusable.
    pub fn new(config: SdkConfig, device: Arc<dyn DeviceSession>) -> SdkResult<Self> {
        let correlation = Correlation::new(config.correlation_scope);
        config.validate().map_err(|e| {
            SdkError::new(
                CoreError::NotInitialized {
                    message: e.to_string(),
                },
                correlation.client_id(),
            )
        })?;

        let transport = HttpTransport::new(
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_transport_retries,
        )
        .map_err(|e| {
            SdkError::new(
                CoreError::NotInitialized {
                    message: e.to_string(),
                },
                correlation.client_id(),
            )
        })?;

        Ok(Self::assemble(config, Arc::new(transport), device, correlation))
    }

    /// Builds a client over an injected transport. Used by tests and by
    /// hosts that bring their own HTTP stack.
    pub fn with_transport(
        config: SdkConfig,
        transport: Arc<dyn Transport>,
        device: Arc<dyn DeviceSession>,
    ) -> SdkResult<Self> {
        let correlation = Correlation::new(config.correlation_scope);
        config.validate().map_err(|e| {
            SdkError::new(
                CoreError::NotInitialized {
                    message: e.to_string(),
                },
                correlation.client_id(),
            )
        })?;
        Ok(Self::assemble(config, transport, device, correlation))
    }

    fn assemble(
        config: SdkConfig,
        transport: Arc<dyn Transport>,
        device: Arc<dyn DeviceSession>,
        correlation: Correlation,
    ) -> Self {
        let api = Api::new(transport, config.environment.base_url());
        Self {
            api,
            device,
            config,
            correlation,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stable id identifying this client instance in logs and errors.
    pub fn client_id(&self) -> &str {
        self.correlation.client_id()
    }

    /// Exchanges the supplied payment data for a payment handle token.
    pub async fn tokenize(&self, options: &TokenizeOptions) -> SdkResult<String> {
        let correlation_id = self.correlation.attempt_id();

        let _guard = AttemptGuard::acquire(self.in_flight.clone()).ok_or_else(|| {
            warn!(
                correlation_id = %correlation_id,
                "tokenize rejected, another attempt is in flight"
            );
            SdkError::new(CoreError::AlreadyInProgress, correlation_id.clone())
        })?;

        info!(
            correlation_id = %correlation_id,
            merchant_ref_num = %options.merchant_ref_num,
            payment_type = options.payment_method.method_name(),
            "tokenization attempt started"
        );

        let payload = request::build_handle_request(options);
        let handle = self
            .api
            .create_handle(&payload)
            .await
            .map_err(|e| SdkError::from_transport(e, correlation_id.clone()))?;

        info!(
            correlation_id = %correlation_id,
            handle_id = %handle.id,
            status = %handle.status,
            action = handle.action.as_deref().unwrap_or("-"),
            "payment handle created"
        );

        if handle.status.is_payable_now() || handle.status == HandleStatus::Completed {
            return self.handle_token(&handle, &correlation_id);
        }

        if handle.status.is_terminal_failure() || !handle.requires_redirect() {
            return Err(SdkError::new(
                CoreError::HandleCreationFailed {
                    status: handle.status.to_string(),
                },
                correlation_id,
            )
            .with_detail(format!("handle {}", handle.id)));
        }

        self.step_up(&handle, options, &correlation_id).await?;

        let token = self.handle_token(&handle, &correlation_id)?;
        let poller = StatusPoller::new(
            self.api.clone(),
            self.config.refresh_retries,
            Duration::from_secs(self.config.refresh_delay_secs),
        );
        poller.refresh(&token, &correlation_id).await
    }

    async fn step_up(
        &self,
        handle: &PaymentHandle,
        options: &TokenizeOptions,
        correlation_id: &str,
    ) -> SdkResult<()> {
        let account_id = handle
            .account_id
            .clone()
            .or_else(|| options.account_id.clone())
            .ok_or_else(|| {
                SdkError::new(
                    CoreError::GenericApi {
                        message: "step-up requested but no account id is available".to_string(),
                    },
                    correlation_id,
                )
            })?;

        let card_bin = handle
            .card
            .as_ref()
            .and_then(|c| c.preferred_bin().map(|b| b.to_string()))
            .or_else(|| options.card_bin())
            .ok_or_else(|| {
                SdkError::new(
                    CoreError::GenericApi {
                        message: "step-up requested but no card bin is available".to_string(),
                    },
                    correlation_id,
                )
            })?;

        let session = StepUpSession::new(
            self.api.clone(),
            self.device.clone(),
            SessionParams {
                api_key: self.config.api_key.clone(),
                environment_label: self.config.environment.label().to_string(),
            },
            Duration::from_secs(self.config.challenge_timeout_secs),
        );

        session
            .authenticate(
                &handle.id,
                &options.merchant_ref_num,
                &ThreeDsOptions {
                    account_id,
                    card_bin,
                    prefs: options.three_ds.clone(),
                },
                correlation_id,
            )
            .await
    }

    fn handle_token(&self, handle: &PaymentHandle, correlation_id: &str) -> SdkResult<String> {
        handle.payment_handle_token.clone().ok_or_else(|| {
            SdkError::new(
                CoreError::GenericApi {
                    message: format!("handle {} carries no token", handle.id),
                },
                correlation_id,
            )
        })
    }
}
