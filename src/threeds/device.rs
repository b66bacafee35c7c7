use crate::threeds::challenge::ChallengeParams;
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Configuration handed to the external device SDK before any flow starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub api_key: String,
    pub environment_label: String,
}

/// Failures raised by the external device SDK integration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device SDK configuration failed: {message}")]
    Configuration { message: String },

    #[error("device fingerprinting failed: {message}")]
    Fingerprinting { message: String },

    #[error("challenge launch failed: {message}")]
    ChallengeLaunch { message: String },
}

/// Terminal disposition reported by the device SDK's challenge runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCode {
    Success,
    Failure { message: String },
    Error { message: String },
    Cancel,
    Timeout,
    Unknown(String),
}

/// The single event a challenge run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub validated: bool,
    pub server_jwt: Option<String>,
    pub action: ActionCode,
}

/// Callback surface the device SDK invokes when a challenge finishes. The
/// SDK may fire it from any thread, possibly more than once.
pub trait ChallengeDelegate: Send + Sync {
    fn on_validation(&self, outcome: ValidationOutcome);
}

/// Seam to the vendor 3DS device SDK. Implementations wrap the real SDK on
/// device targets; tests script one.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Idempotent; safe to call before every flow.
    async fn configure(&self, params: &SessionParams) -> Result<(), DeviceError>;

    /// Runs device fingerprinting and returns the fingerprinting id the
    /// authentication request carries.
    async fn initiate_flow(&self, account_id: &str, card_bin: &str)
        -> Result<String, DeviceError>;

    /// Launches the challenge UI. Completion is reported through the
    /// delegate, not the return value.
    async fn start_challenge(
        &self,
        params: &ChallengeParams,
        delegate: std::sync::Arc<dyn ChallengeDelegate>,
    ) -> Result<(), DeviceError>;
}

/// Converts the delegate callback into one awaitable outcome.
///
/// The sender is consumed by the first event; later events are dropped with
/// a debug log so a misbehaving device SDK cannot double-settle a flow.
pub struct ChallengeBridge {
    sender: Mutex<Option<oneshot::Sender<ValidationOutcome>>>,
}

impl ChallengeBridge {
    pub fn new() -> (std::sync::Arc<Self>, oneshot::Receiver<ValidationOutcome>) {
        let (tx, rx) = oneshot::channel();
        (
            std::sync::Arc::new(Self {
                sender: Mutex::new(Some(tx)),
            }),
            rx,
        )
    }
}

impl ChallengeDelegate for ChallengeBridge {
    fn on_validation(&self, outcome: ValidationOutcome) {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!("challenge outcome arrived after the session stopped waiting");
                }
            }
            None => debug!("duplicate challenge outcome dropped"),
        }
    }
}
