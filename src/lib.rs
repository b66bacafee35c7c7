//! Client-side payment tokenization SDK.
//!
//! Exchanges cardholder/payment data for a short-lived opaque payment handle
//! token usable by the server-side payments API, transparently performing
//! 3-D Secure step-up authentication when the backend demands it.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod threeds;
pub mod tokenize;
pub mod transport;

pub use config::{Environment, LogFormat, LoggingConfig, SdkConfig};
pub use error::{CoreError, Correlation, CorrelationScope, ErrorKind, SdkError, SdkResult, ThreeDsError};
pub use model::{AuthStatus, AuthenticationResult, FinalizeResult, HandleStatus, PaymentHandle, RefreshStatus};
pub use threeds::challenge::ChallengeParams;
pub use threeds::device::{
    ActionCode, ChallengeBridge, ChallengeDelegate, DeviceError, DeviceSession, SessionParams,
    ValidationOutcome,
};
pub use threeds::session::{AuthPhase, StepUpSession, ThreeDsOptions};
pub use tokenize::options::{CardDetails, PaymentMethodPayload, ThreeDsPreferences, TokenizeOptions};
pub use tokenize::orchestrator::TokenizationClient;
pub use transport::{Method, Transport, TransportError};
