//! Tokenization pipeline: options, request assembly, endpoint wrappers,
//! status polling and the orchestrator tying them together.

pub mod api;
pub mod options;
pub mod orchestrator;
pub mod poller;
pub mod request;

pub use api::Api;
pub use options::{CardDetails, PaymentMethodPayload, ThreeDsPreferences, TokenizeOptions};
pub use orchestrator::TokenizationClient;
pub use poller::StatusPoller;
