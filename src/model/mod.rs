//! Wire-facing data model for the payments API.
//!
//! Every type here is deserialized fresh from a network response and treated
//! as immutable afterwards. Field names follow the API's camelCase JSON;
//! status enums are SCREAMING_SNAKE_CASE strings on the wire.

pub mod authentication;
pub mod payment_handle;

pub use authentication::{AuthStatus, AuthenticationResult, FinalizeResult};
pub use payment_handle::{CardSummary, HandleStatus, PaymentHandle, RefreshStatus, ReturnLink};
