use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a payment handle as reported by the payments API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandleStatus {
    Payable,
    Completed,
    Initiated,
    Processing,
    Failed,
    Expired,
}

impl HandleStatus {
    /// True when the handle token can be used for a payment right now.
    pub fn is_payable_now(self) -> bool {
        matches!(self, HandleStatus::Payable)
    }

    /// True when the handle can never become payable and polling is futile.
    pub fn is_terminal_failure(self) -> bool {
        matches!(self, HandleStatus::Failed | HandleStatus::Expired)
    }
}

impl std::fmt::Display for HandleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandleStatus::Payable => "PAYABLE",
            HandleStatus::Completed => "COMPLETED",
            HandleStatus::Initiated => "INITIATED",
            HandleStatus::Processing => "PROCESSING",
            HandleStatus::Failed => "FAILED",
            HandleStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", s)
    }
}

/// Card summary echoed back on a created handle. The network-token bin is
/// preferred over the raw bin when initiating step-up authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_token_bin: Option<String>,
}

impl CardSummary {
    /// Bin to use for step-up authentication, network-token bin first.
    pub fn preferred_bin(&self) -> Option<&str> {
        self.network_token_bin.as_deref().or(self.bin.as_deref())
    }
}

/// Rel-tagged navigation link attached to a handle, order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLink {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// A payment handle as returned by the create and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHandle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardSummary>,
    pub status: HandleStatus,
    pub merchant_ref_num: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_handle_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_link: Option<ReturnLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub return_links: Vec<ReturnLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentHandle {
    /// True when the backend demands a step-up redirect before the handle
    /// can become payable.
    pub fn requires_redirect(&self) -> bool {
        self.action.as_deref() == Some("REDIRECT")
    }
}

/// Result of polling a handle's status by token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    pub status: HandleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_handle_token: Option<String>,
}
