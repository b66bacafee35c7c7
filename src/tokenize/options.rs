use serde::{Deserialize, Serialize};

/// Cardholder data collected by the merchant application. Never logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_num: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
}

impl CardDetails {
    /// First six digits of the PAN, used to route step-up authentication
    /// when the backend does not echo a bin on the created handle.
    pub fn bin(&self) -> Option<String> {
        let digits: String = self.card_num.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 6 {
            Some(digits[..6].to_string())
        } else {
            None
        }
    }
}

/// Per-attempt step-up preferences forwarded to the authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDsPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_category: Option<String>,
}

/// The payment instrument being tokenized. Card carries the full detail;
/// wallet and peer-payment are minimal shells routed by identifier only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodPayload {
    Card(CardDetails),
    Wallet { wallet_id: String },
    PeerPayment { recipient_ref: String },
}

impl PaymentMethodPayload {
    pub fn method_name(&self) -> &'static str {
        match self {
            PaymentMethodPayload::Card(_) => "CARD",
            PaymentMethodPayload::Wallet { .. } => "WALLET",
            PaymentMethodPayload::PeerPayment { .. } => "PEER_PAYMENT",
        }
    }
}

/// Everything the merchant supplies for one tokenization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub merchant_ref_num: String,
    pub amount: u64,
    pub currency_code: String,
    pub payment_method: PaymentMethodPayload,
    pub account_id: Option<String>,
    pub customer_ip: Option<String>,
    pub three_ds: Option<ThreeDsPreferences>,
}

impl TokenizeOptions {
    /// Bin of the underlying card, when the instrument is a card.
    pub fn card_bin(&self) -> Option<String> {
        match &self.payment_method {
            PaymentMethodPayload::Card(card) => card.bin(),
            _ => None,
        }
    }
}
