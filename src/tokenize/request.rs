//! Pure request builders: options in, JSON payload out. No I/O, no shared
//! state. Each build stamps a fresh invocation id so server-side idempotency
//! tracking can tell retries apart from new attempts.

use crate::tokenize::options::{PaymentMethodPayload, ThreeDsPreferences, TokenizeOptions};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

/// Body for the create-payment-handle endpoint.
pub fn build_handle_request(options: &TokenizeOptions) -> JsonValue {
    let mut body = json!({
        "merchantRefNum": options.merchant_ref_num,
        "transactionType": "PAYMENT",
        "amount": options.amount,
        "currencyCode": options.currency_code,
        "paymentType": options.payment_method.method_name(),
        "invocationId": Uuid::new_v4().to_string(),
    });

    match &options.payment_method {
        PaymentMethodPayload::Card(card) => {
            let mut card_body = json!({
                "cardNum": card.card_num,
                "cardExpiry": {
                    "month": card.expiry_month,
                    "year": card.expiry_year,
                },
            });
            if let Some(cvv) = &card.cvv {
                card_body["cvv"] = json!(cvv);
            }
            if let Some(name) = &card.holder_name {
                card_body["holderName"] = json!(name);
            }
            body["card"] = card_body;
        }
        PaymentMethodPayload::Wallet { wallet_id } => {
            body["wallet"] = json!({ "walletId": wallet_id });
        }
        PaymentMethodPayload::PeerPayment { recipient_ref } => {
            body["peerPayment"] = json!({ "recipientRef": recipient_ref });
        }
    }

    if let Some(account_id) = &options.account_id {
        body["accountId"] = json!(account_id);
    }
    if let Some(ip) = &options.customer_ip {
        body["customerIp"] = json!(ip);
    }
    if let Some(prefs) = &options.three_ds {
        body["threeDs"] = build_three_ds(prefs);
    }

    body
}

fn build_three_ds(prefs: &ThreeDsPreferences) -> JsonValue {
    let mut body = json!({});
    if let Some(url) = &prefs.merchant_url {
        body["merchantUrl"] = json!(url);
    }
    if let Some(channel) = &prefs.device_channel {
        body["deviceChannel"] = json!(channel);
    }
    if let Some(category) = &prefs.message_category {
        body["messageCategory"] = json!(category);
    }
    body
}

/// Body for the handle-search endpoint, keyed by handle token.
pub fn build_search_request(payment_handle_token: &str) -> JsonValue {
    json!({ "paymentHandleToken": payment_handle_token })
}

/// Body for the create-authentication endpoint.
pub fn build_authentication_request(
    merchant_ref_num: &str,
    device_fingerprint_id: &str,
    prefs: Option<&ThreeDsPreferences>,
) -> JsonValue {
    let mut body = json!({
        "merchantRefNum": merchant_ref_num,
        "deviceFingerprintingId": device_fingerprint_id,
    });
    if let Some(prefs) = prefs {
        body["threeDs"] = build_three_ds(prefs);
    }
    body
}

/// Body for the finalize-authentication endpoint. The server JWT is present
/// only when the challenge flow produced one.
pub fn build_finalize_request(server_jwt: Option<&str>) -> JsonValue {
    match server_jwt {
        Some(jwt) => json!({ "payload": jwt }),
        None => json!({}),
    }
}
