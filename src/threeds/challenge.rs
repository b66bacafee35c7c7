use crate::error::ThreeDsError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

/// Parameters extracted from the backend's opaque challenge payload. The
/// wire form is base64-encoded JSON; only these two fields matter to the
/// device SDK.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeParams {
    pub transaction_id: String,
    pub payload: String,
}

/// Decodes an `sdkChallengePayload` string. Purely local; a malformed
/// payload never causes a network call.
pub fn decode_challenge_payload(raw: &str) -> Result<ChallengeParams, ThreeDsError> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| ThreeDsError::ChallengePayload {
            message: format!("invalid base64: {}", e),
        })?;
    serde_json::from_slice(&bytes).map_err(|e| ThreeDsError::ChallengePayload {
        message: format!("invalid challenge JSON: {}", e),
    })
}
