use serde::{Deserialize, Serialize};

/// Status of a step-up authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthStatus {
    Completed,
    Pending,
    Failed,
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthStatus::Completed => "COMPLETED",
            AuthStatus::Pending => "PENDING",
            AuthStatus::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// Response of the create-authentication endpoint. When `status` is
/// `Pending` the backend demands a challenge and `sdk_challenge_payload`
/// carries the opaque base64 challenge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    /// Authentication id the finalize call addresses.
    pub id: String,
    pub status: AuthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_challenge_payload: Option<String>,
}

impl AuthenticationResult {
    pub fn needs_challenge(&self) -> bool {
        self.status == AuthStatus::Pending
    }
}

/// Response of the finalize-authentication endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResult {
    pub status: AuthStatus,
}
