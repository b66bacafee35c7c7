use crate::error::{CoreError, ErrorKind, SdkError, SdkResult, ThreeDsError};
use crate::model::AuthStatus;
use crate::threeds::challenge::decode_challenge_payload;
use crate::threeds::device::{
    ActionCode, ChallengeBridge, DeviceSession, SessionParams, ValidationOutcome,
};
use crate::tokenize::api::Api;
use crate::tokenize::options::ThreeDsPreferences;
use crate::tokenize::request;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Phase of one step-up authentication run. Linear on the happy path;
/// `Failed`, `Cancelled` and `TimedOut` are the terminal error exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    Fingerprinting,
    ChallengeRequested,
    ChallengePending,
    ChallengeRunning,
    Finalizing,
    Done,
    Failed,
    Cancelled,
    TimedOut,
}

impl AuthPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AuthPhase::Done | AuthPhase::Failed | AuthPhase::Cancelled | AuthPhase::TimedOut
        )
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthPhase::Idle => "idle",
            AuthPhase::Fingerprinting => "fingerprinting",
            AuthPhase::ChallengeRequested => "challenge_requested",
            AuthPhase::ChallengePending => "challenge_pending",
            AuthPhase::ChallengeRunning => "challenge_running",
            AuthPhase::Finalizing => "finalizing",
            AuthPhase::Done => "done",
            AuthPhase::Failed => "failed",
            AuthPhase::Cancelled => "cancelled",
            AuthPhase::TimedOut => "timed_out",
        };
        write!(f, "{}", s)
    }
}

/// Inputs the orchestrator resolves before starting step-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeDsOptions {
    pub account_id: String,
    pub card_bin: String,
    pub prefs: Option<ThreeDsPreferences>,
}

/// Classifies a challenge outcome. `Ok` carries the server JWT to finalize
/// with; every other disposition maps to one taxonomy entry.
fn classify_outcome(outcome: ValidationOutcome) -> Result<String, ErrorKind> {
    match outcome.action {
        ActionCode::Success => match (outcome.validated, outcome.server_jwt) {
            (true, Some(jwt)) => Ok(jwt),
            _ => Err(ErrorKind::ThreeDs(ThreeDsError::FailedValidation)),
        },
        ActionCode::Failure { message } | ActionCode::Error { message } => {
            Err(ErrorKind::ThreeDs(ThreeDsError::SessionFailure { message }))
        }
        ActionCode::Cancel => Err(ErrorKind::ThreeDs(ThreeDsError::UserCancelled)),
        ActionCode::Timeout => Err(ErrorKind::ThreeDs(ThreeDsError::ChallengeTimeout)),
        ActionCode::Unknown(code) => Err(ErrorKind::Core(CoreError::GenericApi {
            message: format!("unrecognised challenge action code: {}", code),
        })),
    }
}

fn phase_for(kind: &ErrorKind) -> AuthPhase {
    match kind {
        ErrorKind::ThreeDs(ThreeDsError::UserCancelled) => AuthPhase::Cancelled,
        ErrorKind::ThreeDs(ThreeDsError::ChallengeTimeout) => AuthPhase::TimedOut,
        _ => AuthPhase::Failed,
    }
}

/// Drives one step-up authentication: device fingerprinting, the
/// authentication request, the challenge when the backend demands one, and
/// finalization.
pub struct StepUpSession {
    api: Api,
    device: Arc<dyn DeviceSession>,
    session_params: SessionParams,
    challenge_timeout: Duration,
}

impl StepUpSession {
    pub fn new(
        api: Api,
        device: Arc<dyn DeviceSession>,
        session_params: SessionParams,
        challenge_timeout: Duration,
    ) -> Self {
        Self {
            api,
            device,
            session_params,
            challenge_timeout,
        }
    }

    fn advance(&self, correlation_id: &str, from: &mut AuthPhase, to: AuthPhase) {
        info!(
            correlation_id = %correlation_id,
            from = %from,
            to = %to,
            "step-up phase transition"
        );
        *from = to;
    }

    pub async fn authenticate(
        &self,
        handle_id: &str,
        merchant_ref_num: &str,
        options: &ThreeDsOptions,
        correlation_id: &str,
    ) -> SdkResult<()> {
        let mut phase = AuthPhase::Idle;

        self.advance(correlation_id, &mut phase, AuthPhase::Fingerprinting);
        self.device
            .configure(&self.session_params)
            .await
            .map_err(|e| self.device_error(e, correlation_id))?;
        let fingerprint_id = self
            .device
            .initiate_flow(&options.account_id, &options.card_bin)
            .await
            .map_err(|e| self.device_error(e, correlation_id))?;

        self.advance(correlation_id, &mut phase, AuthPhase::ChallengeRequested);
        let payload = request::build_authentication_request(
            merchant_ref_num,
            &fingerprint_id,
            options.prefs.as_ref(),
        );
        let auth = self
            .api
            .create_authentication(handle_id, &payload)
            .await
            .map_err(|e| SdkError::from_transport(e, correlation_id))?;

        let server_jwt = match auth.status {
            AuthStatus::Completed => {
                info!(correlation_id = %correlation_id, auth_id = %auth.id, "frictionless authentication");
                self.advance(correlation_id, &mut phase, AuthPhase::Done);
                return Ok(());
            }
            AuthStatus::Failed => {
                self.advance(correlation_id, &mut phase, AuthPhase::Failed);
                return Err(SdkError::new(ThreeDsError::FailedValidation, correlation_id)
                    .with_detail(format!("authentication {} rejected upfront", auth.id)));
            }
            AuthStatus::Pending => {
                self.advance(correlation_id, &mut phase, AuthPhase::ChallengePending);
                let raw = auth.sdk_challenge_payload.as_deref().ok_or_else(|| {
                    SdkError::new(
                        ThreeDsError::ChallengePayload {
                            message: "pending authentication without challenge payload".to_string(),
                        },
                        correlation_id,
                    )
                })?;
                let params = decode_challenge_payload(raw)
                    .map_err(|e| SdkError::new(e, correlation_id))?;

                self.advance(correlation_id, &mut phase, AuthPhase::ChallengeRunning);
                let (bridge, outcome_rx) = ChallengeBridge::new();
                self.device
                    .start_challenge(&params, bridge)
                    .await
                    .map_err(|e| self.device_error(e, correlation_id))?;

                let outcome = match tokio::time::timeout(self.challenge_timeout, outcome_rx).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(_)) => {
                        self.advance(correlation_id, &mut phase, AuthPhase::Failed);
                        return Err(SdkError::new(
                            ThreeDsError::SessionFailure {
                                message: "challenge ended without reporting an outcome".to_string(),
                            },
                            correlation_id,
                        ));
                    }
                    Err(_) => {
                        self.advance(correlation_id, &mut phase, AuthPhase::TimedOut);
                        return Err(SdkError::new(ThreeDsError::ChallengeTimeout, correlation_id));
                    }
                };

                match classify_outcome(outcome) {
                    Ok(jwt) => jwt,
                    Err(kind) => {
                        self.advance(correlation_id, &mut phase, phase_for(&kind));
                        return Err(SdkError::new(kind, correlation_id));
                    }
                }
            }
        };

        self.advance(correlation_id, &mut phase, AuthPhase::Finalizing);
        let finalize = self
            .api
            .finalize_authentication(
                handle_id,
                &auth.id,
                &request::build_finalize_request(Some(server_jwt.as_str())),
            )
            .await
            .map_err(|e| SdkError::from_transport(e, correlation_id))?;

        match finalize.status {
            AuthStatus::Completed => {
                self.advance(correlation_id, &mut phase, AuthPhase::Done);
                Ok(())
            }
            AuthStatus::Pending => {
                self.advance(correlation_id, &mut phase, AuthPhase::Failed);
                Err(SdkError::new(
                    CoreError::GenericApi {
                        message: "finalize left the authentication pending".to_string(),
                    },
                    correlation_id,
                ))
            }
            AuthStatus::Failed => {
                self.advance(correlation_id, &mut phase, AuthPhase::Failed);
                Err(SdkError::new(
                    CoreError::HandleCreationFailed {
                        status: AuthStatus::Failed.to_string(),
                    },
                    correlation_id,
                ))
            }
        }
    }

    fn device_error(&self, err: crate::threeds::device::DeviceError, correlation_id: &str) -> SdkError {
        warn!(correlation_id = %correlation_id, error = %err, "device SDK failure");
        SdkError::new(
            ThreeDsError::SessionFailure {
                message: err.to_string(),
            },
            correlation_id,
        )
    }
}
