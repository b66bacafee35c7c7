//! Error taxonomy and correlation for the SDK.
//!
//! Every failed operation surfaces exactly one classified [`SdkError`]
//! carrying a stable numeric code, a short code-bearing user message, a
//! diagnostic message, and the attempt's correlation id. Server-returned
//! numeric codes are mapped into the taxonomy via a lookup; unmapped codes
//! fall through to [`ErrorKind::Unhandled`] rather than crashing.

use crate::transport::TransportError;
use thiserror::Error;
use uuid::Uuid;

pub type SdkResult<T> = Result<T, SdkError>;

/// Orchestration-level failures raised by the tokenization engine itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("payment handle creation failed with status {status}")]
    HandleCreationFailed { status: String },

    #[error("account is not usable for this operation: {message}")]
    InvalidAccount { message: String },

    #[error("a tokenization attempt is already in progress for this client")]
    AlreadyInProgress,

    #[error("SDK is not initialized: {message}")]
    NotInitialized { message: String },

    #[error("unexpected API interaction: {message}")]
    GenericApi { message: String },
}

/// Step-up authentication failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThreeDsError {
    #[error("3DS authentication failed validation")]
    FailedValidation,

    #[error("3DS challenge was cancelled by the user")]
    UserCancelled,

    #[error("3DS challenge timed out")]
    ChallengeTimeout,

    #[error("3DS session failure: {message}")]
    SessionFailure { message: String },

    #[error("3DS challenge payload could not be decoded: {message}")]
    ChallengePayload { message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorKind {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    ThreeDs(#[from] ThreeDsError),

    #[error("unhandled payments API error code {remote_code}")]
    Unhandled { remote_code: u32 },
}

impl ErrorKind {
    /// Maps a server-returned numeric error code into the taxonomy.
    /// Unknown codes are preserved as [`ErrorKind::Unhandled`].
    pub fn from_remote_code(remote_code: u32, message: &str) -> ErrorKind {
        match remote_code {
            5003 => ErrorKind::Core(CoreError::InvalidAccount {
                message: message.to_string(),
            }),
            5010 | 5023 | 5068 => ErrorKind::Core(CoreError::GenericApi {
                message: message.to_string(),
            }),
            5031 | 5040 => ErrorKind::Core(CoreError::HandleCreationFailed {
                status: message.to_string(),
            }),
            5500 | 5501 => ErrorKind::ThreeDs(ThreeDsError::SessionFailure {
                message: message.to_string(),
            }),
            _ => ErrorKind::Unhandled { remote_code },
        }
    }

    /// Classifies a transport failure, consulting the remote-code table when
    /// the server supplied a numeric error code.
    pub fn from_transport(err: TransportError) -> ErrorKind {
        match err {
            TransportError::Api {
                code: Some(remote_code),
                ref message,
                ..
            } => ErrorKind::from_remote_code(remote_code, message),
            other => ErrorKind::Transport(other),
        }
    }

    /// Stable numeric code used for support and triage. These values are
    /// part of the SDK's public contract and must never be renumbered.
    pub fn code(&self) -> u32 {
        match self {
            ErrorKind::Transport(t) => match t {
                TransportError::Connection { .. } => 9001,
                TransportError::Decoding { .. } => 9002,
                TransportError::InvalidUrl { .. } => 9035,
                TransportError::Encoding { .. } => 9036,
                TransportError::Timeout { .. } => 9204,
                TransportError::Api { .. } => 9014,
            },
            ErrorKind::Core(c) => match c {
                CoreError::AlreadyInProgress => 9013,
                CoreError::GenericApi { .. } => 9014,
                CoreError::HandleCreationFailed { .. } => 9040,
                CoreError::InvalidAccount { .. } => 9042,
                CoreError::NotInitialized { .. } => 9055,
            },
            ErrorKind::ThreeDs(t) => match t {
                ThreeDsError::FailedValidation => 9125,
                ThreeDsError::UserCancelled => 9126,
                ThreeDsError::ChallengeTimeout => 9127,
                ThreeDsError::SessionFailure { .. } => 9128,
                ThreeDsError::ChallengePayload { .. } => 9130,
            },
            ErrorKind::Unhandled { .. } => 9999,
        }
    }
}

/// Scope of the correlation id attached to errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationScope {
    /// One id for the lifetime of the client instance.
    PerClient,
    /// A fresh id for every tokenize call.
    PerAttempt,
}

/// Mints correlation ids according to the configured scope.
#[derive(Debug, Clone)]
pub struct Correlation {
    scope: CorrelationScope,
    client_id: String,
}

impl Correlation {
    pub fn new(scope: CorrelationScope) -> Self {
        Self {
            scope,
            client_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn attempt_id(&self) -> String {
        match self.scope {
            CorrelationScope::PerClient => self.client_id.clone(),
            CorrelationScope::PerAttempt => Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SdkError {
    pub kind: ErrorKind,
    pub detail: Option<String>,
    pub correlation_id: String,
}

impl SdkError {
    pub fn new(kind: impl Into<ErrorKind>, correlation_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: None,
            correlation_id: correlation_id.into(),
        }
    }

    pub fn from_transport(err: TransportError, correlation_id: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_transport(err), correlation_id)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    /// Short, generic, non-sensitive message suitable for display to an end
    /// user. Carries the numeric code for support triage.
    pub fn user_message(&self) -> String {
        format!(
            "There was an error ({}), please contact our support.",
            self.code()
        )
    }
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.kind)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        write!(f, " [correlation: {}]", self.correlation_id)
    }
}

impl std::error::Error for SdkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
