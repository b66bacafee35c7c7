//! Step-up (3-D Secure) authentication: the external device-SDK seam, the
//! opaque challenge payload codec, and the session driving the flow.

pub mod challenge;
pub mod device;
pub mod session;

pub use challenge::{decode_challenge_payload, ChallengeParams};
pub use device::{
    ActionCode, ChallengeBridge, ChallengeDelegate, DeviceError, DeviceSession, SessionParams,
    ValidationOutcome,
};
pub use session::{AuthPhase, StepUpSession, ThreeDsOptions};
