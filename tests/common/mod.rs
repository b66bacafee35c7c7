//! Shared mocks for the integration tests: a scripted transport and a
//! scripted device session.
#![allow(dead_code)]

use async_trait::async_trait;
use payhandle_sdk::{
    ChallengeDelegate, ChallengeParams, DeviceError, DeviceSession, Environment, Method,
    SdkConfig, SessionParams, Transport, TransportError, ValidationOutcome,
};
use serde_json::{json, Value as JsonValue};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct RecordedCall {
    pub url: String,
    pub method: Method,
    pub payload: Option<JsonValue>,
}

/// Transport that replays a scripted sequence of responses and records
/// every call it receives.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<JsonValue, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(responses: Vec<Result<JsonValue, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// Adds latency to every call so in-flight overlap can be provoked.
    pub fn with_delay(
        responses: Vec<Result<JsonValue, TransportError>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.url.clone()).collect()
    }

    pub fn payloads(&self) -> Vec<Option<JsonValue>> {
        self.calls.lock().unwrap().iter().map(|c| c.payload.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        url: &str,
        method: Method,
        payload: Option<&JsonValue>,
    ) -> Result<JsonValue, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            method,
            payload: payload.cloned(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Connection {
                    message: "mock transport script exhausted".to_string(),
                })
            })
    }
}

/// Device session that returns a fixed fingerprint id and settles every
/// challenge with one scripted outcome. `outcome: None` never settles,
/// which is how challenge timeouts are provoked.
pub struct MockDevice {
    pub fingerprint: Result<String, DeviceError>,
    pub outcome: Option<ValidationOutcome>,
    pub configure_calls: AtomicUsize,
    pub initiate_calls: AtomicUsize,
    pub challenge_calls: AtomicUsize,
    pub seen_bins: Mutex<Vec<String>>,
}

impl MockDevice {
    pub fn new(outcome: Option<ValidationOutcome>) -> Arc<Self> {
        Arc::new(Self {
            fingerprint: Ok("fp_mock".to_string()),
            outcome,
            configure_calls: AtomicUsize::new(0),
            initiate_calls: AtomicUsize::new(0),
            challenge_calls: AtomicUsize::new(0),
            seen_bins: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DeviceSession for MockDevice {
    async fn configure(&self, _params: &SessionParams) -> Result<(), DeviceError> {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn initiate_flow(
        &self,
        _account_id: &str,
        card_bin: &str,
    ) -> Result<String, DeviceError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_bins.lock().unwrap().push(card_bin.to_string());
        self.fingerprint.clone()
    }

    async fn start_challenge(
        &self,
        _params: &ChallengeParams,
        delegate: Arc<dyn ChallengeDelegate>,
    ) -> Result<(), DeviceError> {
        self.challenge_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = &self.outcome {
            delegate.on_validation(outcome.clone());
        }
        Ok(())
    }
}

/// Test configuration: instant polling, short challenge timeout.
pub fn test_config() -> SdkConfig {
    let mut config = SdkConfig::for_environment(Environment::Test, "key_test_1");
    config.refresh_delay_secs = 0;
    config.challenge_timeout_secs = 1;
    config
}

pub fn handle_json(status: &str, action: Option<&str>) -> JsonValue {
    let mut handle = json!({
        "id": "ph_1",
        "accountId": "acct_1",
        "card": {"bin": "411111", "networkTokenBin": "489537"},
        "status": status,
        "merchantRefNum": "order-42",
        "paymentHandleToken": "tok_1"
    });
    if let Some(action) = action {
        handle["action"] = json!(action);
    }
    handle
}

pub fn search_json(status: &str) -> JsonValue {
    json!({
        "paymentHandles": [
            {"status": status, "paymentHandleToken": "tok_1"}
        ]
    })
}

pub fn auth_pending_json() -> JsonValue {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    let payload = STANDARD.encode(r#"{"transactionId": "txn_1", "payload": "cres.data"}"#);
    json!({
        "id": "auth_1",
        "status": "PENDING",
        "sdkChallengePayload": payload
    })
}

pub fn finalize_json(status: &str) -> JsonValue {
    json!({ "status": status })
}
