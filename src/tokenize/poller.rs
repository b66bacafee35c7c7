use crate::error::{CoreError, ErrorKind, SdkError, SdkResult};
use crate::tokenize::api::Api;
use std::time::Duration;
use tracing::{debug, info};

/// Polls a payment handle's status after step-up until it becomes payable.
///
/// Fixed delay between polls, never backoff: the backend's settlement window
/// is short and predictable, so a bounded number of evenly spaced queries is
/// the documented contract. Worst case issues `retries + 1` queries.
pub struct StatusPoller {
    api: Api,
    retries: u32,
    delay: Duration,
}

impl StatusPoller {
    pub fn new(api: Api, retries: u32, delay: Duration) -> Self {
        Self { api, retries, delay }
    }

    /// Resolves the handle token once the handle reports `PAYABLE`.
    ///
    /// `FAILED`/`EXPIRED` fail immediately; non-terminal statuses consume one
    /// retry each until the budget runs out.
    pub async fn refresh(&self, payment_handle_token: &str, correlation_id: &str) -> SdkResult<String> {
        let mut remaining = self.retries;
        loop {
            let refresh = self
                .api
                .lookup_handle(payment_handle_token)
                .await
                .map_err(|e| SdkError::from_transport(e, correlation_id))?;

            debug!(
                correlation_id = %correlation_id,
                status = %refresh.status,
                remaining = remaining,
                "payment handle status poll"
            );

            if refresh.status.is_payable_now() {
                info!(correlation_id = %correlation_id, "payment handle is payable");
                return refresh.payment_handle_token.ok_or_else(|| {
                    SdkError::new(
                        ErrorKind::Core(CoreError::GenericApi {
                            message: "payable handle missing token".to_string(),
                        }),
                        correlation_id,
                    )
                });
            }

            if refresh.status.is_terminal_failure() {
                return Err(SdkError::new(
                    CoreError::HandleCreationFailed {
                        status: refresh.status.to_string(),
                    },
                    correlation_id,
                ));
            }

            if remaining == 0 {
                return Err(SdkError::new(
                    CoreError::HandleCreationFailed {
                        status: refresh.status.to_string(),
                    },
                    correlation_id,
                )
                .with_detail("status did not settle within the polling budget"));
            }
            remaining -= 1;
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Method, Transport, TransportError};
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct SequencedTransport {
        responses: Mutex<Vec<JsonValue>>,
        calls: AtomicUsize,
    }

    impl SequencedTransport {
        fn new(statuses: &[&str]) -> Arc<Self> {
            let responses = statuses
                .iter()
                .map(|s| {
                    json!({
                        "paymentHandles": [
                            {"status": s, "paymentHandleToken": "tok_1"}
                        ]
                    })
                })
                .collect();
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for SequencedTransport {
        async fn request(
            &self,
            _url: &str,
            _method: Method,
            _payload: Option<&JsonValue>,
        ) -> Result<JsonValue, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    fn poller(transport: Arc<SequencedTransport>, retries: u32) -> StatusPoller {
        StatusPoller::new(
            Api::new(transport, "https://api.test.example"),
            retries,
            Duration::from_millis(0),
        )
    }

    #[tokio::test]
    async fn stops_at_first_payable() {
        let transport = SequencedTransport::new(&["PROCESSING", "PAYABLE", "PAYABLE"]);
        let token = poller(transport.clone(), 3).refresh("tok_1", "corr").await.unwrap();
        assert_eq!(token, "tok_1");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausts_exactly_retries_plus_one_queries() {
        let transport = SequencedTransport::new(&["PROCESSING"; 10]);
        let err = poller(transport.clone(), 3).refresh("tok_1", "corr").await.unwrap_err();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 4);
        assert_eq!(err.code(), 9040);
    }

    #[tokio::test]
    async fn terminal_failure_stops_immediately() {
        let transport = SequencedTransport::new(&["EXPIRED", "PAYABLE"]);
        let err = poller(transport.clone(), 3).refresh("tok_1", "corr").await.unwrap_err();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.code(), 9040);
        assert!(err.to_string().contains("EXPIRED"));
    }

    #[tokio::test]
    async fn zero_retries_means_single_query() {
        let transport = SequencedTransport::new(&["INITIATED", "PAYABLE"]);
        let err = poller(transport.clone(), 0).refresh("tok_1", "corr").await.unwrap_err();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.code(), 9040);
    }
}
