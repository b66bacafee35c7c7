//! Bounds of the payment-handle status poller: exact query counts, early
//! exits and the fixed (non-backoff) delay between polls.

mod common;

use common::*;
use payhandle_sdk::tokenize::{Api, StatusPoller};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn poller(transport: Arc<MockTransport>, retries: u32, delay: Duration) -> StatusPoller {
    StatusPoller::new(
        Api::new(transport, "https://api.test.paymenthub.example"),
        retries,
        delay,
    )
}

#[tokio::test]
async fn persistent_pending_status_exhausts_retries_plus_one_queries() {
    let transport = MockTransport::new(vec![
        Ok(search_json("PROCESSING")),
        Ok(search_json("PROCESSING")),
        Ok(search_json("PROCESSING")),
        Ok(search_json("PROCESSING")),
    ]);

    let err = poller(transport.clone(), 3, Duration::from_millis(0))
        .refresh("tok_1", "corr")
        .await
        .unwrap_err();

    assert_eq!(transport.call_count(), 4);
    assert_eq!(err.code(), 9040);
    assert!(err.to_string().contains("PROCESSING"));
}

#[tokio::test]
async fn polling_stops_at_first_payable() {
    let transport = MockTransport::new(vec![
        Ok(search_json("INITIATED")),
        Ok(search_json("PROCESSING")),
        Ok(search_json("PAYABLE")),
        Ok(search_json("PAYABLE")),
    ]);

    let token = poller(transport.clone(), 5, Duration::from_millis(0))
        .refresh("tok_1", "corr")
        .await
        .unwrap();

    assert_eq!(token, "tok_1");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn terminal_status_fails_without_consuming_retries() {
    let transport = MockTransport::new(vec![Ok(search_json("FAILED"))]);

    let err = poller(transport.clone(), 5, Duration::from_millis(0))
        .refresh("tok_1", "corr")
        .await
        .unwrap_err();

    assert_eq!(transport.call_count(), 1);
    assert_eq!(err.code(), 9040);
    assert!(err.to_string().contains("FAILED"));
}

#[tokio::test]
async fn zero_retries_issues_a_single_query() {
    let transport = MockTransport::new(vec![Ok(search_json("PROCESSING"))]);

    let err = poller(transport.clone(), 0, Duration::from_millis(0))
        .refresh("tok_1", "corr")
        .await
        .unwrap_err();

    assert_eq!(transport.call_count(), 1);
    assert_eq!(err.code(), 9040);
}

#[tokio::test(start_paused = true)]
async fn delay_between_polls_is_fixed_not_backoff() {
    let transport = MockTransport::new(vec![
        Ok(search_json("PROCESSING")),
        Ok(search_json("PROCESSING")),
        Ok(search_json("PROCESSING")),
        Ok(search_json("PAYABLE")),
    ]);

    let started = Instant::now();
    poller(transport, 3, Duration::from_secs(6))
        .refresh("tok_1", "corr")
        .await
        .unwrap();

    // three sleeps of exactly 6s each, no doubling
    assert_eq!(started.elapsed(), Duration::from_secs(18));
}

#[tokio::test]
async fn search_payload_carries_the_token() {
    let transport = MockTransport::new(vec![Ok(search_json("PAYABLE"))]);

    poller(transport.clone(), 0, Duration::from_millis(0))
        .refresh("tok_abc", "corr")
        .await
        .unwrap();

    let payload = transport.payloads()[0].clone().unwrap();
    assert_eq!(payload["paymentHandleToken"], "tok_abc");
}
