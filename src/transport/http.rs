use crate::transport::{Method, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::warn;

/// reqwest-backed transport with bounded retries and exponential backoff on
/// rate limits and server errors.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_key: String,
    timeout: Duration,
    max_retries: u32,
}

impl HttpTransport {
    pub fn new(api_key: String, timeout: Duration, max_retries: u32) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            timeout,
            max_retries,
        })
    }

    fn classify_send_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else if err.is_builder() {
            TransportError::InvalidUrl {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            TransportError::Connection {
                message: format!("request failed: {}", err),
            }
        }
    }
}

/// Projects the payments API error envelope `{"error":{"code","message"}}`
/// out of a non-2xx body. The code is decimal-in-a-string on the wire.
fn api_error(status: u16, body: &str) -> TransportError {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    let error_obj = parsed.as_ref().and_then(|v| v.get("error"));
    let code = error_obj
        .and_then(|e| e.get("code"))
        .and_then(|c| match c {
            JsonValue::String(s) => s.parse::<u32>().ok(),
            JsonValue::Number(n) => n.as_u64().map(|n| n as u32),
            _ => None,
        });
    let message = error_obj
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("HTTP {}", status));

    TransportError::Api {
        status,
        code,
        message,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        method: Method,
        payload: Option<&JsonValue>,
    ) -> Result<JsonValue, TransportError> {
        let reqwest_method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            let mut request = self
                .client
                .request(reqwest_method.clone(), url)
                .timeout(self.timeout)
                .bearer_auth(&self.api_key)
                .header("Content-Type", "application/json");
            if let Some(body) = payload {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| self.classify_send_error(e));

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    if status.is_success() {
                        if text.trim().is_empty() {
                            return Ok(JsonValue::Null);
                        }
                        return serde_json::from_str::<JsonValue>(&text).map_err(|e| {
                            TransportError::Decoding {
                                message: format!("invalid JSON response: {}", e),
                            }
                        });
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if retryable && attempt < self.max_retries {
                        warn!(
                            status = %status,
                            attempt = attempt + 1,
                            url = %url,
                            "payments API error, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                        continue;
                    }

                    return Err(api_error(status.as_u16(), &text));
                }
                Err(e) => {
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if retryable && attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
                        continue;
                    }
                    break;
                }
            }
        }

        Err(last_error.unwrap_or(TransportError::Connection {
            message: "request failed".to_string(),
        }))
    }
}
