use crate::model::{AuthenticationResult, FinalizeResult, PaymentHandle, RefreshStatus};
use crate::tokenize::request;
use crate::transport::{Method, Transport, TransportError};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Typed wrapper over the raw transport. Owns endpoint paths and response
/// projections; everything above it works with model types only.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl Api {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/paymenthub/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &JsonValue,
    ) -> Result<T, TransportError> {
        let url = self.url(path);
        debug!(url = %url, "payments API request");
        let raw = self.transport.request(&url, Method::Post, Some(payload)).await?;
        project(raw)
    }

    pub async fn create_handle(&self, payload: &JsonValue) -> Result<PaymentHandle, TransportError> {
        self.post("paymenthandles", payload).await
    }

    /// The search endpoint wraps matches in `{"paymentHandles": [...]}`;
    /// polling expects exactly one match for the token.
    pub async fn lookup_handle(
        &self,
        payment_handle_token: &str,
    ) -> Result<RefreshStatus, TransportError> {
        let payload = request::build_search_request(payment_handle_token);
        let raw = self
            .transport
            .request(&self.url("paymenthandles/search"), Method::Post, Some(&payload))
            .await?;
        let first = raw
            .get("paymentHandles")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .cloned()
            .ok_or_else(|| TransportError::Decoding {
                message: "search returned no payment handle for token".to_string(),
            })?;
        project(first)
    }

    pub async fn create_authentication(
        &self,
        handle_id: &str,
        payload: &JsonValue,
    ) -> Result<AuthenticationResult, TransportError> {
        self.post(&format!("paymenthandles/{}/authentications", handle_id), payload)
            .await
    }

    pub async fn finalize_authentication(
        &self,
        handle_id: &str,
        auth_id: &str,
        payload: &JsonValue,
    ) -> Result<FinalizeResult, TransportError> {
        self.post(
            &format!("paymenthandles/{}/authentications/{}/finalize", handle_id, auth_id),
            payload,
        )
        .await
    }
}

fn project<T: DeserializeOwned>(raw: JsonValue) -> Result<T, TransportError> {
    serde_json::from_value(raw).map_err(|e| TransportError::Decoding {
        message: format!("unexpected response shape: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedTransport {
        responses: Mutex<Vec<Result<JsonValue, TransportError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<JsonValue, TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn request(
            &self,
            url: &str,
            _method: Method,
            _payload: Option<&JsonValue>,
        ) -> Result<JsonValue, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn create_handle_projects_model() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "id": "ph_1",
            "status": "PAYABLE",
            "merchantRefNum": "order-1",
            "paymentHandleToken": "tok_1"
        }))]));
        let api = Api::new(transport.clone(), "https://api.test.example");

        let handle = api.create_handle(&json!({})).await.unwrap();
        assert_eq!(handle.id, "ph_1");
        assert_eq!(
            transport.calls.lock().unwrap()[0],
            "https://api.test.example/paymenthub/v1/paymenthandles"
        );
    }

    #[tokio::test]
    async fn lookup_unwraps_search_envelope() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "paymentHandles": [
                {"status": "PROCESSING", "paymentHandleToken": "tok_1"}
            ]
        }))]));
        let api = Api::new(transport, "https://api.test.example/");

        let refresh = api.lookup_handle("tok_1").await.unwrap();
        assert_eq!(refresh.status.to_string(), "PROCESSING");
    }

    #[tokio::test]
    async fn empty_search_is_a_decoding_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "paymentHandles": []
        }))]));
        let api = Api::new(transport, "https://api.test.example");

        let err = api.lookup_handle("tok_missing").await.unwrap_err();
        assert!(matches!(err, TransportError::Decoding { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decoding_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "id": "ph_1"
        }))]));
        let api = Api::new(transport, "https://api.test.example");

        let err = api.create_handle(&json!({})).await.unwrap_err();
        assert!(matches!(err, TransportError::Decoding { .. }));
    }
}
