use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use voyage_core::payment::{CheckoutRequest, GatewayError, GatewayResponse, PaymentGateway};

/// Client for a Chapa-compatible hosted checkout API.
///
/// The bearer secret is looked up in the environment variable named by
/// `secret_key_env` on every call, so rotating it needs no restart.
pub struct ChapaAdapter {
    client: Client,
    base_url: String,
    secret_key_env: String,
}

impl ChapaAdapter {
    pub fn new(base_url: impl Into<String>, secret_key_env: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key_env: secret_key_env.into(),
        }
    }

    fn secret(&self) -> String {
        std::env::var(&self.secret_key_env).unwrap_or_else(|_| {
            warn!("{} is not set; calling gateway without a secret", self.secret_key_env);
            String::new()
        })
    }

    async fn decode(response: reqwest::Response) -> Result<GatewayResponse, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            return Err(GatewayError::Rejected { status: status.as_u16(), detail });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(GatewayResponse(body))
    }
}

#[async_trait]
impl PaymentGateway for ChapaAdapter {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<GatewayResponse, GatewayError> {
        let url = format!("{}/transaction/initialize", self.base_url);
        debug!(tx_ref = %request.tx_ref, email = %request.email, amount = %request.amount, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.secret())
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    async fn verify(&self, tx_ref: &str) -> Result<GatewayResponse, GatewayError> {
        let url = format!("{}/transaction/verify/{}", self.base_url, tx_ref);
        debug!(tx_ref, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.secret())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use voyage_core::payment::Customization;
    use voyage_core::pii::Masked;

    fn checkout(tx_ref: &str) -> CheckoutRequest {
        CheckoutRequest {
            amount: dec!(1500),
            currency: "ETB".to_string(),
            email: Masked("payer@example.com".to_string()),
            first_name: "Customer".to_string(),
            last_name: String::new(),
            tx_ref: tx_ref.to_string(),
            callback_url: "http://localhost/verify-payment/".to_string(),
            return_url: "http://localhost/verify-payment/".to_string(),
            customization: Customization {
                title: "Booking Payment".to_string(),
                description: "Payment for booking".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn initialize_posts_payload_with_secret() {
        std::env::set_var("VOYAGE_TEST_SECRET_INIT", "sk-init");
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/transaction/initialize")
                    .header("authorization", "Bearer sk-init")
                    .body_contains("\"tx_ref\":\"ref-1\"")
                    .body_contains("\"amount\":\"1500\"");
                then.status(200).json_body(json!({
                    "status": "success",
                    "data": {"checkout_url": "https://checkout.example/ref-1"}
                }));
            })
            .await;

        let adapter = ChapaAdapter::new(server.base_url(), "VOYAGE_TEST_SECRET_INIT");
        let response = adapter.initialize(&checkout("ref-1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.checkout_url(), Some("https://checkout.example/ref-1"));
    }

    #[tokio::test]
    async fn rejection_keeps_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/transaction/initialize");
                then.status(401).body(r#"{"message":"Invalid API Key"}"#);
            })
            .await;

        let adapter = ChapaAdapter::new(server.base_url(), "VOYAGE_TEST_SECRET_UNSET");
        let err = adapter.initialize(&checkout("ref-2")).await.unwrap_err();

        match err {
            GatewayError::Rejected { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail, r#"{"message":"Invalid API Key"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_reads_transaction_status() {
        std::env::set_var("VOYAGE_TEST_SECRET_VERIFY", "sk-verify");
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/transaction/verify/ref-3")
                    .header("authorization", "Bearer sk-verify");
                then.status(200).json_body(json!({"data": {"status": "success", "tx_ref": "ref-3"}}));
            })
            .await;

        let adapter = ChapaAdapter::new(format!("{}/", server.base_url()), "VOYAGE_TEST_SECRET_VERIFY");
        let response = adapter.verify("ref-3").await.unwrap();
        assert_eq!(response.transaction_status(), "success");
    }

    #[tokio::test]
    async fn non_json_success_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/transaction/verify/ref-4");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let adapter = ChapaAdapter::new(server.base_url(), "VOYAGE_TEST_SECRET_UNSET");
        let err = adapter.verify("ref-4").await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let adapter = ChapaAdapter::new("http://127.0.0.1:1", "VOYAGE_TEST_SECRET_UNSET");
        let err = adapter.verify("ref-5").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
