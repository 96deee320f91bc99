//! # Stripe Payment Intents
//!
//! Creates card PaymentIntents. The returned client secret is handed to the
//! browser, which confirms the payment directly with Stripe.

use crate::config::StripeConfig;
use async_trait::async_trait;
use orbit_core::{Currency, PaymentIntent, PaymentProvider, StorefrontError, StorefrontResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents provider
pub struct StripePaymentIntents {
    config: StripeConfig,
    client: Client,
}

impl StripePaymentIntents {
    pub fn new(config: StripeConfig) -> StorefrontResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorefrontError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> StorefrontResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentIntents {
    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: Currency,
    ) -> StorefrontResult<PaymentIntent> {
        if amount <= 0 {
            return Err(StorefrontError::InvalidRequest(
                "Payment amount must be positive".to_string(),
            ));
        }

        let form_params = [
            ("amount", amount.to_string()),
            ("currency", currency.as_str().to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        debug!("Creating Stripe payment intent: amount={}", amount);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| StorefrontError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorefrontError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(StorefrontError::ProviderError {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            StorefrontError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    client_secret: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> StripePaymentIntents {
        let config = StripeConfig::new("sk_test_abc123").with_api_base_url(server.uri());
        StripePaymentIntents::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_create_payment_intent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("Authorization", "Bearer sk_test_abc123"))
            .and(body_string_contains("amount=4999"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_123",
                "client_secret": "pi_123_secret_456",
                "amount": 4999,
                "currency": "usd"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let intent = provider(&server)
            .await
            .create_payment_intent(4999, Currency::USD)
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_456");
        assert_eq!(intent.amount, 4999);
    }

    #[tokio::test]
    async fn test_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": { "message": "Your card was declined." }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .create_payment_intent(100, Currency::USD)
            .await
            .unwrap_err();

        match err {
            StorefrontError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_positive_amount_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .create_payment_intent(0, Currency::USD)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
