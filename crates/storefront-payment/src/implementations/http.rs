//! HTTP payment implementation for Stripe-compatible gateways.
//!
//! Creates and confirms payment intents against the gateway's REST API
//! using form-encoded requests with bearer authentication. Failures are
//! classified carefully: errors before a confirmation is submitted are
//! retryable network errors, while errors after submission are
//! indeterminate because the charge may have settled.

use crate::{
	PaymentConfirmation, PaymentError, PaymentFactory, PaymentIntent, PaymentInterface,
	PaymentRegistry,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use storefront_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_CURRENCY: &str = "usd";
const REQUEST_TIMEOUT_SECONDS: u64 = 15;

/// Configuration for the HTTP payment implementation.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpPaymentConfig {
	/// Gateway API key, sent as a bearer token.
	pub api_key: SecretString,
	/// Gateway base URL.
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// ISO currency code for created intents.
	#[serde(default = "default_currency")]
	pub currency: String,
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_currency() -> String {
	DEFAULT_CURRENCY.to_string()
}

impl ConfigSchema for HttpPaymentConfig {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("api_key", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if !s.is_empty() => Ok(()),
						_ => Err("api_key cannot be empty".to_string()),
					}
				}),
			],
			vec![
				Field::new("base_url", FieldType::String),
				Field::new("currency", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(s) if s.len() == 3 => Ok(()),
						_ => Err("currency must be a three-letter code".to_string()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
	id: String,
	client_secret: String,
	#[serde(default)]
	status: String,
	#[serde(default)]
	amount: u64,
}

/// HTTP payment implementation.
pub struct HttpPayment {
	config: HttpPaymentConfig,
	client: reqwest::Client,
}

impl HttpPayment {
	/// Creates a new HTTP payment gateway from the given configuration.
	pub fn new(config: HttpPaymentConfig) -> Result<Self, PaymentError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
			.build()
			.map_err(|e| PaymentError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
		Ok(Self { config, client })
	}

	/// Recovers the intent id from a client secret of the form
	/// `{intent_id}_secret_{nonce}`.
	fn intent_id(client_secret: &str) -> Result<&str, PaymentError> {
		client_secret
			.split_once("_secret_")
			.map(|(id, _)| id)
			.ok_or_else(|| PaymentError::IntentNotFound(client_secret.to_string()))
	}
}

#[async_trait]
impl PaymentInterface for HttpPayment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	async fn create_intent(&self, amount_minor_units: u64) -> Result<PaymentIntent, PaymentError> {
		let response = self
			.client
			.post(format!("{}/v1/payment_intents", self.config.base_url))
			.bearer_auth(self.config.api_key.expose_secret())
			.form(&[
				("amount", amount_minor_units.to_string()),
				("currency", self.config.currency.clone()),
			])
			.send()
			.await
			.map_err(|e| PaymentError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(PaymentError::Network(format!(
				"intent creation failed with status {}",
				response.status()
			)));
		}

		let intent: IntentResponse = response
			.json()
			.await
			.map_err(|e| PaymentError::Network(format!("malformed intent response: {}", e)))?;

		Ok(PaymentIntent {
			id: intent.id,
			client_secret: intent.client_secret,
			amount_minor_units,
		})
	}

	async fn confirm(
		&self,
		client_secret: &str,
		payment_method: &str,
	) -> Result<PaymentConfirmation, PaymentError> {
		let intent_id = Self::intent_id(client_secret)?;

		let request = self
			.client
			.post(format!(
				"{}/v1/payment_intents/{}/confirm",
				self.config.base_url, intent_id
			))
			.bearer_auth(self.config.api_key.expose_secret())
			.form(&[("payment_method", payment_method)]);

		// Once the request is on the wire the charge may have gone
		// through, so any transport failure here is indeterminate.
		let response = request
			.send()
			.await
			.map_err(|e| PaymentError::Indeterminate(e.to_string()))?;

		let status = response.status();
		if status == reqwest::StatusCode::PAYMENT_REQUIRED || status == reqwest::StatusCode::BAD_REQUEST
		{
			return Err(PaymentError::Declined(format!(
				"gateway declined with status {}",
				status
			)));
		}
		if status == reqwest::StatusCode::NOT_FOUND {
			return Err(PaymentError::IntentNotFound(intent_id.to_string()));
		}
		if status.is_server_error() {
			return Err(PaymentError::Indeterminate(format!(
				"gateway returned status {}",
				status
			)));
		}

		let confirmed: IntentResponse = response
			.json()
			.await
			.map_err(|e| PaymentError::Indeterminate(format!("malformed confirm response: {}", e)))?;

		match confirmed.status.as_str() {
			"succeeded" => {
				tracing::debug!(intent_id = %confirmed.id, "Payment confirmed");
				Ok(PaymentConfirmation {
					payment_ref: confirmed.id,
					amount_minor_units: confirmed.amount,
				})
			},
			"requires_payment_method" => {
				Err(PaymentError::Declined("payment method rejected".to_string()))
			},
			other => Err(PaymentError::Indeterminate(format!(
				"unexpected intent status: {}",
				other
			))),
		}
	}
}

/// Registry for the HTTP payment implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = PaymentFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PaymentInterface>, PaymentError> {
			let payment_config: HttpPaymentConfig = config
				.clone()
				.try_into()
				.map_err(|e| PaymentError::Configuration(format!("Invalid payment config: {}", e)))?;
			payment_config
				.validate(config)
				.map_err(|e| PaymentError::Configuration(e.to_string()))?;

			Ok(Box::new(HttpPayment::new(payment_config)?))
		}
	}
}

impl PaymentRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn intent_id_is_recovered_from_client_secret() {
		assert_eq!(
			HttpPayment::intent_id("pi_abc123_secret_xyz").unwrap(),
			"pi_abc123"
		);
		assert!(HttpPayment::intent_id("not-a-client-secret").is_err());
	}

	#[test]
	fn factory_requires_api_key() {
		let config: toml::Value = toml::from_str("base_url = \"http://localhost:1234\"").unwrap();
		assert!(matches!(
			(Registry::factory())(&config),
			Err(PaymentError::Configuration(_))
		));
	}

	#[test]
	fn factory_rejects_bad_currency() {
		let config: toml::Value =
			toml::from_str("api_key = \"sk_test_123\"\ncurrency = \"dollars\"").unwrap();
		assert!((Registry::factory())(&config).is_err());
	}
}
