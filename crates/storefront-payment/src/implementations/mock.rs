//! Mock payment implementation for development and tests.
//!
//! Intents live in memory and confirmation outcomes are selected by the
//! payment method token, so tests can exercise every checkout path
//! deterministically: `pm_declined` declines, `pm_timeout` reports an
//! indeterminate outcome, anything else succeeds.

use crate::{
	PaymentConfirmation, PaymentError, PaymentFactory, PaymentIntent, PaymentInterface,
	PaymentRegistry,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use storefront_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Payment method token that always declines.
pub const DECLINED_METHOD: &str = "pm_declined";
/// Payment method token that reports an unknown outcome.
pub const TIMEOUT_METHOD: &str = "pm_timeout";

/// Configuration for the mock payment implementation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MockPaymentConfig {
	/// When set, every confirmation declines regardless of method.
	#[serde(default)]
	pub decline_all: bool,
}

impl ConfigSchema for MockPaymentConfig {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("decline_all", FieldType::Boolean)]);
		schema.validate(config)
	}
}

/// Mock payment implementation.
pub struct MockPayment {
	config: MockPaymentConfig,
	intents: RwLock<HashMap<String, PaymentIntent>>,
}

impl MockPayment {
	/// Creates a new mock payment gateway from the given configuration.
	pub fn new(config: MockPaymentConfig) -> Self {
		Self {
			config,
			intents: RwLock::new(HashMap::new()),
		}
	}
}

#[async_trait]
impl PaymentInterface for MockPayment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	async fn create_intent(&self, amount_minor_units: u64) -> Result<PaymentIntent, PaymentError> {
		let id = format!("pi_{}", Uuid::new_v4().simple());
		let intent = PaymentIntent {
			client_secret: format!("{}_secret_{}", id, Uuid::new_v4().simple()),
			id: id.clone(),
			amount_minor_units,
		};
		self.intents.write().await.insert(intent.client_secret.clone(), intent.clone());
		Ok(intent)
	}

	async fn confirm(
		&self,
		client_secret: &str,
		payment_method: &str,
	) -> Result<PaymentConfirmation, PaymentError> {
		let intent = self
			.intents
			.read()
			.await
			.get(client_secret)
			.cloned()
			.ok_or_else(|| PaymentError::IntentNotFound(client_secret.to_string()))?;

		if self.config.decline_all || payment_method == DECLINED_METHOD {
			return Err(PaymentError::Declined("card declined".to_string()));
		}
		if payment_method == TIMEOUT_METHOD {
			return Err(PaymentError::Indeterminate(
				"confirmation timed out".to_string(),
			));
		}

		self.intents.write().await.remove(client_secret);
		Ok(PaymentConfirmation {
			payment_ref: intent.id,
			amount_minor_units: intent.amount_minor_units,
		})
	}
}

/// Registry for the mock payment implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = PaymentFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn PaymentInterface>, PaymentError> {
			let payment_config: MockPaymentConfig = config
				.clone()
				.try_into()
				.map_err(|e| PaymentError::Configuration(format!("Invalid payment config: {}", e)))?;
			payment_config
				.validate(config)
				.map_err(|e| PaymentError::Configuration(e.to_string()))?;

			Ok(Box::new(MockPayment::new(payment_config)))
		}
	}
}

impl PaymentRegistry for Registry {}
