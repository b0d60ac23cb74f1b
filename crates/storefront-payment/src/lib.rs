//! Payment module for the storefront system.
//!
//! Wraps an external payment gateway behind [`PaymentInterface`]. The
//! checkout flow creates a payment intent for the order total, then
//! confirms it with the customer's payment method. A confirmation that
//! fails cleanly is retryable by the customer; a confirmation whose
//! outcome is unknown (for example a timeout after submission) is
//! reported as indeterminate so no order is created against a charge
//! that may or may not have settled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
	/// Error that occurs when the gateway cleanly declines a charge.
	#[error("Payment declined: {0}")]
	Declined(String),
	/// Error that occurs when the outcome of a submitted charge is
	/// unknown.
	#[error("Payment outcome indeterminate: {0}")]
	Indeterminate(String),
	/// Error that occurs when a payment intent cannot be found.
	#[error("Unknown payment intent: {0}")]
	IntentNotFound(String),
	/// Error that occurs talking to the gateway before a charge is
	/// submitted.
	#[error("Gateway error: {0}")]
	Network(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A payment intent created at the gateway for a specific amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
	/// Gateway identifier for the intent.
	pub id: String,
	/// Opaque secret handed to the client to complete the payment.
	pub client_secret: String,
	/// Amount in minor currency units (cents).
	pub amount_minor_units: u64,
}

/// A successfully confirmed payment.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
	/// Gateway reference for the settled charge.
	pub payment_ref: String,
	/// Amount charged in minor currency units.
	pub amount_minor_units: u64,
}

/// Trait defining the interface for payment gateway implementations.
#[async_trait]
pub trait PaymentInterface: Send + Sync {
	/// Returns the configuration schema for this payment implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Creates a payment intent for the given amount.
	async fn create_intent(&self, amount_minor_units: u64) -> Result<PaymentIntent, PaymentError>;

	/// Confirms a payment intent with the customer's payment method.
	async fn confirm(
		&self,
		client_secret: &str,
		payment_method: &str,
	) -> Result<PaymentConfirmation, PaymentError>;
}

/// Type alias for payment factory functions.
pub type PaymentFactory = fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>;

/// Registry trait for payment implementations.
pub trait PaymentRegistry: ImplementationRegistry<Factory = PaymentFactory> {}

/// Get all registered payment implementations.
pub fn get_all_implementations() -> Vec<(&'static str, PaymentFactory)> {
	use implementations::{http, mock};

	vec![
		(mock::Registry::NAME, mock::Registry::factory()),
		(http::Registry::NAME, http::Registry::factory()),
	]
}

/// Service wrapping the configured payment implementation.
pub struct PaymentService {
	implementation: Box<dyn PaymentInterface>,
}

impl PaymentService {
	/// Creates a new PaymentService with the specified implementation.
	pub fn new(implementation: Box<dyn PaymentInterface>) -> Self {
		Self { implementation }
	}

	/// Creates a payment intent for the given amount.
	pub async fn create_intent(
		&self,
		amount_minor_units: u64,
	) -> Result<PaymentIntent, PaymentError> {
		self.implementation.create_intent(amount_minor_units).await
	}

	/// Confirms a payment intent with the customer's payment method.
	pub async fn confirm(
		&self,
		client_secret: &str,
		payment_method: &str,
	) -> Result<PaymentConfirmation, PaymentError> {
		self.implementation
			.confirm(client_secret, payment_method)
			.await
	}
}
