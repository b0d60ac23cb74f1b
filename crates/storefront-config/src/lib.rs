//! Configuration module for the storefront system.
//!
//! This module provides structures and utilities for managing storefront
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set. Pluggable components (storage, catalog, identity,
//! payment) carry their own raw TOML tables, validated later by each
//! implementation's `ConfigSchema`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the storefront.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this storefront instance.
	pub store: StoreConfig,
	/// Pricing rules applied at checkout.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the menu catalog.
	pub catalog: CatalogConfig,
	/// Configuration for identity resolution.
	pub identity: IdentityConfig,
	/// Configuration for the payment gateway.
	pub payment: PaymentConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this storefront instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
	/// Unique identifier for this storefront instance.
	pub id: String,
}

/// Pricing rules applied at checkout.
///
/// Defaults match the published fee schedule: free delivery over $25.00,
/// otherwise a flat $2.99, plus 8% tax on the subtotal.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Flat delivery fee charged below the free-delivery threshold.
	#[serde(default = "default_delivery_fee")]
	pub delivery_fee: Decimal,
	/// Subtotal above which delivery is free (strictly greater than).
	#[serde(default = "default_free_delivery_threshold")]
	pub free_delivery_threshold: Decimal,
	/// Tax rate applied to the subtotal.
	#[serde(default = "default_tax_rate")]
	pub tax_rate: Decimal,
}

fn default_delivery_fee() -> Decimal {
	Decimal::new(299, 2) // 2.99
}

fn default_free_delivery_threshold() -> Decimal {
	Decimal::new(2500, 2) // 25.00
}

fn default_tax_rate() -> Decimal {
	Decimal::new(8, 2) // 0.08
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			delivery_fee: default_delivery_fee(),
			free_delivery_threshold: default_free_delivery_threshold(),
			tax_rate: default_tax_rate(),
		}
	}
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the menu catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of catalog implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for identity resolution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of identity implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the payment gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of payment implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server should be started.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to listen on.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3001
}

impl Config {
	/// Parses configuration from a TOML string and validates it.
	pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads configuration from a file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml(&contents)
	}

	/// Loads configuration from a file without blocking the runtime.
	pub async fn from_file_async(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		Self::from_toml(&contents)
	}

	/// Validates cross-field consistency of the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.store.id.trim().is_empty() {
			return Err(ConfigError::Validation("store.id must not be empty".into()));
		}

		for (section, primary, implementations) in [
			("storage", &self.storage.primary, &self.storage.implementations),
			("catalog", &self.catalog.primary, &self.catalog.implementations),
			("identity", &self.identity.primary, &self.identity.implementations),
			("payment", &self.payment.primary, &self.payment.implementations),
		] {
			if !implementations.contains_key(primary) {
				return Err(ConfigError::Validation(format!(
					"{}.primary '{}' has no matching entry in {}.implementations",
					section, primary, section
				)));
			}
		}

		if self.pricing.tax_rate < Decimal::ZERO || self.pricing.tax_rate >= Decimal::ONE {
			return Err(ConfigError::Validation(
				"pricing.tax_rate must be in [0, 1)".into(),
			));
		}
		if self.pricing.delivery_fee < Decimal::ZERO {
			return Err(ConfigError::Validation(
				"pricing.delivery_fee must not be negative".into(),
			));
		}

		Ok(())
	}
}
