//! Builder pattern for constructing storefront engines.
//!
//! Composes a StorefrontEngine from pluggable implementations using
//! factory functions keyed by implementation name. Each component picks
//! the implementation named as primary in the configuration.

use crate::checkout::CheckoutCoordinator;
use crate::event_bus::EventBus;
use crate::StorefrontEngine;
use std::collections::HashMap;
use std::sync::Arc;
use storefront_cart::CartService;
use storefront_catalog::{CatalogError, CatalogInterface, CatalogService};
use storefront_config::Config;
use storefront_identity::{IdentityError, IdentityInterface, IdentityService};
use storefront_order::OrderLedger;
use storefront_payment::{PaymentError, PaymentInterface, PaymentService};
use storefront_storage::{StorageError, StorageInterface, StorageService};
use storefront_tracking::TrackingService;
use thiserror::Error;

/// Errors that can occur during storefront engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for all factory functions needed to build a
/// StorefrontEngine.
pub struct StorefrontFactories<SF, CF, IF, PF> {
	pub storage_factories: HashMap<String, SF>,
	pub catalog_factories: HashMap<String, CF>,
	pub identity_factories: HashMap<String, IF>,
	pub payment_factories: HashMap<String, PF>,
}

/// Builder for constructing a StorefrontEngine with pluggable
/// implementations.
pub struct StorefrontBuilder {
	config: Config,
}

impl StorefrontBuilder {
	/// Creates a new StorefrontBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the StorefrontEngine using factories for each component
	/// type.
	pub fn build<SF, CF, IF, PF>(
		self,
		factories: StorefrontFactories<SF, CF, IF, PF>,
	) -> Result<StorefrontEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		CF: Fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>,
		IF: Fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>,
		PF: Fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>,
	{
		let storage_impl = Self::instantiate(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let catalog_impl = Self::instantiate(
			"catalog",
			&self.config.catalog.primary,
			&self.config.catalog.implementations,
			&factories.catalog_factories,
		)?;
		let identity_impl = Self::instantiate(
			"identity",
			&self.config.identity.primary,
			&self.config.identity.implementations,
			&factories.identity_factories,
		)?;
		let payment_impl = Self::instantiate(
			"payment",
			&self.config.payment.primary,
			&self.config.payment.implementations,
			&factories.payment_factories,
		)?;

		let storage = Arc::new(StorageService::new(storage_impl));
		let catalog = Arc::new(CatalogService::new(catalog_impl));
		let identity = Arc::new(IdentityService::new(identity_impl));
		let payment = Arc::new(PaymentService::new(payment_impl));

		let cart = Arc::new(CartService::new(storage.clone(), catalog.clone()));
		let ledger = Arc::new(OrderLedger::new(storage.clone()));
		let tracking = Arc::new(TrackingService::new(storage.clone(), ledger.clone()));

		let event_bus = EventBus::default();
		let checkout = Arc::new(CheckoutCoordinator::new(
			cart.clone(),
			ledger.clone(),
			payment.clone(),
			self.config.pricing.clone(),
			event_bus.clone(),
		));

		Ok(StorefrontEngine {
			config: self.config,
			storage,
			catalog,
			identity,
			payment,
			cart,
			ledger,
			tracking,
			checkout,
			event_bus,
		})
	}

	/// Instantiates the primary implementation of one component.
	fn instantiate<T: ?Sized, E: std::fmt::Display, F>(
		component: &str,
		primary: &str,
		implementations: &HashMap<String, toml::Value>,
		factories: &HashMap<String, F>,
	) -> Result<Box<T>, BuilderError>
	where
		F: Fn(&toml::Value) -> Result<Box<T>, E>,
	{
		let config = implementations.get(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"No configuration for primary {} implementation '{}'",
				component, primary
			))
		})?;
		let factory = factories.get(primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"Unknown {} implementation '{}'",
				component, primary
			))
		})?;

		match factory(config) {
			Ok(implementation) => {
				tracing::info!(component = %component, implementation = %primary, "Loaded");
				Ok(implementation)
			},
			Err(e) => Err(BuilderError::Config(format!(
				"Failed to create {} implementation '{}': {}",
				component, primary, e
			))),
		}
	}
}
