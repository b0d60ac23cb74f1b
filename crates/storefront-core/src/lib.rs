//! Core engine for the storefront system.
//!
//! Wires the pluggable services together and exposes them to the HTTP
//! layer: carts, the order ledger, delivery tracking, identity, payment,
//! and the checkout coordinator that spans them. Construction goes
//! through [`builder::StorefrontBuilder`] so every component is chosen
//! by configuration.

use std::sync::Arc;
use storefront_cart::CartService;
use storefront_catalog::CatalogService;
use storefront_config::Config;
use storefront_identity::IdentityService;
use storefront_order::OrderLedger;
use storefront_payment::PaymentService;
use storefront_storage::StorageService;
use storefront_tracking::TrackingService;

pub mod builder;
pub mod checkout;
pub mod event_bus;
pub mod pricing;

pub use checkout::{CheckoutCoordinator, CheckoutError};
pub use event_bus::EventBus;

/// Main engine holding every storefront service.
pub struct StorefrontEngine {
	/// Storefront configuration.
	config: Config,
	/// Storage service for persisting state.
	storage: Arc<StorageService>,
	/// Catalog service resolving menu items.
	catalog: Arc<CatalogService>,
	/// Identity service resolving request credentials.
	identity: Arc<IdentityService>,
	/// Payment service fronting the gateway.
	payment: Arc<PaymentService>,
	/// Cart service holding pending selections.
	cart: Arc<CartService>,
	/// Order ledger, the system of record for placed orders.
	ledger: Arc<OrderLedger>,
	/// Delivery tracking service.
	tracking: Arc<TrackingService>,
	/// Checkout coordinator spanning cart, payment, and ledger.
	checkout: Arc<CheckoutCoordinator>,
	/// Event bus for lifecycle notifications.
	event_bus: EventBus,
}

impl StorefrontEngine {
	/// Returns the engine configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns the catalog service.
	pub fn catalog(&self) -> &Arc<CatalogService> {
		&self.catalog
	}

	/// Returns the identity service.
	pub fn identity(&self) -> &Arc<IdentityService> {
		&self.identity
	}

	/// Returns the payment service.
	pub fn payment(&self) -> &Arc<PaymentService> {
		&self.payment
	}

	/// Returns the cart service.
	pub fn cart(&self) -> &Arc<CartService> {
		&self.cart
	}

	/// Returns the order ledger.
	pub fn ledger(&self) -> &Arc<OrderLedger> {
		&self.ledger
	}

	/// Returns the tracking service.
	pub fn tracking(&self) -> &Arc<TrackingService> {
		&self.tracking
	}

	/// Returns the checkout coordinator.
	pub fn checkout(&self) -> &Arc<CheckoutCoordinator> {
		&self.checkout
	}

	/// Returns the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}
}
