//! Checkout coordination.
//!
//! Drives a cart through validation, payment, and order creation in a
//! fixed gate order so the customer always gets the most actionable
//! error first. Payment confirmation is the point of no return: after a
//! settled charge, any failure to record the order produces a
//! reconciliation record instead of silently losing the money.

use crate::event_bus::EventBus;
use crate::pricing::compute_totals;
use std::sync::Arc;
use storefront_cart::CartService;
use storefront_config::PricingConfig;
use storefront_order::OrderLedger;
use storefront_payment::{PaymentError, PaymentService};
use storefront_types::{
	truncate_id, ApiError, DeliveryInfo, Identity, Order, OrderEvent, StorefrontEvent,
};
use thiserror::Error;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
	/// Error that occurs when checking out an empty cart.
	#[error("Cart is empty")]
	EmptyCart,
	/// Error that occurs when a guest attempts to check out.
	#[error("Checkout requires an authenticated customer")]
	AuthenticationRequired,
	/// Error that occurs when delivery information is incomplete.
	#[error("Invalid delivery information")]
	InvalidDeliveryInfo(Vec<String>),
	/// Error that occurs when the charge is declined. Retryable.
	#[error("Payment failed: {0}")]
	PaymentFailed(String),
	/// Error that occurs when the charge outcome is unknown. Not
	/// retryable until resolved out of band.
	#[error("Payment outcome unknown: {0}")]
	PaymentIndeterminate(String),
	/// Error that occurs talking to the payment gateway before any
	/// charge is submitted.
	#[error("Payment gateway unavailable: {0}")]
	Gateway(String),
	/// Error that occurs when the order cannot be recorded after a
	/// successful charge.
	#[error("Order could not be recorded; payment {payment_ref} flagged for reconciliation")]
	OrderCreationFailedAfterPayment { payment_ref: String },
	/// Error that occurs in an underlying service.
	#[error("Service error: {0}")]
	Service(String),
}

impl From<CheckoutError> for ApiError {
	fn from(err: CheckoutError) -> Self {
		match err {
			CheckoutError::EmptyCart => ApiError::Validation {
				message: "Cart is empty".to_string(),
				details: None,
			},
			CheckoutError::AuthenticationRequired => ApiError::Authentication {
				message: "Checkout requires an authenticated customer".to_string(),
			},
			CheckoutError::InvalidDeliveryInfo(fields) => ApiError::Validation {
				message: "Invalid delivery information".to_string(),
				details: Some(serde_json::json!(fields)),
			},
			CheckoutError::PaymentFailed(message) => ApiError::PaymentFailed { message },
			CheckoutError::PaymentIndeterminate(message) => {
				ApiError::PaymentIndeterminate { message }
			},
			CheckoutError::Gateway(message) => ApiError::ExternalService { message },
			CheckoutError::OrderCreationFailedAfterPayment { payment_ref } => {
				ApiError::PaymentIndeterminate {
					message: format!("payment {} captured but order not recorded", payment_ref),
				}
			},
			CheckoutError::Service(message) => ApiError::Internal { message },
		}
	}
}

/// Coordinates the checkout flow from cart to recorded order.
pub struct CheckoutCoordinator {
	cart: Arc<CartService>,
	ledger: Arc<OrderLedger>,
	payment: Arc<PaymentService>,
	pricing: PricingConfig,
	event_bus: EventBus,
}

impl CheckoutCoordinator {
	/// Creates a new CheckoutCoordinator over the given services.
	pub fn new(
		cart: Arc<CartService>,
		ledger: Arc<OrderLedger>,
		payment: Arc<PaymentService>,
		pricing: PricingConfig,
		event_bus: EventBus,
	) -> Self {
		Self {
			cart,
			ledger,
			payment,
			pricing,
			event_bus,
		}
	}

	/// Runs the full checkout flow for the given identity.
	///
	/// Gates are checked in order: authentication, cart contents,
	/// delivery information, then payment. Totals are recomputed from
	/// the stored cart, never taken from the client.
	pub async fn checkout(
		&self,
		identity: &Identity,
		delivery_info: DeliveryInfo,
		payment_method: &str,
	) -> Result<Order, CheckoutError> {
		if !identity.is_authenticated() {
			return Err(CheckoutError::AuthenticationRequired);
		}
		let owner_key = identity.owner_key();

		let cart = self
			.cart
			.get_cart(&owner_key)
			.await
			.map_err(|e| CheckoutError::Service(e.to_string()))?;
		if cart.is_empty() {
			return Err(CheckoutError::EmptyCart);
		}

		if let Err(fields) = delivery_info.validate() {
			return Err(CheckoutError::InvalidDeliveryInfo(fields));
		}

		let totals = compute_totals(cart.subtotal(), &self.pricing);
		let amount = totals.total_minor_units();

		let intent = self
			.payment
			.create_intent(amount)
			.await
			.map_err(|e| CheckoutError::Gateway(e.to_string()))?;

		let confirmation = self
			.payment
			.confirm(&intent.client_secret, payment_method)
			.await
			.map_err(|e| match e {
				PaymentError::Declined(reason) => CheckoutError::PaymentFailed(reason),
				PaymentError::Indeterminate(reason) => CheckoutError::PaymentIndeterminate(reason),
				other => CheckoutError::Gateway(other.to_string()),
			})?;

		let order = match self
			.ledger
			.create_order(
				owner_key.clone(),
				cart.items.clone(),
				delivery_info,
				totals,
				Some(confirmation.payment_ref.clone()),
			)
			.await
		{
			Ok(order) => order,
			Err(e) => {
				tracing::error!(
					payment_ref = %confirmation.payment_ref,
					error = %e,
					"Order creation failed after successful charge"
				);
				match self
					.ledger
					.record_reconciliation(
						&owner_key,
						&confirmation.payment_ref,
						amount,
						"order creation failed after successful charge",
					)
					.await
				{
					Ok(record) => {
						self.event_bus.publish(StorefrontEvent::Order(
							OrderEvent::ReconciliationRequired {
								record_id: record.id,
								payment_ref: confirmation.payment_ref.clone(),
							},
						));
					},
					Err(e) => {
						tracing::error!(
							payment_ref = %confirmation.payment_ref,
							error = %e,
							"Failed to write reconciliation record"
						);
					},
				}
				return Err(CheckoutError::OrderCreationFailedAfterPayment {
					payment_ref: confirmation.payment_ref,
				});
			},
		};

		// The order exists; a stale cart is an inconvenience, not a
		// reason to fail the checkout.
		if let Err(e) = self.cart.clear(&owner_key).await {
			tracing::warn!(
				order_id = %truncate_id(&order.id),
				error = %e,
				"Failed to clear cart after checkout"
			);
		}

		self.event_bus.publish(StorefrontEvent::Order(OrderEvent::Placed {
			order_id: order.id.clone(),
			owner_key: owner_key.to_string(),
			total: order.totals.total,
		}));

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use storefront_catalog::implementations::memory::{MemoryCatalog, MemoryCatalogConfig};
	use storefront_catalog::CatalogService;
	use storefront_payment::implementations::mock::{
		MockPayment, MockPaymentConfig, DECLINED_METHOD, TIMEOUT_METHOD,
	};
	use storefront_storage::implementations::memory::MemoryStorage;
	use storefront_storage::StorageService;
	use storefront_types::{OrderStatus, PaymentStatus};

	struct Fixture {
		coordinator: CheckoutCoordinator,
		cart: Arc<CartService>,
		ledger: Arc<OrderLedger>,
	}

	fn fixture() -> Fixture {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let catalog = Arc::new(CatalogService::new(Box::new(MemoryCatalog::new(
			MemoryCatalogConfig::default(),
		))));
		let cart = Arc::new(CartService::new(storage.clone(), catalog));
		let ledger = Arc::new(OrderLedger::new(storage.clone()));
		let payment = Arc::new(PaymentService::new(Box::new(MockPayment::new(
			MockPaymentConfig::default(),
		))));
		let coordinator = CheckoutCoordinator::new(
			cart.clone(),
			ledger.clone(),
			payment,
			PricingConfig::default(),
			EventBus::default(),
		);
		Fixture {
			coordinator,
			cart,
			ledger,
		}
	}

	fn customer() -> Identity {
		Identity::Customer {
			id: "u1".to_string(),
		}
	}

	fn delivery_info() -> DeliveryInfo {
		DeliveryInfo {
			name: "Ada Lovelace".to_string(),
			email: "ada@example.com".to_string(),
			phone: "555-0100".to_string(),
			address: "12 Analytical Way".to_string(),
			city: "London".to_string(),
			zip_code: "E1 6AN".to_string(),
			instructions: None,
		}
	}

	#[tokio::test]
	async fn successful_checkout_records_order_and_clears_cart() {
		let f = fixture();
		let identity = customer();
		let owner = identity.owner_key();

		// Two pizzas: 25.98 subtotal, free delivery, 8% tax.
		f.cart.add_item(&owner, 1, 2).await.unwrap();
		let order = f
			.coordinator
			.checkout(&identity, delivery_info(), "pm_card_visa")
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.payment_status, PaymentStatus::Paid);
		assert!(order.payment_ref.is_some());
		assert_eq!(order.totals.delivery_fee, rust_decimal::Decimal::ZERO);
		assert_eq!(order.totals.total, rust_decimal::Decimal::new(2806, 2));

		assert!(f.cart.get_cart(&owner).await.unwrap().is_empty());
		let listed = f.ledger.list_orders(&owner).await.unwrap();
		assert_eq!(listed.len(), 1);
	}

	#[tokio::test]
	async fn guests_cannot_check_out() {
		let f = fixture();
		let guest = Identity::Guest {
			session_id: "s1".to_string(),
		};

		assert!(matches!(
			f.coordinator.checkout(&guest, delivery_info(), "pm_card_visa").await,
			Err(CheckoutError::AuthenticationRequired)
		));
	}

	#[tokio::test]
	async fn empty_cart_cannot_check_out() {
		let f = fixture();
		assert!(matches!(
			f.coordinator
				.checkout(&customer(), delivery_info(), "pm_card_visa")
				.await,
			Err(CheckoutError::EmptyCart)
		));
	}

	#[tokio::test]
	async fn invalid_delivery_info_reports_every_field() {
		let f = fixture();
		let identity = customer();
		f.cart.add_item(&identity.owner_key(), 1, 1).await.unwrap();

		let mut info = delivery_info();
		info.name = String::new();
		info.email = "not-an-email".to_string();

		match f.coordinator.checkout(&identity, info, "pm_card_visa").await {
			Err(CheckoutError::InvalidDeliveryInfo(fields)) => {
				assert!(fields.iter().any(|f| f.contains("name")));
				assert!(fields.iter().any(|f| f.contains("email")));
			},
			other => panic!("expected InvalidDeliveryInfo, got {:?}", other.map(|o| o.id)),
		}
	}

	#[tokio::test]
	async fn declined_payment_keeps_the_cart() {
		let f = fixture();
		let identity = customer();
		let owner = identity.owner_key();
		f.cart.add_item(&owner, 1, 1).await.unwrap();

		assert!(matches!(
			f.coordinator
				.checkout(&identity, delivery_info(), DECLINED_METHOD)
				.await,
			Err(CheckoutError::PaymentFailed(_))
		));

		assert!(!f.cart.get_cart(&owner).await.unwrap().is_empty());
		assert!(f.ledger.list_orders(&owner).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn indeterminate_payment_is_distinguished_from_decline() {
		let f = fixture();
		let identity = customer();
		f.cart.add_item(&identity.owner_key(), 1, 1).await.unwrap();

		assert!(matches!(
			f.coordinator
				.checkout(&identity, delivery_info(), TIMEOUT_METHOD)
				.await,
			Err(CheckoutError::PaymentIndeterminate(_))
		));
	}

	#[tokio::test]
	async fn placed_event_is_published() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let catalog = Arc::new(CatalogService::new(Box::new(MemoryCatalog::new(
			MemoryCatalogConfig::default(),
		))));
		let cart = Arc::new(CartService::new(storage.clone(), catalog));
		let ledger = Arc::new(OrderLedger::new(storage.clone()));
		let payment = Arc::new(PaymentService::new(Box::new(MockPayment::new(
			MockPaymentConfig::default(),
		))));
		let bus = EventBus::default();
		let mut rx = bus.subscribe();
		let coordinator = CheckoutCoordinator::new(
			cart.clone(),
			ledger,
			payment,
			PricingConfig::default(),
			bus,
		);

		let identity = customer();
		cart.add_item(&identity.owner_key(), 3, 1).await.unwrap();
		let order = coordinator
			.checkout(&identity, delivery_info(), "pm_card_visa")
			.await
			.unwrap();

		match rx.recv().await.unwrap() {
			StorefrontEvent::Order(OrderEvent::Placed { order_id, .. }) => {
				assert_eq!(order_id, order.id);
			},
			other => panic!("unexpected event: {:?}", other),
		}
	}
}
