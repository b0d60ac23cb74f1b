//! Order ledger module for the storefront system.
//!
//! The ledger is the system of record for placed orders. Orders are
//! immutable except for their fulfillment status, which advances through
//! [`OrderStateMachine`]. A per-owner index keeps order history listable
//! over the key-value storage layer, and reconciliation records capture
//! charges that could not be matched to an order.

use std::sync::Arc;
use storefront_storage::{StorageError, StorageService};
use storefront_types::{
	current_timestamp, truncate_id, CartItem, DeliveryInfo, Order, OrderStatus, OrderTotals,
	OwnerKey, PaymentStatus, ReconciliationRecord, StorageKey,
};
use thiserror::Error;
use uuid::Uuid;

mod state;
pub use state::OrderStateMachine;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// Error that occurs when an order id is unknown or not visible to
	/// the caller.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// Error that occurs when a status change violates the fulfillment
	/// timeline.
	#[error("Invalid status transition: {from} -> {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// Error that occurs in the storage layer.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Service owning order persistence and status progression.
pub struct OrderLedger {
	storage: Arc<StorageService>,
}

impl OrderLedger {
	/// Creates a new OrderLedger backed by the given storage.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Records a newly placed, paid order and returns it.
	pub async fn create_order(
		&self,
		owner_key: OwnerKey,
		items: Vec<CartItem>,
		delivery_info: DeliveryInfo,
		totals: OrderTotals,
		payment_ref: Option<String>,
	) -> Result<Order, OrderError> {
		let now = current_timestamp();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			owner_key,
			items,
			delivery_info,
			totals,
			payment_status: PaymentStatus::Paid,
			payment_ref,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		};

		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;
		self.index_order(&order).await?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			owner = %order.owner_key,
			total = %order.totals.total,
			"Order recorded"
		);
		Ok(order)
	}

	/// Looks up an order by id regardless of owner.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
		self.storage
			.retrieve::<Order>(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderError::NotFound(order_id.to_string()),
				other => other.into(),
			})
	}

	/// Looks up an order by id, visible only to its owner.
	///
	/// An order belonging to someone else reads as not found so order
	/// ids leak nothing across owners.
	pub async fn get_order_for_owner(
		&self,
		order_id: &str,
		owner_key: &OwnerKey,
	) -> Result<Order, OrderError> {
		let order = self.get_order(order_id).await?;
		if &order.owner_key != owner_key {
			return Err(OrderError::NotFound(order_id.to_string()));
		}
		Ok(order)
	}

	/// Returns the owner's orders, newest first.
	pub async fn list_orders(&self, owner_key: &OwnerKey) -> Result<Vec<Order>, OrderError> {
		let ids = self.read_index(owner_key).await?;
		let mut orders = Vec::with_capacity(ids.len());
		for id in ids {
			match self.get_order(&id).await {
				Ok(order) => orders.push(order),
				Err(OrderError::NotFound(_)) => {
					tracing::warn!(order_id = %truncate_id(&id), "Indexed order missing from storage");
				},
				Err(e) => return Err(e),
			}
		}
		Ok(orders)
	}

	/// Advances an order's fulfillment status.
	pub async fn update_status(
		&self,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, OrderError> {
		let mut order = self.get_order(order_id).await?;
		OrderStateMachine::validate_transition(&order.status, &new_status)?;

		tracing::info!(
			order_id = %truncate_id(order_id),
			from = %order.status,
			to = %new_status,
			"Order status updated"
		);
		order.status = new_status;
		order.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;
		Ok(order)
	}

	/// Records a settled charge that has no matching order, for manual
	/// follow-up.
	pub async fn record_reconciliation(
		&self,
		owner_key: &OwnerKey,
		payment_ref: &str,
		amount_minor_units: u64,
		reason: &str,
	) -> Result<ReconciliationRecord, OrderError> {
		let record = ReconciliationRecord {
			id: Uuid::new_v4().to_string(),
			owner_key: owner_key.clone(),
			payment_ref: payment_ref.to_string(),
			amount_minor_units,
			reason: reason.to_string(),
			created_at: current_timestamp(),
		};
		self.storage
			.store(StorageKey::Reconciliation.as_str(), &record.id, &record)
			.await?;
		Ok(record)
	}

	async fn read_index(&self, owner_key: &OwnerKey) -> Result<Vec<String>, OrderError> {
		match self
			.storage
			.retrieve::<Vec<String>>(StorageKey::OrderIndex.as_str(), owner_key.as_str())
			.await
		{
			Ok(ids) => Ok(ids),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(e.into()),
		}
	}

	async fn index_order(&self, order: &Order) -> Result<(), OrderError> {
		let mut ids = self.read_index(&order.owner_key).await?;
		ids.insert(0, order.id.clone());
		self.storage
			.store(
				StorageKey::OrderIndex.as_str(),
				order.owner_key.as_str(),
				&ids,
			)
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use storefront_storage::implementations::memory::MemoryStorage;

	fn ledger() -> OrderLedger {
		OrderLedger::new(Arc::new(StorageService::new(Box::new(
			MemoryStorage::default(),
		))))
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

	fn totals() -> OrderTotals {
		OrderTotals {
			subtotal: Decimal::new(2897, 2),
			delivery_fee: Decimal::ZERO,
			tax: Decimal::new(23176, 4),
			total: Decimal::new(3129, 2),
		}
	}

	fn items() -> Vec<CartItem> {
		vec![CartItem {
			item_id: 1,
			name: "Margherita Pizza".to_string(),
			unit_price: Decimal::new(1299, 2),
			quantity: 2,
			image: String::new(),
		}]
	}

	async fn place(ledger: &OrderLedger, owner: &OwnerKey) -> Order {
		ledger
			.create_order(
				owner.clone(),
				items(),
				delivery_info(),
				totals(),
				Some("pi_test".to_string()),
			)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn created_order_is_retrievable() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		let order = place(&ledger, &owner).await;

		let fetched = ledger.get_order(&order.id).await.unwrap();
		assert_eq!(fetched.id, order.id);
		assert_eq!(fetched.status, OrderStatus::Pending);
		assert_eq!(fetched.payment_status, PaymentStatus::Paid);
	}

	#[tokio::test]
	async fn unknown_order_is_not_found() {
		let ledger = ledger();
		assert!(matches!(
			ledger.get_order("no-such-order").await,
			Err(OrderError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn orders_are_invisible_across_owners() {
		let ledger = ledger();
		let alice = OwnerKey::user("alice");
		let bob = OwnerKey::user("bob");
		let order = place(&ledger, &alice).await;

		assert!(ledger.get_order_for_owner(&order.id, &alice).await.is_ok());
		assert!(matches!(
			ledger.get_order_for_owner(&order.id, &bob).await,
			Err(OrderError::NotFound(_))
		));
	}

	#[tokio::test]
	async fn list_returns_newest_first() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		let first = place(&ledger, &owner).await;
		let second = place(&ledger, &owner).await;

		let orders = ledger.list_orders(&owner).await.unwrap();
		assert_eq!(orders.len(), 2);
		assert_eq!(orders[0].id, second.id);
		assert_eq!(orders[1].id, first.id);
	}

	#[tokio::test]
	async fn list_is_scoped_by_owner() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		place(&ledger, &owner).await;

		let other = ledger.list_orders(&OwnerKey::session("s1")).await.unwrap();
		assert!(other.is_empty());
	}

	#[tokio::test]
	async fn status_advances_forward_only() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		let order = place(&ledger, &owner).await;

		let updated = ledger
			.update_status(&order.id, OrderStatus::Preparing)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Preparing);

		assert!(matches!(
			ledger.update_status(&order.id, OrderStatus::Confirmed).await,
			Err(OrderError::InvalidTransition { .. })
		));
	}

	#[tokio::test]
	async fn delivered_order_is_final() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		let order = place(&ledger, &owner).await;

		ledger
			.update_status(&order.id, OrderStatus::Delivered)
			.await
			.unwrap();
		assert!(ledger
			.update_status(&order.id, OrderStatus::Cancelled)
			.await
			.is_err());
	}

	#[tokio::test]
	async fn reconciliation_records_are_persisted() {
		let ledger = ledger();
		let owner = OwnerKey::user("u1");
		let record = ledger
			.record_reconciliation(&owner, "pi_orphan", 3129, "order write failed")
			.await
			.unwrap();
		assert_eq!(record.payment_ref, "pi_orphan");
		assert_eq!(record.amount_minor_units, 3129);
	}
}
