//! Delivery tracking module for the storefront system.
//!
//! Tracks the physical side of fulfillment once a driver is dispatched.
//! Until then the ledger's order status is the only signal, and the
//! tracker degrades to a coarse status-only view rather than failing, so
//! polling clients always get an answer for a real order.

use std::sync::Arc;
use storefront_order::{OrderError, OrderLedger};
use storefront_storage::{StorageError, StorageService};
use storefront_types::{
	current_timestamp, truncate_id, Driver, GeoPoint, StorageKey, TrackingState,
};
use thiserror::Error;

/// Errors that can occur during tracking operations.
#[derive(Debug, Error)]
pub enum TrackingError {
	/// Error that occurs when the order being tracked does not exist.
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	/// Error that occurs when a location update arrives before a driver
	/// has been dispatched.
	#[error("No driver assigned to order: {0}")]
	DriverNotAssigned(String),
	/// Error that occurs when the order can no longer be tracked.
	#[error("Order is no longer in delivery: {0}")]
	NotTrackable(String),
	/// Error that occurs in the storage layer.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	/// Error that occurs in the order ledger.
	#[error("Ledger error: {0}")]
	Ledger(String),
}

impl From<OrderError> for TrackingError {
	fn from(err: OrderError) -> Self {
		match err {
			OrderError::NotFound(id) => TrackingError::OrderNotFound(id),
			other => TrackingError::Ledger(other.to_string()),
		}
	}
}

/// Service producing the live delivery view for each order.
pub struct TrackingService {
	storage: Arc<StorageService>,
	ledger: Arc<OrderLedger>,
}

impl TrackingService {
	/// Creates a new TrackingService backed by the given storage and
	/// ledger.
	pub fn new(storage: Arc<StorageService>, ledger: Arc<OrderLedger>) -> Self {
		Self { storage, ledger }
	}

	/// Returns the current tracking state for an order.
	///
	/// The order status from the ledger always wins over whatever status
	/// a stored tracking record carries, so the view never lags behind
	/// the fulfillment timeline.
	pub async fn tracking_state(&self, order_id: &str) -> Result<TrackingState, TrackingError> {
		let order = self.ledger.get_order(order_id).await?;

		match self
			.storage
			.retrieve::<TrackingState>(StorageKey::Tracking.as_str(), order_id)
			.await
		{
			Ok(mut state) => {
				state.status = order.status;
				Ok(state)
			},
			Err(StorageError::NotFound) => Ok(TrackingState::from_status(order_id, order.status)),
			Err(e) => Err(e.into()),
		}
	}

	/// Dispatches a driver for an order.
	pub async fn assign_driver(
		&self,
		order_id: &str,
		driver: Driver,
		customer_location: Option<GeoPoint>,
		eta_minutes: Option<u64>,
	) -> Result<TrackingState, TrackingError> {
		let order = self.ledger.get_order(order_id).await?;
		if order.status.is_terminal() {
			return Err(TrackingError::NotTrackable(order_id.to_string()));
		}

		let state = TrackingState {
			order_id: order_id.to_string(),
			status: order.status,
			driver: Some(driver),
			driver_location: None,
			customer_location,
			eta: eta_minutes.map(|minutes| current_timestamp() + minutes * 60),
		};
		self.storage
			.store(StorageKey::Tracking.as_str(), order_id, &state)
			.await?;

		tracing::info!(order_id = %truncate_id(order_id), "Driver assigned");
		Ok(state)
	}

	/// Records the driver's latest position.
	pub async fn update_driver_location(
		&self,
		order_id: &str,
		location: GeoPoint,
	) -> Result<TrackingState, TrackingError> {
		let mut state = match self
			.storage
			.retrieve::<TrackingState>(StorageKey::Tracking.as_str(), order_id)
			.await
		{
			Ok(state) => state,
			Err(StorageError::NotFound) => {
				return Err(TrackingError::DriverNotAssigned(order_id.to_string()))
			},
			Err(e) => return Err(e.into()),
		};
		if state.driver.is_none() {
			return Err(TrackingError::DriverNotAssigned(order_id.to_string()));
		}

		state.driver_location = Some(location);
		self.storage
			.update(StorageKey::Tracking.as_str(), order_id, &state)
			.await?;
		Ok(state)
	}
}
