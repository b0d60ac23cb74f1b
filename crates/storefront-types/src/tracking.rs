//! Delivery tracking types.
//!
//! Tracking state is a derived view of an order's physical fulfillment.
//! Before a driver is dispatched there is no tracking record; the order
//! status alone is the (coarser) signal. Clients poll for this state at a
//! fixed interval; there is no push channel.

use crate::OrderStatus;
use serde::{Deserialize, Serialize};

/// Contact details for the assigned delivery driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
	pub name: String,
	pub phone: String,
	pub vehicle: String,
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}

/// Live view of an order's delivery progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingState {
	/// Order this state belongs to.
	pub order_id: String,
	/// Current position on the delivery timeline.
	pub status: OrderStatus,
	/// Assigned driver, absent until dispatch.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub driver: Option<Driver>,
	/// Last reported driver coordinates.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub driver_location: Option<GeoPoint>,
	/// Delivery destination coordinates.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_location: Option<GeoPoint>,
	/// Estimated delivery time as a unix timestamp.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub eta: Option<u64>,
}

impl TrackingState {
	/// Coarse fallback state carrying only the order status, used when no
	/// driver has been dispatched yet.
	pub fn from_status(order_id: &str, status: OrderStatus) -> Self {
		Self {
			order_id: order_id.to_string(),
			status,
			driver: None,
			driver_location: None,
			customer_location: None,
			eta: None,
		}
	}
}
