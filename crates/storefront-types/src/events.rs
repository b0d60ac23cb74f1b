//! Event types for in-process notification fan-out.
//!
//! Events flow through a broadcast bus so interested parties (currently
//! the service's notification logger) can react to lifecycle changes
//! without the producing component knowing about them. Delivery of push
//! notifications to devices is out of scope; the bus is the seam where
//! that plumbing would attach.

use crate::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main event type encompassing all storefront events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorefrontEvent {
	/// Events from the order lifecycle.
	Order(OrderEvent),
	/// Events from delivery tracking.
	Tracking(TrackingEvent),
}

/// Events related to the order lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A checkout completed and an order was created.
	Placed {
		order_id: String,
		owner_key: String,
		total: Decimal,
	},
	/// An order's fulfillment status changed.
	StatusChanged {
		order_id: String,
		status: OrderStatus,
	},
	/// A payment was captured but the order could not be recorded;
	/// manual reconciliation is required.
	ReconciliationRequired {
		record_id: String,
		payment_ref: String,
	},
}

/// Events related to delivery tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrackingEvent {
	/// A driver was assigned to an order.
	DriverAssigned { order_id: String },
	/// The assigned driver reported a new location.
	LocationUpdated { order_id: String },
}
