//! Order, delivery-info, and pricing types.
//!
//! An [`Order`] is an immutable snapshot of a cart plus delivery and
//! payment metadata, created once by the checkout flow. Only its `status`
//! and `updated_at` fields change afterwards, and only through the order
//! ledger.

use crate::{CartItem, OwnerKey};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery contact and address details collected at checkout.
///
/// All fields except `instructions` are required and validated before an
/// order is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
	pub name: String,
	pub email: String,
	pub phone: String,
	pub address: String,
	pub city: String,
	pub zip_code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub instructions: Option<String>,
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
	// Standard address shape; full RFC compliance is not the goal here.
	#[allow(clippy::unwrap_used)]
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

impl DeliveryInfo {
	/// Validates required fields and the email shape.
	///
	/// Returns the full list of missing or invalid field names so the
	/// caller can report them all at once.
	pub fn validate(&self) -> Result<(), Vec<String>> {
		let mut invalid = Vec::new();
		for (field, value) in [
			("name", &self.name),
			("email", &self.email),
			("phone", &self.phone),
			("address", &self.address),
			("city", &self.city),
			("zipCode", &self.zip_code),
		] {
			if value.trim().is_empty() {
				invalid.push(field.to_string());
			}
		}

		if !self.email.trim().is_empty() && !EMAIL_RE.is_match(self.email.trim()) {
			invalid.push("email".to_string());
		}

		if invalid.is_empty() {
			Ok(())
		} else {
			Err(invalid)
		}
	}
}

/// Computed pricing breakdown for one checkout.
///
/// Invariant: `total = subtotal + delivery_fee + tax`, rounded to cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
	pub subtotal: Decimal,
	pub delivery_fee: Decimal,
	pub tax: Decimal,
	pub total: Decimal,
}

impl OrderTotals {
	/// The total expressed in minor currency units (cents), as expected
	/// by payment gateways.
	pub fn total_minor_units(&self) -> u64 {
		use rust_decimal::prelude::ToPrimitive;
		(self.total * Decimal::ONE_HUNDRED)
			.round()
			.to_u64()
			.unwrap_or(0)
	}
}

/// Payment state recorded on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	/// Payment was authorized and captured at checkout.
	Paid,
	/// Payment was returned after an out-of-band refund.
	Refunded,
}

/// Status of an order through its fulfillment lifecycle.
///
/// Orders are created as `Pending`; the restaurant then advances them
/// along `Confirmed`, `Preparing`, `Ready`, `PickedUp`, `OnTheWay`,
/// `Delivered`. `Cancelled` sits outside the timeline and is only
/// reachable before pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Pending,
	Confirmed,
	Preparing,
	Ready,
	PickedUp,
	OnTheWay,
	Delivered,
	Cancelled,
}

impl OrderStatus {
	/// Position on the fulfillment timeline, `None` for `Cancelled`.
	pub fn timeline_position(&self) -> Option<u8> {
		match self {
			OrderStatus::Pending => Some(0),
			OrderStatus::Confirmed => Some(1),
			OrderStatus::Preparing => Some(2),
			OrderStatus::Ready => Some(3),
			OrderStatus::PickedUp => Some(4),
			OrderStatus::OnTheWay => Some(5),
			OrderStatus::Delivered => Some(6),
			OrderStatus::Cancelled => None,
		}
	}

	/// True for states with no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::PickedUp => "picked_up",
			OrderStatus::OnTheWay => "on_the_way",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		};
		write!(f, "{}", s)
	}
}

/// An immutable record of a paid checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Identity scope the order belongs to.
	pub owner_key: OwnerKey,
	/// Snapshot of the cart items at checkout time. Never a live
	/// reference; later cart mutations do not touch it.
	pub items: Vec<CartItem>,
	/// Delivery details collected at checkout.
	pub delivery_info: DeliveryInfo,
	/// Pricing breakdown computed at checkout.
	#[serde(flatten)]
	pub totals: OrderTotals,
	/// Payment state.
	pub payment_status: PaymentStatus,
	/// Gateway reference for the captured payment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_ref: Option<String>,
	/// Current fulfillment status.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: u64,
	/// Timestamp when this order was last updated.
	pub updated_at: u64,
}

/// Record written when a payment was captured but the order could not be
/// created, so the mismatch can be reconciled manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRecord {
	pub id: String,
	pub owner_key: OwnerKey,
	pub payment_ref: String,
	pub amount_minor_units: u64,
	pub reason: String,
	pub created_at: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn info() -> DeliveryInfo {
		DeliveryInfo {
			name: "Ada".into(),
			email: "ada@example.com".into(),
			phone: "555-0100".into(),
			address: "1 Main St".into(),
			city: "Springfield".into(),
			zip_code: "12345".into(),
			instructions: None,
		}
	}

	#[test]
	fn valid_delivery_info_passes() {
		assert!(info().validate().is_ok());
	}

	#[test]
	fn missing_fields_are_all_reported() {
		let mut bad = info();
		bad.name = String::new();
		bad.city = "  ".into();
		let fields = bad.validate().unwrap_err();
		assert_eq!(fields, vec!["name".to_string(), "city".to_string()]);
	}

	#[test]
	fn malformed_email_is_rejected() {
		let mut bad = info();
		bad.email = "not-an-address".into();
		let fields = bad.validate().unwrap_err();
		assert_eq!(fields, vec!["email".to_string()]);
	}

	#[test]
	fn timeline_positions_are_ordered() {
		let line = [
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::Preparing,
			OrderStatus::Ready,
			OrderStatus::PickedUp,
			OrderStatus::OnTheWay,
			OrderStatus::Delivered,
		];
		for pair in line.windows(2) {
			assert!(pair[0].timeline_position() < pair[1].timeline_position());
		}
		assert_eq!(OrderStatus::Cancelled.timeline_position(), None);
	}

	#[test]
	fn total_minor_units_rounds_to_cents() {
		let totals = OrderTotals {
			subtotal: Decimal::new(2897, 2),
			delivery_fee: Decimal::ZERO,
			tax: Decimal::new(23176, 4),
			total: Decimal::new(3129, 2),
		};
		assert_eq!(totals.total_minor_units(), 3129);
	}
}
