//! Cart and line-item types.

use crate::{MenuItem, OwnerKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item in a cart.
///
/// Name, price, and image are copied from the catalog when the item is
/// added so the cart remains renderable without a catalog round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
	/// Catalog id of the item.
	pub item_id: u64,
	/// Display name at the time the item was added.
	pub name: String,
	/// Unit price at the time the item was added.
	pub unit_price: Decimal,
	/// Quantity, always at least 1. Items drop out of the cart when
	/// their quantity reaches 0.
	pub quantity: u32,
	/// Image reference for display.
	pub image: String,
}

impl CartItem {
	/// Builds a line item from a catalog entry.
	pub fn from_menu_item(item: &MenuItem, quantity: u32) -> Self {
		Self {
			item_id: item.id,
			name: item.name.clone(),
			unit_price: item.price,
			quantity,
			image: item.image.clone(),
		}
	}

	/// Price of this line: unit price times quantity.
	pub fn line_total(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}

/// A mutable per-identity collection of prospective order line items.
///
/// Carts are created empty on first access, cleared (not deleted) after a
/// successful checkout, and persist for the lifetime of their owner key.
/// Item order is insertion order and carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
	/// Identity scope this cart belongs to.
	pub owner_key: OwnerKey,
	/// Line items, in insertion order.
	pub items: Vec<CartItem>,
	/// Timestamp of the last mutation.
	pub updated_at: u64,
}

impl Cart {
	/// Creates an empty cart for the given owner.
	pub fn empty(owner_key: OwnerKey) -> Self {
		Self {
			owner_key,
			items: Vec::new(),
			updated_at: crate::current_timestamp(),
		}
	}

	/// True when the cart holds no items.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Sum of unit price times quantity over all items.
	pub fn subtotal(&self) -> Decimal {
		self.items.iter().map(CartItem::line_total).sum()
	}
}
