//! Menu catalog types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable item on a restaurant menu.
///
/// The catalog is the source of truth for item names and prices; carts
/// only ever reference items by id and copy the resolved fields at the
/// time the item is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
	/// Unique identifier of the menu item.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Menu category (e.g. "Pizza", "Burger").
	pub category: String,
	/// Unit price.
	pub price: Decimal,
	/// Image reference for display.
	pub image: String,
	/// Short description shown on the menu page.
	#[serde(default)]
	pub description: String,
	/// Restaurant this item belongs to.
	pub restaurant_id: u64,
}
