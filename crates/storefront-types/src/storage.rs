//! Storage-related types for the storefront system.

use std::str::FromStr;

/// Storage keys for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for per-owner cart data.
	Carts,
	/// Key for order records.
	Orders,
	/// Key for the per-owner order id index.
	OrderIndex,
	/// Key for delivery tracking records.
	Tracking,
	/// Key for payment reconciliation records.
	Reconciliation,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Carts => "carts",
			StorageKey::Orders => "orders",
			StorageKey::OrderIndex => "order_index",
			StorageKey::Tracking => "tracking",
			StorageKey::Reconciliation => "reconciliation",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Carts,
			Self::Orders,
			Self::OrderIndex,
			Self::Tracking,
			Self::Reconciliation,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"carts" => Ok(Self::Carts),
			"orders" => Ok(Self::Orders),
			"order_index" => Ok(Self::OrderIndex),
			"tracking" => Ok(Self::Tracking),
			"reconciliation" => Ok(Self::Reconciliation),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
