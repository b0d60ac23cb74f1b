//! Cart module for the storefront system.
//!
//! Holds the pending selection for each owner key. Carts are persisted
//! through the storage service so they survive restarts with a durable
//! backend, and every mutation resolves item details from the catalog
//! rather than trusting client-supplied prices.

use rust_decimal::Decimal;
use std::sync::Arc;
use storefront_catalog::{CatalogError, CatalogService};
use storefront_storage::{StorageError, StorageService};
use storefront_types::{current_timestamp, Cart, CartItem, OwnerKey, StorageKey};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
	/// Error that occurs when a quantity is zero or otherwise unusable.
	#[error("Invalid quantity: {0}")]
	InvalidQuantity(String),
	/// Error that occurs when the referenced menu item does not exist.
	#[error("Menu item not found: {0}")]
	MenuItemNotFound(u64),
	/// Error that occurs when the referenced item is not in the cart.
	#[error("Item not in cart: {0}")]
	ItemNotInCart(u64),
	/// Error that occurs in the storage layer.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	/// Error that occurs in the catalog.
	#[error("Catalog error: {0}")]
	Catalog(String),
}

impl From<CatalogError> for CartError {
	fn from(err: CatalogError) -> Self {
		match err {
			CatalogError::ItemNotFound(id) => CartError::MenuItemNotFound(id),
			other => CartError::Catalog(other.to_string()),
		}
	}
}

/// Service managing cart state for every owner key.
pub struct CartService {
	storage: Arc<StorageService>,
	catalog: Arc<CatalogService>,
}

impl CartService {
	/// Creates a new CartService backed by the given storage and catalog.
	pub fn new(storage: Arc<StorageService>, catalog: Arc<CatalogService>) -> Self {
		Self { storage, catalog }
	}

	/// Returns the cart for the given owner, empty if none has been
	/// stored yet.
	pub async fn get_cart(&self, owner_key: &OwnerKey) -> Result<Cart, CartError> {
		match self
			.storage
			.retrieve::<Cart>(StorageKey::Carts.as_str(), owner_key.as_str())
			.await
		{
			Ok(cart) => Ok(cart),
			Err(StorageError::NotFound) => Ok(Cart::empty(owner_key.clone())),
			Err(e) => Err(e.into()),
		}
	}

	/// Adds a menu item to the cart, accumulating quantity if the item
	/// is already present.
	pub async fn add_item(
		&self,
		owner_key: &OwnerKey,
		item_id: u64,
		quantity: u32,
	) -> Result<Cart, CartError> {
		if quantity == 0 {
			return Err(CartError::InvalidQuantity(
				"quantity must be at least 1".to_string(),
			));
		}

		let menu_item = self.catalog.item(item_id).await?;
		let mut cart = self.get_cart(owner_key).await?;

		match cart.items.iter_mut().find(|line| line.item_id == item_id) {
			Some(line) => line.quantity = line.quantity.saturating_add(quantity),
			None => cart.items.push(CartItem::from_menu_item(&menu_item, quantity)),
		}

		tracing::debug!(owner = %owner_key, item_id, quantity, "Added item to cart");
		self.save(cart).await
	}

	/// Sets the quantity of an item already in the cart. A quantity of
	/// zero removes the line.
	pub async fn update_quantity(
		&self,
		owner_key: &OwnerKey,
		item_id: u64,
		quantity: u32,
	) -> Result<Cart, CartError> {
		if quantity == 0 {
			return self.remove_item(owner_key, item_id).await;
		}

		let mut cart = self.get_cart(owner_key).await?;
		let line = cart
			.items
			.iter_mut()
			.find(|line| line.item_id == item_id)
			.ok_or(CartError::ItemNotInCart(item_id))?;
		line.quantity = quantity;

		self.save(cart).await
	}

	/// Removes an item from the cart. Removing an absent item is a
	/// no-op.
	pub async fn remove_item(
		&self,
		owner_key: &OwnerKey,
		item_id: u64,
	) -> Result<Cart, CartError> {
		let mut cart = self.get_cart(owner_key).await?;
		cart.items.retain(|line| line.item_id != item_id);
		self.save(cart).await
	}

	/// Empties the cart.
	pub async fn clear(&self, owner_key: &OwnerKey) -> Result<Cart, CartError> {
		self.save(Cart::empty(owner_key.clone())).await
	}

	/// Returns the cart subtotal.
	pub async fn subtotal(&self, owner_key: &OwnerKey) -> Result<Decimal, CartError> {
		Ok(self.get_cart(owner_key).await?.subtotal())
	}

	async fn save(&self, mut cart: Cart) -> Result<Cart, CartError> {
		cart.updated_at = current_timestamp();
		self.storage
			.store(StorageKey::Carts.as_str(), cart.owner_key.as_str(), &cart)
			.await?;
		Ok(cart)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use storefront_catalog::implementations::memory::{MemoryCatalog, MemoryCatalogConfig};
	use storefront_storage::implementations::memory::MemoryStorage;

	fn service() -> CartService {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::default())));
		let catalog = Arc::new(CatalogService::new(Box::new(MemoryCatalog::new(
			MemoryCatalogConfig::default(),
		))));
		CartService::new(storage, catalog)
	}

	fn owner() -> OwnerKey {
		OwnerKey::user("u1")
	}

	#[tokio::test]
	async fn missing_cart_reads_as_empty() {
		let service = service();
		let cart = service.get_cart(&owner()).await.unwrap();
		assert!(cart.is_empty());
		assert_eq!(cart.subtotal(), Decimal::ZERO);
	}

	#[tokio::test]
	async fn add_item_accumulates_quantity() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, 1).await.unwrap();
		let cart = service.add_item(&owner, 1, 2).await.unwrap();

		assert_eq!(cart.items.len(), 1);
		assert_eq!(cart.items[0].quantity, 3);
		assert_eq!(cart.subtotal(), Decimal::new(1299, 2) * Decimal::from(3));
	}

	#[tokio::test]
	async fn repeated_adds_saturate_instead_of_overflowing() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, u32::MAX).await.unwrap();
		let cart = service.add_item(&owner, 1, 1).await.unwrap();
		assert_eq!(cart.items[0].quantity, u32::MAX);
	}

	#[tokio::test]
	async fn add_item_rejects_zero_quantity() {
		let service = service();
		assert!(matches!(
			service.add_item(&owner(), 1, 0).await,
			Err(CartError::InvalidQuantity(_))
		));
	}

	#[tokio::test]
	async fn add_item_rejects_unknown_menu_item() {
		let service = service();
		assert!(matches!(
			service.add_item(&owner(), 999, 1).await,
			Err(CartError::MenuItemNotFound(999))
		));
	}

	#[tokio::test]
	async fn update_quantity_replaces_rather_than_accumulates() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, 5).await.unwrap();
		let cart = service.update_quantity(&owner, 1, 2).await.unwrap();
		assert_eq!(cart.items[0].quantity, 2);
	}

	#[tokio::test]
	async fn update_quantity_of_absent_item_is_an_error() {
		let service = service();
		assert!(matches!(
			service.update_quantity(&owner(), 3, 2).await,
			Err(CartError::ItemNotInCart(3))
		));
	}

	#[tokio::test]
	async fn zero_quantity_update_removes_the_line() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, 2).await.unwrap();
		let cart = service.update_quantity(&owner, 1, 0).await.unwrap();
		assert!(cart.is_empty());
	}

	#[tokio::test]
	async fn remove_item_is_idempotent() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, 1).await.unwrap();
		service.remove_item(&owner, 1).await.unwrap();
		let cart = service.remove_item(&owner, 1).await.unwrap();
		assert!(cart.is_empty());
	}

	#[tokio::test]
	async fn carts_are_scoped_by_owner() {
		let service = service();
		let alice = OwnerKey::user("alice");
		let guest = OwnerKey::session("s-123");

		service.add_item(&alice, 1, 1).await.unwrap();
		let guest_cart = service.get_cart(&guest).await.unwrap();
		assert!(guest_cart.is_empty());
	}

	#[tokio::test]
	async fn clear_empties_the_cart() {
		let service = service();
		let owner = owner();

		service.add_item(&owner, 1, 2).await.unwrap();
		service.add_item(&owner, 3, 1).await.unwrap();
		service.clear(&owner).await.unwrap();

		let cart = service.get_cart(&owner).await.unwrap();
		assert!(cart.is_empty());
	}
}
