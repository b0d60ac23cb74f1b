//! Menu catalog module for the storefront system.
//!
//! The catalog is the source of truth for menu items: carts reference
//! items by id and resolve names, prices, and images here. It follows the
//! same trait-based pattern as the other pluggable components.

use async_trait::async_trait;
use storefront_types::{ConfigSchema, ImplementationRegistry, MenuItem};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs when an item id is unknown to the catalog.
	#[error("Item not found: {0}")]
	ItemNotFound(u64),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// Error that occurs in the catalog backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for catalog implementations.
#[async_trait]
pub trait CatalogInterface: Send + Sync {
	/// Returns the configuration schema for this catalog implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Looks up a single menu item by id.
	async fn item(&self, id: u64) -> Result<MenuItem, CatalogError>;

	/// Returns all menu items, optionally filtered by restaurant.
	async fn items(&self, restaurant_id: Option<u64>) -> Result<Vec<MenuItem>, CatalogError>;
}

/// Type alias for catalog factory functions.
pub type CatalogFactory = fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>;

/// Registry trait for catalog implementations.
pub trait CatalogRegistry: ImplementationRegistry<Factory = CatalogFactory> {}

/// Get all registered catalog implementations.
pub fn get_all_implementations() -> Vec<(&'static str, CatalogFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// Service wrapping the configured catalog implementation.
pub struct CatalogService {
	implementation: Box<dyn CatalogInterface>,
}

impl CatalogService {
	/// Creates a new CatalogService with the specified implementation.
	pub fn new(implementation: Box<dyn CatalogInterface>) -> Self {
		Self { implementation }
	}

	/// Looks up a single menu item by id.
	pub async fn item(&self, id: u64) -> Result<MenuItem, CatalogError> {
		self.implementation.item(id).await
	}

	/// Returns all menu items, optionally filtered by restaurant.
	pub async fn items(&self, restaurant_id: Option<u64>) -> Result<Vec<MenuItem>, CatalogError> {
		self.implementation.items(restaurant_id).await
	}
}
