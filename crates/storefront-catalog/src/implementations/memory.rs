//! In-memory catalog implementation.
//!
//! Serves a fixed menu loaded from configuration, falling back to a small
//! built-in demo menu when none is configured. Suitable for development
//! and tests; a database-backed catalog would implement the same trait.

use crate::{CatalogError, CatalogFactory, CatalogInterface, CatalogRegistry};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use storefront_types::{ConfigSchema, ImplementationRegistry, MenuItem, Schema, ValidationError};

/// Configuration for the in-memory catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalogConfig {
	/// Menu items to serve. When empty, the built-in demo menu is used.
	#[serde(default)]
	pub items: Vec<MenuItem>,
}

impl ConfigSchema for MemoryCatalogConfig {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Items are validated structurally during deserialization.
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)?;

		let mut seen = std::collections::HashSet::new();
		for item in &self.items {
			if !seen.insert(item.id) {
				return Err(ValidationError::InvalidValue {
					field: "items".to_string(),
					message: format!("duplicate menu item id {}", item.id),
				});
			}
		}
		Ok(())
	}
}

/// In-memory catalog implementation.
pub struct MemoryCatalog {
	config: MemoryCatalogConfig,
	items: HashMap<u64, MenuItem>,
}

impl MemoryCatalog {
	/// Creates a new in-memory catalog from the given configuration.
	pub fn new(config: MemoryCatalogConfig) -> Self {
		let source = if config.items.is_empty() {
			demo_menu()
		} else {
			config.items.clone()
		};
		let items: HashMap<u64, MenuItem> =
			source.into_iter().map(|item| (item.id, item)).collect();
		tracing::debug!("Serving {} menu items", items.len());

		Self { config, items }
	}
}

/// The built-in demo menu used when no items are configured.
fn demo_menu() -> Vec<MenuItem> {
	let entry = |id: u64, name: &str, category: &str, cents: i64, restaurant_id: u64| MenuItem {
		id,
		name: name.to_string(),
		category: category.to_string(),
		price: Decimal::new(cents, 2),
		image: format!("assets/images/{}.jpg", name.to_lowercase().replace(' ', "-")),
		description: String::new(),
		restaurant_id,
	};

	vec![
		entry(1, "Margherita Pizza", "Pizza", 1299, 1),
		entry(2, "Pepperoni Pizza", "Pizza", 1499, 1),
		entry(3, "Cheeseburger", "Burger", 999, 2),
		entry(4, "Chicken Burger", "Burger", 1099, 2),
		entry(5, "Spaghetti Carbonara", "Pasta", 1399, 1),
		entry(6, "Caesar Salad", "Salad", 799, 2),
	]
}

#[async_trait]
impl CatalogInterface for MemoryCatalog {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(self.config.clone())
	}

	async fn item(&self, id: u64) -> Result<MenuItem, CatalogError> {
		self.items
			.get(&id)
			.cloned()
			.ok_or(CatalogError::ItemNotFound(id))
	}

	async fn items(&self, restaurant_id: Option<u64>) -> Result<Vec<MenuItem>, CatalogError> {
		let mut items: Vec<MenuItem> = self
			.items
			.values()
			.filter(|item| restaurant_id.is_none_or(|r| item.restaurant_id == r))
			.cloned()
			.collect();
		items.sort_by_key(|item| item.id);
		Ok(items)
	}
}

/// Registry for the in-memory catalog implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = CatalogFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn CatalogInterface>, CatalogError> {
			let catalog_config: MemoryCatalogConfig = config
				.clone()
				.try_into()
				.map_err(|e| CatalogError::Configuration(format!("Invalid catalog config: {}", e)))?;
			catalog_config
				.validate(config)
				.map_err(|e| CatalogError::Configuration(e.to_string()))?;

			Ok(Box::new(MemoryCatalog::new(catalog_config)))
		}
	}
}

impl CatalogRegistry for Registry {}
