//! Main entry point for the storefront service.
//!
//! This binary wires the storefront engine together from configuration
//! and serves the HTTP API: carts, checkout, order history, and delivery
//! tracking. Storage, catalog, identity, and payment implementations are
//! all pluggable and selected by name in the config file.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_config::Config;
use storefront_core::builder::{BuilderError, StorefrontBuilder, StorefrontFactories};
use storefront_core::StorefrontEngine;
use storefront_types::ImplementationRegistry;

mod apis;
mod server;

/// Command-line arguments for the storefront service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started storefront");

	let config = Config::from_file_async(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.store.id);

	let api_config = config.api.clone().unwrap_or_default();
	if !api_config.enabled {
		tracing::warn!("API server disabled in configuration; nothing to serve");
		return Ok(());
	}

	let engine = Arc::new(build_engine(config)?);

	// Log lifecycle events; this is where push notifications would hook
	// in.
	let mut events = engine.event_bus().subscribe();
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(event) => tracing::info!(?event, "Storefront event"),
				Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Notification logger lagged behind event bus");
				},
				Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
			}
		}
	});

	server::start_server(api_config, engine).await?;

	tracing::info!("Stopped storefront");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
	($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
		let mut factories = std::collections::HashMap::new();
		$(
			factories.insert(
				$name.to_string(),
				$factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
			);
		)*
		factories
	}};
}

/// Builds the storefront engine with all available implementations.
pub(crate) fn build_engine(config: Config) -> Result<StorefrontEngine, BuilderError> {
	let storage_factories = create_factory_map!(
		storefront_storage::StorageInterface,
		storefront_storage::StorageError,
		"memory" => (storefront_storage::implementations::memory::Registry::factory()),
		"file" => (storefront_storage::implementations::file::Registry::factory()),
	);

	let catalog_factories = create_factory_map!(
		storefront_catalog::CatalogInterface,
		storefront_catalog::CatalogError,
		"memory" => (storefront_catalog::implementations::memory::Registry::factory()),
	);

	let identity_factories = create_factory_map!(
		storefront_identity::IdentityInterface,
		storefront_identity::IdentityError,
		"signed_token" => (storefront_identity::implementations::signed_token::Registry::factory()),
	);

	let payment_factories = create_factory_map!(
		storefront_payment::PaymentInterface,
		storefront_payment::PaymentError,
		"mock" => (storefront_payment::implementations::mock::Registry::factory()),
		"http" => (storefront_payment::implementations::http::Registry::factory()),
	);

	StorefrontBuilder::new(config).build(StorefrontFactories {
		storage_factories,
		catalog_factories,
		identity_factories,
		payment_factories,
	})
}
