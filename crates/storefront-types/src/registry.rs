//! Registry trait for pluggable implementations.
//!
//! Storage, catalog, identity, and payment backends are all selected by
//! name from configuration. Each implementation registers itself through
//! this trait so the service binary can assemble a factory map without
//! hard-coding the available backends.

/// Trait implemented by each pluggable backend to expose its name and
/// factory function.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this
	/// implementation, e.g. "memory" for `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides. Each
	/// module defines its own factory type (StorageFactory,
	/// PaymentFactory, ...).
	type Factory;

	/// Returns the factory function for creating this implementation.
	fn factory() -> Self::Factory;
}
