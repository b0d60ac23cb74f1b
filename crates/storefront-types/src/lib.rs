//! Common types module for the storefront system.
//!
//! This module defines the core data types and structures used throughout
//! the storefront. It provides a centralized location for shared types
//! to ensure consistency across all components.

/// API error envelope and HTTP status mapping.
pub mod api;
/// Cart and line-item types.
pub mod cart;
/// Menu catalog types.
pub mod catalog;
/// Event types for in-process notification fan-out.
pub mod events;
/// Identity and ownership-scoping types.
pub mod identity;
/// Order, delivery-info, and pricing types.
pub mod order;
/// Secure string type for secrets.
pub mod secret_string;
/// Storage key types for persistent data.
pub mod storage;
/// Delivery tracking types.
pub mod tracking;
/// Small shared helpers.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;
/// Registry trait for pluggable implementations.
pub mod registry;

// Re-export all types for convenient access
pub use api::*;
pub use cart::*;
pub use catalog::*;
pub use events::*;
pub use identity::*;
pub use order::*;
pub use registry::*;
pub use secret_string::*;
pub use storage::*;
pub use tracking::*;
pub use utils::*;
pub use validation::*;
