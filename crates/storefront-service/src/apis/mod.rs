//! API handler modules for the storefront HTTP surface.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod tracking;
