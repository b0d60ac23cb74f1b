//! Identity module for the storefront system.
//!
//! Resolves the caller of each request to an [`Identity`]: an anonymous
//! guest carrying a session id, an authenticated customer, or a store
//! owner. Token issuance and verification are pluggable behind
//! [`IdentityInterface`]; the default implementation signs compact
//! tokens with a configured secret.

use async_trait::async_trait;
use std::fmt;
use storefront_types::{ConfigSchema, Identity, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod signed_token;
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
	/// Error that occurs when no credentials accompany a request that
	/// requires them.
	#[error("No credentials provided")]
	MissingCredentials,
	/// Error that occurs when a token is malformed or its signature does
	/// not verify.
	#[error("Invalid token: {0}")]
	InvalidToken(String),
	/// Error that occurs when a token has expired.
	#[error("Token expired")]
	Expired,
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// The role carried by an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	/// A registered customer.
	Customer,
	/// A store owner, permitted to advance order status and dispatch
	/// drivers.
	Owner,
}

impl Role {
	/// Returns the wire representation of this role.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Customer => "customer",
			Role::Owner => "owner",
		}
	}

	/// Parses a wire representation back into a role.
	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"customer" => Some(Role::Customer),
			"owner" => Some(Role::Owner),
			_ => None,
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Trait defining the interface for identity implementations.
#[async_trait]
pub trait IdentityInterface: Send + Sync {
	/// Returns the configuration schema for this identity implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Issues a token for the given subject and role.
	fn issue_token(&self, subject: &str, role: Role) -> Result<String, IdentityError>;

	/// Verifies a token and returns the identity it carries.
	async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// Type alias for identity factory functions.
pub type IdentityFactory = fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>;

/// Registry trait for identity implementations.
pub trait IdentityRegistry: ImplementationRegistry<Factory = IdentityFactory> {}

/// Get all registered identity implementations.
pub fn get_all_implementations() -> Vec<(&'static str, IdentityFactory)> {
	use implementations::signed_token;

	vec![(
		signed_token::Registry::NAME,
		signed_token::Registry::factory(),
	)]
}

/// Service wrapping the configured identity implementation.
pub struct IdentityService {
	implementation: Box<dyn IdentityInterface>,
}

impl IdentityService {
	/// Creates a new IdentityService with the specified implementation.
	pub fn new(implementation: Box<dyn IdentityInterface>) -> Self {
		Self { implementation }
	}

	/// Issues a token for the given subject and role.
	pub fn issue_token(&self, subject: &str, role: Role) -> Result<String, IdentityError> {
		self.implementation.issue_token(subject, role)
	}

	/// Verifies a token and returns the identity it carries.
	pub async fn authenticate(&self, token: &str) -> Result<Identity, IdentityError> {
		self.implementation.authenticate(token).await
	}

	/// Resolves request credentials to an identity.
	///
	/// A bearer token takes precedence over a session id. A session id
	/// alone yields a guest identity. With neither, the caller cannot be
	/// identified at all.
	pub async fn resolve(
		&self,
		bearer: Option<&str>,
		session_id: Option<&str>,
	) -> Result<Identity, IdentityError> {
		if let Some(token) = bearer {
			return self.authenticate(token).await;
		}
		if let Some(session_id) = session_id {
			if !session_id.trim().is_empty() {
				return Ok(Identity::Guest {
					session_id: session_id.to_string(),
				});
			}
		}
		Err(IdentityError::MissingCredentials)
	}
}
