//! Identity and ownership-scoping types.
//!
//! Cart and order data is partitioned by an [`OwnerKey`]: authenticated
//! customers own data under their user id, anonymous visitors under a
//! session id. The [`Identity`] resolved from a request determines which
//! key applies and which operations are permitted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition key under which cart and order data is scoped.
///
/// Keys are namespaced to keep guest sessions and authenticated users
/// from ever colliding: `user:{id}` vs `session:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerKey(String);

impl OwnerKey {
	/// Creates an owner key for an authenticated user.
	pub fn user(id: &str) -> Self {
		Self(format!("user:{}", id))
	}

	/// Creates an owner key for an anonymous session.
	pub fn session(id: &str) -> Self {
		Self(format!("session:{}", id))
	}

	/// Returns the string form used in storage keys.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OwnerKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The acting identity resolved for a request.
///
/// Guests may use the cart; checkout and order history require a
/// `Customer`; status and dispatch updates require an `Owner`
/// (restaurant side).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
	/// Anonymous visitor identified only by a session id.
	Guest { session_id: String },
	/// Authenticated customer.
	Customer { id: String },
	/// Authenticated restaurant owner.
	Owner { id: String },
}

impl Identity {
	/// Returns the owner key under which this identity's cart and orders live.
	pub fn owner_key(&self) -> OwnerKey {
		match self {
			Identity::Guest { session_id } => OwnerKey::session(session_id),
			Identity::Customer { id } => OwnerKey::user(id),
			Identity::Owner { id } => OwnerKey::user(id),
		}
	}

	/// True for identities backed by a verified token.
	pub fn is_authenticated(&self) -> bool {
		!matches!(self, Identity::Guest { .. })
	}

	/// True for restaurant-owner identities.
	pub fn is_owner(&self) -> bool {
		matches!(self, Identity::Owner { .. })
	}
}
