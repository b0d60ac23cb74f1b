//! Request identity resolution and role gating.
//!
//! Every handler resolves the caller through these helpers. A bearer
//! token wins over a session header; a session header alone yields a
//! guest. Which identities are acceptable is the handler's decision.

use crate::server::AppState;
use axum::http::{header, HeaderMap};
use storefront_identity::IdentityError;
use storefront_types::{ApiError, Identity};

const SESSION_HEADER: &str = "x-session-id";

/// Resolves the caller's identity from request headers.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
	let bearer = headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.strip_prefix("Bearer "));
	let session_id = headers
		.get(SESSION_HEADER)
		.and_then(|value| value.to_str().ok());

	state
		.engine
		.identity()
		.resolve(bearer, session_id)
		.await
		.map_err(|e| match e {
			IdentityError::MissingCredentials => ApiError::Authentication {
				message: "Provide a bearer token or session id".to_string(),
			},
			IdentityError::InvalidToken(_) | IdentityError::Expired => ApiError::Authentication {
				message: e.to_string(),
			},
			IdentityError::Configuration(message) => ApiError::Internal { message },
		})
}

/// Requires an authenticated (non-guest) identity.
pub fn require_customer(identity: &Identity) -> Result<(), ApiError> {
	if identity.is_authenticated() {
		Ok(())
	} else {
		Err(ApiError::Authentication {
			message: "This operation requires a signed-in customer".to_string(),
		})
	}
}

/// Requires the store-owner role.
pub fn require_owner(identity: &Identity) -> Result<(), ApiError> {
	if identity.is_owner() {
		Ok(())
	} else {
		Err(ApiError::Authorization {
			message: "This operation requires the store owner role".to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn guests_are_not_customers() {
		let guest = Identity::Guest {
			session_id: "s1".to_string(),
		};
		assert!(require_customer(&guest).is_err());
		assert!(require_owner(&guest).is_err());
	}

	#[test]
	fn customers_are_not_owners() {
		let customer = Identity::Customer {
			id: "u1".to_string(),
		};
		assert!(require_customer(&customer).is_ok());
		assert!(require_owner(&customer).is_err());
	}
}
