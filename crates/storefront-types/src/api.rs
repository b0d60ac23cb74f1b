//! API error envelope and HTTP status mapping.
//!
//! Every error leaving the HTTP boundary is one of the variants below,
//! serialized as a `{message, details?}` JSON body. The taxonomy keeps
//! user-correctable validation failures, authentication/authorization
//! problems, missing resources, and external payment-gateway outcomes
//! distinguishable so clients can react differently to each.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON body returned for every API error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Human-readable description.
	pub message: String,
	/// Additional context, e.g. the list of invalid fields.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Bad input, user-correctable (400).
	Validation {
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Missing or invalid token (401).
	Authentication { message: String },
	/// Role or ownership mismatch (403).
	Authorization { message: String },
	/// Missing resource (404).
	NotFound { message: String },
	/// The payment was declined by the gateway (402).
	PaymentFailed { message: String },
	/// Payment outcome unknown; the caller should poll before retrying
	/// rather than risk a double charge (409).
	PaymentIndeterminate { message: String },
	/// The payment gateway was unreachable (502).
	ExternalService { message: String },
	/// Internal server error (500).
	Internal { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::Validation { .. } => 400,
			ApiError::Authentication { .. } => 401,
			ApiError::PaymentFailed { .. } => 402,
			ApiError::Authorization { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::PaymentIndeterminate { .. } => 409,
			ApiError::Internal { .. } => 500,
			ApiError::ExternalService { .. } => 502,
		}
	}

	/// Convert to the JSON error body.
	pub fn to_body(&self) -> ErrorBody {
		match self {
			ApiError::Validation { message, details } => ErrorBody {
				message: message.clone(),
				details: details.clone(),
			},
			ApiError::Authentication { message }
			| ApiError::Authorization { message }
			| ApiError::NotFound { message }
			| ApiError::PaymentFailed { message }
			| ApiError::PaymentIndeterminate { message }
			| ApiError::ExternalService { message }
			| ApiError::Internal { message } => ErrorBody {
				message: message.clone(),
				details: None,
			},
		}
	}

	/// Shorthand for a 404 with a standard message.
	pub fn not_found(what: &str) -> Self {
		ApiError::NotFound {
			message: format!("{} not found", what),
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::Validation { message, .. } => write!(f, "Validation: {}", message),
			ApiError::Authentication { message } => write!(f, "Authentication: {}", message),
			ApiError::Authorization { message } => write!(f, "Authorization: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::PaymentFailed { message } => write!(f, "Payment Failed: {}", message),
			ApiError::PaymentIndeterminate { message } => {
				write!(f, "Payment Indeterminate: {}", message)
			},
			ApiError::ExternalService { message } => write!(f, "External Service: {}", message),
			ApiError::Internal { message } => write!(f, "Internal Server Error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_body())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes_match_taxonomy() {
		assert_eq!(
			ApiError::Validation {
				message: "bad".into(),
				details: None
			}
			.status_code(),
			400
		);
		assert_eq!(
			ApiError::Authentication {
				message: "no token".into()
			}
			.status_code(),
			401
		);
		assert_eq!(
			ApiError::PaymentFailed {
				message: "declined".into()
			}
			.status_code(),
			402
		);
		assert_eq!(ApiError::not_found("Order").status_code(), 404);
		assert_eq!(
			ApiError::ExternalService {
				message: "gateway down".into()
			}
			.status_code(),
			502
		);
	}

	#[test]
	fn body_carries_details_only_for_validation() {
		let err = ApiError::Validation {
			message: "invalid fields".into(),
			details: Some(serde_json::json!(["email"])),
		};
		assert!(err.to_body().details.is_some());

		let err = ApiError::not_found("Order");
		assert!(err.to_body().details.is_none());
	}
}
