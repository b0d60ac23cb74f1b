//! Payment API handlers.
//!
//! Exposes intent creation for clients that complete payment directly
//! with the gateway. Checkout itself recomputes the amount server-side;
//! this endpoint only opens an intent.

use crate::apis::auth::{authenticate, require_customer};
use crate::server::AppState;
use axum::{extract::State, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};
use storefront_payment::PaymentError;
use storefront_types::ApiError;

/// Body for POST /api/payments/create-payment-intent.
#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
	/// Amount in minor currency units (cents).
	pub amount: u64,
}

/// Response for POST /api/payments/create-payment-intent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
	pub client_secret: String,
}

fn map_payment_error(err: PaymentError) -> ApiError {
	match err {
		PaymentError::Declined(message) => ApiError::PaymentFailed { message },
		PaymentError::Indeterminate(message) => ApiError::PaymentIndeterminate { message },
		PaymentError::IntentNotFound(_) => ApiError::not_found("Payment intent"),
		PaymentError::Network(message) => ApiError::ExternalService { message },
		PaymentError::Configuration(message) => ApiError::Internal { message },
	}
}

/// Handles POST /api/payments/create-payment-intent requests.
pub async fn create_payment_intent(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	require_customer(&identity)?;

	if request.amount == 0 {
		return Err(ApiError::Validation {
			message: "amount must be greater than zero".to_string(),
			details: None,
		});
	}

	let intent = state
		.engine
		.payment()
		.create_intent(request.amount)
		.await
		.map_err(map_payment_error)?;
	Ok(Json(CreateIntentResponse {
		client_secret: intent.client_secret,
	}))
}
