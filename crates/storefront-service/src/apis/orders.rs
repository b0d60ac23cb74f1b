//! Order API handlers.
//!
//! POST runs the full checkout flow; the created order is the response.
//! Reads are scoped to the caller's own orders, except that the store
//! owner sees everything. Status updates go through the ledger's state
//! machine and are owner-only.

use crate::apis::auth::{authenticate, require_customer, require_owner};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::HeaderMap,
	response::Json,
};
use serde::Deserialize;
use storefront_order::OrderError;
use storefront_types::{
	ApiError, DeliveryInfo, Order, OrderEvent, OrderStatus, StorefrontEvent,
};

/// Body for POST /api/orders.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
	pub delivery_info: DeliveryInfo,
	pub payment_method: String,
}

/// Body for PUT /api/orders/{id}/status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
	pub status: OrderStatus,
}

fn map_order_error(err: OrderError) -> ApiError {
	match err {
		OrderError::NotFound(_) => ApiError::not_found("Order"),
		OrderError::InvalidTransition { from, to } => ApiError::Validation {
			message: format!("Cannot move order from {} to {}", from, to),
			details: None,
		},
		OrderError::Storage(e) => ApiError::Internal {
			message: e.to_string(),
		},
	}
}

/// Handles POST /api/orders requests.
pub async fn create_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<CheckoutRequest>,
) -> Result<Json<Order>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	let order = state
		.engine
		.checkout()
		.checkout(&identity, request.delivery_info, &request.payment_method)
		.await?;
	Ok(Json(order))
}

/// Handles GET /api/orders requests.
pub async fn list_orders(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	require_customer(&identity)?;

	let orders = state
		.engine
		.ledger()
		.list_orders(&identity.owner_key())
		.await
		.map_err(map_order_error)?;
	Ok(Json(orders))
}

/// Handles GET /api/orders/{id} requests.
pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	require_customer(&identity)?;

	let ledger = state.engine.ledger();
	let order = if identity.is_owner() {
		ledger.get_order(&id).await
	} else {
		ledger.get_order_for_owner(&id, &identity.owner_key()).await
	}
	.map_err(map_order_error)?;
	Ok(Json(order))
}

/// Handles PUT /api/orders/{id}/status requests.
pub async fn update_status(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
	Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	require_owner(&identity)?;

	let order = state
		.engine
		.ledger()
		.update_status(&id, request.status)
		.await
		.map_err(map_order_error)?;

	state
		.engine
		.event_bus()
		.publish(StorefrontEvent::Order(OrderEvent::StatusChanged {
			order_id: order.id.clone(),
			status: order.status,
		}));
	Ok(Json(order))
}
