//! Cart API handlers.
//!
//! Carts are available to every identity; guests carry theirs under a
//! session id. Mutating handlers return the updated cart so clients can
//! render without a follow-up fetch.

use crate::apis::auth::authenticate;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::HeaderMap,
	response::Json,
};
use serde::Deserialize;
use storefront_cart::CartError;
use storefront_types::{ApiError, Cart, CartItem};

fn default_quantity() -> u32 {
	1
}

/// Body for POST /api/cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
	pub item_id: u64,
	#[serde(default = "default_quantity")]
	pub quantity: u32,
}

/// Body for PUT /api/cart/{itemId}.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
	pub quantity: u32,
}

fn map_cart_error(err: CartError) -> ApiError {
	match err {
		CartError::InvalidQuantity(message) => ApiError::Validation {
			message,
			details: None,
		},
		CartError::MenuItemNotFound(id) => ApiError::NotFound {
			message: format!("Menu item {} not found", id),
		},
		CartError::ItemNotInCart(id) => ApiError::NotFound {
			message: format!("Item {} is not in the cart", id),
		},
		CartError::Storage(e) => ApiError::Internal {
			message: e.to_string(),
		},
		CartError::Catalog(message) => ApiError::Internal { message },
	}
}

/// Handles GET /api/cart requests. Responds with the line items alone;
/// mutating endpoints return the full updated cart.
pub async fn get_cart(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<CartItem>>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	let cart = state
		.engine
		.cart()
		.get_cart(&identity.owner_key())
		.await
		.map_err(map_cart_error)?;
	Ok(Json(cart.items))
}

/// Handles POST /api/cart requests.
pub async fn add_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<AddItemRequest>,
) -> Result<Json<Cart>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	let cart = state
		.engine
		.cart()
		.add_item(&identity.owner_key(), request.item_id, request.quantity)
		.await
		.map_err(map_cart_error)?;
	Ok(Json(cart))
}

/// Handles PUT /api/cart/{itemId} requests.
pub async fn update_quantity(
	State(state): State<AppState>,
	Path(item_id): Path<u64>,
	headers: HeaderMap,
	Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	let cart = state
		.engine
		.cart()
		.update_quantity(&identity.owner_key(), item_id, request.quantity)
		.await
		.map_err(map_cart_error)?;
	Ok(Json(cart))
}

/// Handles DELETE /api/cart/{itemId} requests.
pub async fn remove_item(
	State(state): State<AppState>,
	Path(item_id): Path<u64>,
	headers: HeaderMap,
) -> Result<Json<Cart>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	let cart = state
		.engine
		.cart()
		.remove_item(&identity.owner_key(), item_id)
		.await
		.map_err(map_cart_error)?;
	Ok(Json(cart))
}
