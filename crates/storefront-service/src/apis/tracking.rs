//! Delivery tracking API handlers.
//!
//! The tracking view is readable without credentials: order ids are
//! unguessable UUIDs and the view exposes no payment or contact data
//! beyond the driver's. Dispatching a driver and moving them on the map
//! are owner-side operations.

use crate::apis::auth::{authenticate, require_owner};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::HeaderMap,
	response::Json,
};
use serde::Deserialize;
use storefront_tracking::TrackingError;
use storefront_types::{
	ApiError, Driver, GeoPoint, StorefrontEvent, TrackingEvent, TrackingState,
};

/// Body for PUT /api/orders/{id}/driver.
///
/// With a `driver` this dispatches (or re-dispatches) a driver; with
/// only a `driverLocation` it moves the already-assigned driver.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverUpdateRequest {
	pub driver: Option<Driver>,
	pub customer_location: Option<GeoPoint>,
	pub eta_minutes: Option<u64>,
	pub driver_location: Option<GeoPoint>,
}

fn map_tracking_error(err: TrackingError) -> ApiError {
	match err {
		TrackingError::OrderNotFound(_) => ApiError::not_found("Order"),
		TrackingError::DriverNotAssigned(id) => ApiError::Validation {
			message: format!("No driver assigned to order {}", id),
			details: None,
		},
		TrackingError::NotTrackable(id) => ApiError::Validation {
			message: format!("Order {} is no longer in delivery", id),
			details: None,
		},
		TrackingError::Storage(e) => ApiError::Internal {
			message: e.to_string(),
		},
		TrackingError::Ledger(message) => ApiError::Internal { message },
	}
}

/// Handles GET /api/orders/{id}/tracking requests.
pub async fn get_tracking(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<TrackingState>, ApiError> {
	let tracking = state
		.engine
		.tracking()
		.tracking_state(&id)
		.await
		.map_err(map_tracking_error)?;
	Ok(Json(tracking))
}

/// Handles PUT /api/orders/{id}/driver requests.
pub async fn update_driver(
	State(state): State<AppState>,
	Path(id): Path<String>,
	headers: HeaderMap,
	Json(request): Json<DriverUpdateRequest>,
) -> Result<Json<TrackingState>, ApiError> {
	let identity = authenticate(&state, &headers).await?;
	require_owner(&identity)?;

	let tracking = state.engine.tracking();
	let (tracking_state, event) = if let Some(driver) = request.driver {
		let tracking_state = tracking
			.assign_driver(&id, driver, request.customer_location, request.eta_minutes)
			.await
			.map_err(map_tracking_error)?;
		(
			tracking_state,
			TrackingEvent::DriverAssigned {
				order_id: id.clone(),
			},
		)
	} else if let Some(location) = request.driver_location {
		let tracking_state = tracking
			.update_driver_location(&id, location)
			.await
			.map_err(map_tracking_error)?;
		(
			tracking_state,
			TrackingEvent::LocationUpdated {
				order_id: id.clone(),
			},
		)
	} else {
		return Err(ApiError::Validation {
			message: "Provide a driver to assign or a driverLocation to update".to_string(),
			details: None,
		});
	};

	state
		.engine
		.event_bus()
		.publish(StorefrontEvent::Tracking(event));
	Ok(Json(tracking_state))
}
