//! HTTP server for the storefront API.
//!
//! Builds the axum router over the engine and serves it. Routing and
//! state are kept separate from handler logic (in `apis`) so the router
//! can be exercised in tests without binding a socket.

use axum::{
	routing::{get, post, put},
	Router,
};
use std::sync::Arc;
use storefront_config::ApiConfig;
use storefront_core::StorefrontEngine;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::apis;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the storefront engine for processing requests.
	pub engine: Arc<StorefrontEngine>,
}

/// Builds the API router over the given engine.
pub fn build_router(engine: Arc<StorefrontEngine>) -> Router {
	let state = AppState { engine };

	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/cart", get(apis::cart::get_cart).post(apis::cart::add_item))
				.route(
					"/cart/{item_id}",
					put(apis::cart::update_quantity).delete(apis::cart::remove_item),
				)
				.route(
					"/orders",
					get(apis::orders::list_orders).post(apis::orders::create_order),
				)
				.route("/orders/{id}", get(apis::orders::get_order))
				.route("/orders/{id}/status", put(apis::orders::update_status))
				.route("/orders/{id}/tracking", get(apis::tracking::get_tracking))
				.route("/orders/{id}/driver", put(apis::tracking::update_driver))
				.route(
					"/payments/create-payment-intent",
					post(apis::payments::create_payment_intent),
				),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<StorefrontEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Storefront API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{header, Request, StatusCode};
	use http_body_util::BodyExt;
	use rust_decimal::Decimal;
	use serde_json::{json, Value};
	use storefront_identity::Role;
	use tower::ServiceExt;

	const TEST_CONFIG: &str = r#"
		[store]
		id = "storefront-test"

		[storage]
		primary = "memory"
		[storage.implementations.memory]

		[catalog]
		primary = "memory"
		[catalog.implementations.memory]

		[identity]
		primary = "signed_token"
		[identity.implementations.signed_token]
		secret = "test-secret"

		[payment]
		primary = "mock"
		[payment.implementations.mock]
	"#;

	fn engine() -> Arc<StorefrontEngine> {
		let config = storefront_config::Config::from_toml(TEST_CONFIG).unwrap();
		Arc::new(crate::build_engine(config).unwrap())
	}

	fn token(engine: &StorefrontEngine, subject: &str, role: Role) -> String {
		engine.identity().issue_token(subject, role).unwrap()
	}

	async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
		let response = router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = response.into_body().collect().await.unwrap().to_bytes();
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, body)
	}

	fn get(uri: &str) -> Request<Body> {
		Request::builder().uri(uri).body(Body::empty()).unwrap()
	}

	fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
		Request::builder()
			.method(method)
			.uri(uri)
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	fn with_session(mut request: Request<Body>, session: &str) -> Request<Body> {
		request
			.headers_mut()
			.insert("x-session-id", session.parse().unwrap());
		request
	}

	fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
		request.headers_mut().insert(
			header::AUTHORIZATION,
			format!("Bearer {}", token).parse().unwrap(),
		);
		request
	}

	fn delivery_info() -> Value {
		json!({
			"name": "Ada Lovelace",
			"email": "ada@example.com",
			"phone": "555-0100",
			"address": "12 Analytical Way",
			"city": "London",
			"zipCode": "E1 6AN"
		})
	}

	#[tokio::test]
	async fn cart_requires_some_identity() {
		let router = build_router(engine());
		let (status, _) = send(&router, get("/api/cart")).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn guest_cart_round_trip() {
		let router = build_router(engine());

		let (status, _) = send(
			&router,
			with_session(
				json_request("POST", "/api/cart", json!({"itemId": 1, "quantity": 2})),
				"s-1",
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, body) = send(&router, with_session(get("/api/cart"), "s-1")).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body[0]["quantity"], 2);
	}

	#[tokio::test]
	async fn adding_unknown_item_is_404() {
		let router = build_router(engine());
		let (status, _) = send(
			&router,
			with_session(json_request("POST", "/api/cart", json!({"itemId": 999})), "s-1"),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn invalid_token_is_rejected() {
		let router = build_router(engine());
		let (status, _) = send(&router, with_bearer(get("/api/orders"), "not.a.real.token")).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn guest_checkout_is_401() {
		let router = build_router(engine());
		let request = with_session(
			json_request(
				"POST",
				"/api/orders",
				json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_card_visa"}),
			),
			"s-1",
		);
		let (status, _) = send(&router, request).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn checkout_and_order_flow() {
		let engine = engine();
		let token = token(&engine, "u1", Role::Customer);
		let router = build_router(engine);

		// 12.99 + 14.99 = 27.98 subtotal, free delivery, 8% tax.
		for (item, qty) in [(1, 1), (2, 1)] {
			let (status, _) = send(
				&router,
				with_bearer(
					json_request("POST", "/api/cart", json!({"itemId": item, "quantity": qty})),
					&token,
				),
			)
			.await;
			assert_eq!(status, StatusCode::OK);
		}

		let (status, order) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/orders",
					json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_card_visa"}),
				),
				&token,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(order["status"], "pending");
		assert_eq!(
			order["total"].as_str().unwrap().parse::<Decimal>().unwrap(),
			Decimal::new(3022, 2)
		);

		// Cart is cleared by checkout.
		let (_, cart) = send(&router, with_bearer(get("/api/cart"), &token)).await;
		assert_eq!(cart.as_array().unwrap().len(), 0);

		// Order appears in history and by id.
		let (status, orders) = send(&router, with_bearer(get("/api/orders"), &token)).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(orders.as_array().unwrap().len(), 1);

		let order_id = order["id"].as_str().unwrap();
		let (status, fetched) = send(
			&router,
			with_bearer(get(&format!("/api/orders/{}", order_id)), &token),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(fetched["id"], order["id"]);
	}

	#[tokio::test]
	async fn declined_payment_maps_to_402() {
		let engine = engine();
		let token = token(&engine, "u1", Role::Customer);
		let router = build_router(engine);

		send(
			&router,
			with_bearer(json_request("POST", "/api/cart", json!({"itemId": 1})), &token),
		)
		.await;

		let (status, body) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/orders",
					json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_declined"}),
				),
				&token,
			),
		)
		.await;
		assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
		assert!(body["message"].as_str().unwrap().contains("declined"));
	}

	#[tokio::test]
	async fn orders_are_invisible_across_customers() {
		let engine = engine();
		let alice = token(&engine, "alice", Role::Customer);
		let bob = token(&engine, "bob", Role::Customer);
		let router = build_router(engine);

		send(
			&router,
			with_bearer(json_request("POST", "/api/cart", json!({"itemId": 1})), &alice),
		)
		.await;
		let (_, order) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/orders",
					json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_card_visa"}),
				),
				&alice,
			),
		)
		.await;

		let order_id = order["id"].as_str().unwrap();
		let (status, _) = send(
			&router,
			with_bearer(get(&format!("/api/orders/{}", order_id)), &bob),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn status_updates_are_owner_only() {
		let engine = engine();
		let customer = token(&engine, "u1", Role::Customer);
		let owner = token(&engine, "boss", Role::Owner);
		let router = build_router(engine);

		send(
			&router,
			with_bearer(json_request("POST", "/api/cart", json!({"itemId": 1})), &customer),
		)
		.await;
		let (_, order) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/orders",
					json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_card_visa"}),
				),
				&customer,
			),
		)
		.await;
		let order_id = order["id"].as_str().unwrap().to_string();

		let (status, _) = send(
			&router,
			with_bearer(
				json_request(
					"PUT",
					&format!("/api/orders/{}/status", order_id),
					json!({"status": "preparing"}),
				),
				&customer,
			),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, updated) = send(
			&router,
			with_bearer(
				json_request(
					"PUT",
					&format!("/api/orders/{}/status", order_id),
					json!({"status": "preparing"}),
				),
				&owner,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["status"], "preparing");

		// Backward move violates the timeline.
		let (status, _) = send(
			&router,
			with_bearer(
				json_request(
					"PUT",
					&format!("/api/orders/{}/status", order_id),
					json!({"status": "confirmed"}),
				),
				&owner,
			),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn tracking_is_public_and_falls_back_to_status() {
		let engine = engine();
		let customer = token(&engine, "u1", Role::Customer);
		let owner = token(&engine, "boss", Role::Owner);
		let router = build_router(engine);

		send(
			&router,
			with_bearer(json_request("POST", "/api/cart", json!({"itemId": 1})), &customer),
		)
		.await;
		let (_, order) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/orders",
					json!({"deliveryInfo": delivery_info(), "paymentMethod": "pm_card_visa"}),
				),
				&customer,
			),
		)
		.await;
		let order_id = order["id"].as_str().unwrap().to_string();

		// No credentials, no driver yet: coarse status-only view.
		let (status, tracking) =
			send(&router, get(&format!("/api/orders/{}/tracking", order_id))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(tracking["status"], "pending");
		assert!(tracking.get("driver").is_none());

		// Owner dispatches a driver.
		let (status, _) = send(
			&router,
			with_bearer(
				json_request(
					"PUT",
					&format!("/api/orders/{}/driver", order_id),
					json!({
						"driver": {"name": "Sam", "phone": "555-0199", "vehicle": "Scooter"},
						"etaMinutes": 25
					}),
				),
				&owner,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (_, tracking) =
			send(&router, get(&format!("/api/orders/{}/tracking", order_id))).await;
		assert_eq!(tracking["driver"]["name"], "Sam");
	}

	#[tokio::test]
	async fn tracking_unknown_order_is_404() {
		let router = build_router(engine());
		let (status, _) = send(&router, get("/api/orders/no-such-order/tracking")).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
	}

	#[tokio::test]
	async fn payment_intent_requires_customer_and_positive_amount() {
		let engine = engine();
		let token = token(&engine, "u1", Role::Customer);
		let router = build_router(engine);

		let (status, _) = send(
			&router,
			with_session(
				json_request("POST", "/api/payments/create-payment-intent", json!({"amount": 100})),
				"s-1",
			),
		)
		.await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);

		let (status, _) = send(
			&router,
			with_bearer(
				json_request("POST", "/api/payments/create-payment-intent", json!({"amount": 0})),
				&token,
			),
		)
		.await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		let (status, body) = send(
			&router,
			with_bearer(
				json_request(
					"POST",
					"/api/payments/create-payment-intent",
					json!({"amount": 3129}),
				),
				&token,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert!(body["clientSecret"].as_str().unwrap().contains("_secret_"));
	}
}
