//! Event bus for broadcasting storefront events.
//!
//! A thin wrapper over a tokio broadcast channel. Publishing never
//! fails: with no subscribers the event is simply dropped, and slow
//! subscribers lose old events rather than blocking producers.

use storefront_types::StorefrontEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1000;

/// Broadcast bus for storefront lifecycle events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<StorefrontEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: StorefrontEvent) {
		// A send error only means nobody is listening right now.
		let _ = self.sender.send(event);
	}

	/// Creates a new subscription to the bus.
	pub fn subscribe(&self) -> broadcast::Receiver<StorefrontEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use storefront_types::TrackingEvent;

	#[tokio::test]
	async fn subscribers_receive_published_events() {
		let bus = EventBus::default();
		let mut rx = bus.subscribe();

		bus.publish(StorefrontEvent::Tracking(TrackingEvent::DriverAssigned {
			order_id: "o1".to_string(),
		}));

		let event = rx.recv().await.unwrap();
		assert!(matches!(
			event,
			StorefrontEvent::Tracking(TrackingEvent::DriverAssigned { .. })
		));
	}

	#[tokio::test]
	async fn publishing_without_subscribers_is_fine() {
		let bus = EventBus::default();
		bus.publish(StorefrontEvent::Tracking(TrackingEvent::LocationUpdated {
			order_id: "o1".to_string(),
		}));
	}
}
