//! Event bus for broadcasting lifecycle events.
//!
//! The lifecycle engine publishes an event after every persisted change.
//! Delivery is lossy: events are notifications for observers, never part of
//! the transition itself, so a slow or absent subscriber must not block or
//! fail an operation.

use orderflow_types::OrderEvent;
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel carrying [`OrderEvent`]s to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
	/// Creates a new event bus with the given channel capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Send errors (no subscribers) are ignored.
	pub fn publish(&self, event: OrderEvent) {
		let _ = self.sender.send(event);
	}

	/// Creates a new subscription to the event stream.
	pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
