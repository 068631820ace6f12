//! Order lifecycle engine.
//!
//! This module contains the [`LifecycleEngine`], the sole writer of order
//! status. Every operation follows the same shape: fetch the order by id,
//! decide the target status from the transition guards, persist the result,
//! and publish an event for observers. Guard rejections are no-ops reported
//! to the caller, never silent mutations.

pub mod event_bus;
pub mod timer;

use event_bus::EventBus;
use once_cell::sync::Lazy;
use orderflow_factory::FactoryService;
use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{
	current_timestamp, truncate_id, Order, OrderEvent, OrderRequest, OrderStatus,
	OrderValidationError, PaymentMethod, StorageKey,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use timer::ShippingTimer;
use tracing::instrument;

/// Orders at or above this amount paid cash on delivery are not warehoused;
/// they are returned to the customer by payment policy.
static COD_REVIEW_THRESHOLD: Lazy<Decimal> = Lazy::new(|| Decimal::from(2500));

/// Errors that can occur during lifecycle operations.
///
/// None of these is fatal to the process: every failure is reported to the
/// caller and leaves prior persisted state untouched.
#[derive(Debug, Error)]
pub enum LifecycleError {
	/// The requested order does not exist in the store.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The creation request violated a validation rule.
	#[error(transparent)]
	Validation(#[from] OrderValidationError),
	/// A transition guard rejected the operation.
	#[error("Cannot {action} order {id} in status {status}")]
	InvalidTransition {
		id: String,
		status: OrderStatus,
		action: &'static str,
	},
	/// The storage collaborator failed.
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Checks if a status transition is allowed by the state machine.
///
/// The event-specific guards in the operations remain the source of
/// decisions; this table is a defense check run before every persist.
fn is_valid_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
	// Static transition table - each state maps to allowed next states
	static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
		let open_targets = HashSet::from([
			OrderStatus::InWarehouse,
			OrderStatus::ReturnedToCustomer,
			OrderStatus::InShipping,
			OrderStatus::Error,
			OrderStatus::Cancelled,
		]);

		let mut m = HashMap::new();
		m.insert(OrderStatus::New, open_targets.clone());
		m.insert(OrderStatus::InWarehouse, open_targets.clone());
		m.insert(OrderStatus::ReturnedToCustomer, open_targets.clone());
		m.insert(OrderStatus::Error, open_targets);
		// Closed is only reachable from InShipping, and a shipping order
		// cannot be cancelled. A warehouse/shipping pass may restart it
		// after an interrupted run.
		m.insert(
			OrderStatus::InShipping,
			HashSet::from([
				OrderStatus::InWarehouse,
				OrderStatus::ReturnedToCustomer,
				OrderStatus::InShipping,
				OrderStatus::Error,
				OrderStatus::Closed,
			]),
		);
		m.insert(OrderStatus::Closed, HashSet::new()); // terminal
		m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
		m
	});

	TRANSITIONS.get(from).is_some_and(|set| set.contains(to))
}

/// Engine enforcing the order status state machine and its guard conditions.
///
/// The engine depends on the store and the factory only through their narrow
/// contracts and is wired together by the [`crate::builder::EngineBuilder`].
pub struct LifecycleEngine {
	/// Storage service for persisting orders.
	storage: Arc<StorageService>,
	/// Factory service for constructing new orders.
	factory: Arc<FactoryService>,
	/// Simulated carrier transit between the shipping writes.
	timer: Arc<dyn ShippingTimer>,
	/// Event bus notified after every persisted change.
	event_bus: EventBus,
}

impl LifecycleEngine {
	/// Creates a new lifecycle engine with the given collaborators.
	pub fn new(
		storage: Arc<StorageService>,
		factory: Arc<FactoryService>,
		timer: Arc<dyn ShippingTimer>,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			factory,
			timer,
			event_bus,
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Validates a creation request, builds the order and persists it.
	///
	/// Any violated validation rule is reported before anything is written.
	#[instrument(skip_all, fields(product = %request.product_name))]
	pub async fn create_order(&self, request: OrderRequest) -> Result<Order, LifecycleError> {
		request.validate()?;

		let order = self.factory.build_order(&request);
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			amount = %order.amount,
			payment = %order.payment,
			"Order created"
		);
		self.event_bus.publish(OrderEvent::Created {
			order: order.clone(),
		});

		Ok(order)
	}

	/// Sends an order to the warehouse.
	///
	/// High-value cash-on-delivery orders are not warehoused: at or above the
	/// review threshold they transition to `ReturnedToCustomer` instead of
	/// `InWarehouse`. Closed and cancelled orders are rejected unchanged.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id)))]
	pub async fn send_to_warehouse(&self, order_id: &str) -> Result<Order, LifecycleError> {
		let order = self.fetch(order_id).await?;
		self.reject_terminal(&order, "modify")?;

		let target = if order.amount >= *COD_REVIEW_THRESHOLD
			&& order.payment == PaymentMethod::CashOnDelivery
		{
			OrderStatus::ReturnedToCustomer
		} else {
			OrderStatus::InWarehouse
		};

		self.transition(order, target).await
	}

	/// Sends an order to shipping.
	///
	/// An order without a delivery address is parked in the `Error` status;
	/// that outcome is persisted and returned as success, not raised as an
	/// engine error. Otherwise the order is persisted as `InShipping`, the
	/// simulated transit runs, and the order is persisted again as `Closed`.
	/// Both writes are observable in sequence by a store observer.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id)))]
	pub async fn send_to_shipping(&self, order_id: &str) -> Result<Order, LifecycleError> {
		let order = self.fetch(order_id).await?;
		self.reject_terminal(&order, "modify")?;

		if order.delivery_address.trim().is_empty() {
			tracing::warn!(
				order_id = %truncate_id(order_id),
				"Missing delivery address, parking order in error status"
			);
			return self.transition(order, OrderStatus::Error).await;
		}

		let order = self.transition(order, OrderStatus::InShipping).await?;
		self.timer.transit().await;
		self.transition(order, OrderStatus::Closed).await
	}

	/// Cancels an order.
	///
	/// Orders that are closed, cancelled, or already shipping cannot be
	/// cancelled; the rejection is a no-op.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id)))]
	pub async fn cancel_order(&self, order_id: &str) -> Result<Order, LifecycleError> {
		let order = self.fetch(order_id).await?;
		self.reject_terminal(&order, "cancel")?;

		if order.status == OrderStatus::InShipping {
			return Err(LifecycleError::InvalidTransition {
				id: order.id,
				status: OrderStatus::InShipping,
				action: "cancel",
			});
		}

		self.transition(order, OrderStatus::Cancelled).await
	}

	/// Removes an order record from the store.
	///
	/// Only closed and cancelled orders may be deleted; orders still in
	/// flight are rejected and the store is untouched.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id)))]
	pub async fn delete_order(&self, order_id: &str) -> Result<(), LifecycleError> {
		let order = self.fetch(order_id).await?;

		if !order.status.is_terminal() {
			return Err(LifecycleError::InvalidTransition {
				id: order.id,
				status: order.status,
				action: "delete",
			});
		}

		self.storage
			.remove(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;

		tracing::info!(order_id = %truncate_id(order_id), "Order deleted");
		self.event_bus.publish(OrderEvent::Deleted {
			order_id: order_id.to_string(),
		});

		Ok(())
	}

	/// Fetches a single order by id.
	pub async fn find_order(&self, order_id: &str) -> Result<Order, LifecycleError> {
		self.fetch(order_id).await
	}

	/// Reads all orders from the store.
	///
	/// The result is sorted by creation time (id as a tiebreaker) for a
	/// stable enumeration. An empty store yields an empty vector.
	pub async fn list_orders(&self) -> Result<Vec<Order>, LifecycleError> {
		let mut orders: Vec<Order> = self
			.storage
			.list(StorageKey::Orders.as_str())
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;

		orders.sort_by(|a, b| {
			a.created_at
				.cmp(&b.created_at)
				.then_with(|| a.id.cmp(&b.id))
		});
		Ok(orders)
	}

	/// Fetches an order by id, mapping a missing record to `NotFound`.
	async fn fetch(&self, order_id: &str) -> Result<Order, LifecycleError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => LifecycleError::NotFound(order_id.to_string()),
				other => LifecycleError::Storage(other.to_string()),
			})
	}

	/// Rejects operations on orders in a terminal status.
	fn reject_terminal(&self, order: &Order, action: &'static str) -> Result<(), LifecycleError> {
		if order.status.is_terminal() {
			return Err(LifecycleError::InvalidTransition {
				id: order.id.clone(),
				status: order.status,
				action,
			});
		}
		Ok(())
	}

	/// Applies a decided transition: persist the new status, then publish.
	async fn transition(
		&self,
		mut order: Order,
		to: OrderStatus,
	) -> Result<Order, LifecycleError> {
		let from = order.status;
		if !is_valid_transition(&from, &to) {
			return Err(LifecycleError::InvalidTransition {
				id: order.id.clone(),
				status: from,
				action: "transition",
			});
		}

		order.status = to;
		order.updated_at = current_timestamp();

		self.storage
			.update(StorageKey::Orders.as_str(), &order.id, &order)
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			from = %from,
			to = %to,
			"Order status changed"
		);
		self.event_bus.publish(OrderEvent::StatusChanged {
			order_id: order.id.clone(),
			from,
			to,
		});

		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_terminal_states_allow_nothing() {
		for to in [
			OrderStatus::New,
			OrderStatus::InWarehouse,
			OrderStatus::InShipping,
			OrderStatus::ReturnedToCustomer,
			OrderStatus::Error,
			OrderStatus::Closed,
			OrderStatus::Cancelled,
		] {
			assert!(!is_valid_transition(&OrderStatus::Closed, &to));
			assert!(!is_valid_transition(&OrderStatus::Cancelled, &to));
		}
	}

	#[test]
	fn test_closed_only_reachable_from_shipping() {
		assert!(is_valid_transition(
			&OrderStatus::InShipping,
			&OrderStatus::Closed
		));
		for from in [
			OrderStatus::New,
			OrderStatus::InWarehouse,
			OrderStatus::ReturnedToCustomer,
			OrderStatus::Error,
		] {
			assert!(!is_valid_transition(&from, &OrderStatus::Closed));
		}
	}

	#[test]
	fn test_shipping_order_cannot_be_cancelled() {
		assert!(!is_valid_transition(
			&OrderStatus::InShipping,
			&OrderStatus::Cancelled
		));
	}

	#[test]
	fn test_open_states_can_cycle_through_warehouse() {
		assert!(is_valid_transition(
			&OrderStatus::New,
			&OrderStatus::InWarehouse
		));
		assert!(is_valid_transition(
			&OrderStatus::InWarehouse,
			&OrderStatus::InWarehouse
		));
		assert!(is_valid_transition(
			&OrderStatus::ReturnedToCustomer,
			&OrderStatus::InWarehouse
		));
		assert!(is_valid_transition(
			&OrderStatus::Error,
			&OrderStatus::Cancelled
		));
	}
}
