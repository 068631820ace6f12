//! Integration tests for the order lifecycle engine.
//!
//! These tests drive the engine against a recording storage backend so every
//! persisted write is observable, and inject a manual shipping timer so the
//! two-phase shipping transition can be inspected without real time passing.

use async_trait::async_trait;
use orderflow_core::{EventBus, FixedDelayTimer, LifecycleEngine, LifecycleError, ShippingTimer};
use orderflow_factory::{implementations::standard::StandardFactory, FactoryService};
use orderflow_storage::{
	implementations::memory::MemoryStorage, StorageError, StorageInterface, StorageService,
};
use orderflow_types::{
	current_timestamp, ConfigSchema, CustomerType, Order, OrderRequest, OrderStatus,
	OrderValidationError, PaymentMethod, StorageKey,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

/// Storage backend wrapper that records every persisted order state.
struct RecordingStorage {
	inner: MemoryStorage,
	writes: Arc<Mutex<Vec<Order>>>,
}

#[async_trait]
impl StorageInterface for RecordingStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.inner.get_bytes(key).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let order: Order = serde_json::from_slice(&value)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.writes.lock().await.push(order);
		self.inner.set_bytes(key, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.inner.exists(key).await
	}

	async fn list_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		self.inner.list_bytes(prefix).await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		self.inner.config_schema()
	}
}

/// Timer that holds the shipping transition until the test releases it.
struct ManualTimer {
	release: Semaphore,
}

impl ManualTimer {
	fn new() -> Self {
		Self {
			release: Semaphore::new(0),
		}
	}
}

#[async_trait]
impl ShippingTimer for ManualTimer {
	async fn transit(&self) {
		let permit = self.release.acquire().await.expect("timer closed");
		permit.forget();
	}
}

struct Harness {
	engine: LifecycleEngine,
	storage: Arc<StorageService>,
	writes: Arc<Mutex<Vec<Order>>>,
}

impl Harness {
	fn new(timer: Arc<dyn ShippingTimer>) -> Self {
		let writes = Arc::new(Mutex::new(Vec::new()));
		let backend = RecordingStorage {
			inner: MemoryStorage::new(),
			writes: writes.clone(),
		};
		let storage = Arc::new(StorageService::new(Box::new(backend)));
		let factory = Arc::new(FactoryService::new(Box::new(StandardFactory)));
		let engine = LifecycleEngine::new(
			storage.clone(),
			factory,
			timer,
			EventBus::default(),
		);
		Self {
			engine,
			storage,
			writes,
		}
	}

	fn with_zero_delay() -> Self {
		Self::new(Arc::new(FixedDelayTimer::from_seconds(0)))
	}

	/// Seeds an order directly in the store, bypassing the engine.
	async fn seed(
		&self,
		status: OrderStatus,
		amount: i64,
		payment: PaymentMethod,
		address: &str,
	) -> Order {
		let now = current_timestamp();
		let order = Order {
			id: format!("seed-{}", self.writes.lock().await.len()),
			product_name: "Widget".to_string(),
			amount: Decimal::from(amount),
			customer: CustomerType::Individual,
			delivery_address: address.to_string(),
			payment,
			status,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await
			.unwrap();
		order
	}

	async fn write_count(&self) -> usize {
		self.writes.lock().await.len()
	}

	async fn stored(&self, order_id: &str) -> Order {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.unwrap()
	}
}

fn request(amount: i64, payment: PaymentMethod, address: &str) -> OrderRequest {
	OrderRequest {
		product_name: "Widget".to_string(),
		amount: Decimal::from(amount),
		customer: CustomerType::Individual,
		delivery_address: address.to_string(),
		payment,
	}
}

#[tokio::test]
async fn test_create_order_persists_new_order() {
	let h = Harness::with_zero_delay();

	let order = h.engine.create_order(request(2000, PaymentMethod::Card, "Main St")).await.unwrap();

	assert_eq!(order.status, OrderStatus::New);
	assert_eq!(h.stored(&order.id).await, order);
	assert_eq!(h.write_count().await, 1);
}

#[tokio::test]
async fn test_create_order_validation_failure_writes_nothing() {
	let h = Harness::with_zero_delay();

	let result = h.engine.create_order(request(0, PaymentMethod::Card, "Main St")).await;
	assert!(matches!(
		result,
		Err(LifecycleError::Validation(
			OrderValidationError::AmountNotPositive
		))
	));
	assert_eq!(h.write_count().await, 0);

	let result = h.engine.create_order(request(100, PaymentMethod::Card, "  ")).await;
	assert!(matches!(
		result,
		Err(LifecycleError::Validation(
			OrderValidationError::DeliveryAddressRequired
		))
	));
	assert_eq!(h.write_count().await, 0);
}

#[tokio::test]
async fn test_send_to_warehouse_regular_order() {
	let h = Harness::with_zero_delay();
	let order = h.seed(OrderStatus::New, 2000, PaymentMethod::Card, "Main St").await;
	let before = h.write_count().await;

	let updated = h.engine.send_to_warehouse(&order.id).await.unwrap();

	assert_eq!(updated.status, OrderStatus::InWarehouse);
	assert_eq!(h.stored(&order.id).await.status, OrderStatus::InWarehouse);
	assert_eq!(h.write_count().await, before + 1);
}

#[tokio::test]
async fn test_send_to_warehouse_high_value_cod_returned() {
	let h = Harness::with_zero_delay();
	let order = h
		.seed(OrderStatus::New, 3000, PaymentMethod::CashOnDelivery, "Main St")
		.await;
	let before = h.write_count().await;

	let updated = h.engine.send_to_warehouse(&order.id).await.unwrap();

	assert_eq!(updated.status, OrderStatus::ReturnedToCustomer);
	assert_eq!(h.write_count().await, before + 1);
}

#[tokio::test]
async fn test_send_to_warehouse_cod_threshold_is_inclusive() {
	let h = Harness::with_zero_delay();
	let at_threshold = h
		.seed(OrderStatus::New, 2500, PaymentMethod::CashOnDelivery, "Main St")
		.await;
	let updated = h.engine.send_to_warehouse(&at_threshold.id).await.unwrap();
	assert_eq!(updated.status, OrderStatus::ReturnedToCustomer);

	// Same amount paid by card is warehoused normally
	let card = h.seed(OrderStatus::New, 2500, PaymentMethod::Card, "Main St").await;
	let updated = h.engine.send_to_warehouse(&card.id).await.unwrap();
	assert_eq!(updated.status, OrderStatus::InWarehouse);
}

#[tokio::test]
async fn test_send_to_warehouse_missing_order() {
	let h = Harness::with_zero_delay();

	let result = h.engine.send_to_warehouse("missing").await;
	assert!(matches!(result, Err(LifecycleError::NotFound(id)) if id == "missing"));
	assert_eq!(h.write_count().await, 0);
}

#[tokio::test]
async fn test_send_to_warehouse_rejects_terminal_orders() {
	let h = Harness::with_zero_delay();
	for status in [OrderStatus::Closed, OrderStatus::Cancelled] {
		let order = h.seed(status, 100, PaymentMethod::Card, "Main St").await;
		let before = h.write_count().await;

		let result = h.engine.send_to_warehouse(&order.id).await;
		assert!(matches!(
			result,
			Err(LifecycleError::InvalidTransition { .. })
		));
		assert_eq!(h.stored(&order.id).await.status, status);
		assert_eq!(h.write_count().await, before);
	}
}

#[tokio::test]
async fn test_send_to_shipping_missing_address_persists_error_once() {
	let h = Harness::with_zero_delay();
	let order = h.seed(OrderStatus::InWarehouse, 100, PaymentMethod::Card, "").await;
	let before = h.write_count().await;

	let updated = h.engine.send_to_shipping(&order.id).await.unwrap();

	assert_eq!(updated.status, OrderStatus::Error);
	assert_eq!(h.stored(&order.id).await.status, OrderStatus::Error);
	assert_eq!(h.write_count().await, before + 1);
}

#[tokio::test]
async fn test_send_to_shipping_whitespace_address_is_missing() {
	let h = Harness::with_zero_delay();
	let order = h.seed(OrderStatus::New, 100, PaymentMethod::Card, "   ").await;

	let updated = h.engine.send_to_shipping(&order.id).await.unwrap();
	assert_eq!(updated.status, OrderStatus::Error);
}

#[tokio::test]
async fn test_send_to_shipping_two_phase_writes() {
	let timer = Arc::new(ManualTimer::new());
	let h = Harness::new(timer.clone());
	let order = h
		.seed(OrderStatus::InWarehouse, 100, PaymentMethod::Card, "Main St")
		.await;
	let before = h.write_count().await;

	let engine_order_id = order.id.clone();
	let h = Arc::new(h);
	let task_h = h.clone();
	let task =
		tokio::spawn(async move { task_h.engine.send_to_shipping(&engine_order_id).await });

	// The intermediate InShipping state must be observable before the
	// transit completes.
	let mut observed_in_shipping = false;
	for _ in 0..100 {
		if h.stored(&order.id).await.status == OrderStatus::InShipping {
			observed_in_shipping = true;
			break;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	assert!(observed_in_shipping, "InShipping was never observable");

	timer.release.add_permits(1);
	let updated = task.await.unwrap().unwrap();

	assert_eq!(updated.status, OrderStatus::Closed);
	assert_eq!(h.stored(&order.id).await.status, OrderStatus::Closed);
	assert_eq!(h.write_count().await, before + 2);

	let writes = h.writes.lock().await;
	let statuses: Vec<OrderStatus> = writes[before..].iter().map(|o| o.status).collect();
	assert_eq!(statuses, vec![OrderStatus::InShipping, OrderStatus::Closed]);
}

#[tokio::test]
async fn test_send_to_shipping_rejects_terminal_orders() {
	let h = Harness::with_zero_delay();
	for status in [OrderStatus::Closed, OrderStatus::Cancelled] {
		let order = h.seed(status, 100, PaymentMethod::Card, "Main St").await;
		let before = h.write_count().await;

		let result = h.engine.send_to_shipping(&order.id).await;
		assert!(matches!(
			result,
			Err(LifecycleError::InvalidTransition { .. })
		));
		assert_eq!(h.write_count().await, before);
	}
}

#[tokio::test]
async fn test_cancel_order_from_open_states() {
	let h = Harness::with_zero_delay();
	for status in [
		OrderStatus::New,
		OrderStatus::InWarehouse,
		OrderStatus::Error,
		OrderStatus::ReturnedToCustomer,
	] {
		let order = h.seed(status, 100, PaymentMethod::Card, "Main St").await;

		let updated = h.engine.cancel_order(&order.id).await.unwrap();
		assert_eq!(updated.status, OrderStatus::Cancelled);
		assert_eq!(h.stored(&order.id).await.status, OrderStatus::Cancelled);
	}
}

#[tokio::test]
async fn test_cancel_order_rejects_shipping_order() {
	let h = Harness::with_zero_delay();
	let order = h
		.seed(OrderStatus::InShipping, 100, PaymentMethod::Card, "Main St")
		.await;
	let before = h.write_count().await;

	let result = h.engine.cancel_order(&order.id).await;
	assert!(matches!(
		result,
		Err(LifecycleError::InvalidTransition {
			status: OrderStatus::InShipping,
			..
		})
	));
	assert_eq!(h.stored(&order.id).await.status, OrderStatus::InShipping);
	assert_eq!(h.write_count().await, before);
}

#[tokio::test]
async fn test_cancel_order_is_not_idempotent() {
	let h = Harness::with_zero_delay();
	let order = h.seed(OrderStatus::New, 100, PaymentMethod::Card, "Main St").await;

	let updated = h.engine.cancel_order(&order.id).await.unwrap();
	assert_eq!(updated.status, OrderStatus::Cancelled);

	// Second cancel is a rejected no-op
	let before = h.write_count().await;
	let result = h.engine.cancel_order(&order.id).await;
	assert!(matches!(
		result,
		Err(LifecycleError::InvalidTransition { .. })
	));
	assert_eq!(h.stored(&order.id).await.status, OrderStatus::Cancelled);
	assert_eq!(h.write_count().await, before);
}

#[tokio::test]
async fn test_delete_order_only_in_terminal_states() {
	let h = Harness::with_zero_delay();

	for status in [OrderStatus::Closed, OrderStatus::Cancelled] {
		let order = h.seed(status, 100, PaymentMethod::Card, "Main St").await;
		h.engine.delete_order(&order.id).await.unwrap();
		assert!(matches!(
			h.engine.find_order(&order.id).await,
			Err(LifecycleError::NotFound(_))
		));
	}

	for status in [
		OrderStatus::New,
		OrderStatus::InWarehouse,
		OrderStatus::InShipping,
		OrderStatus::ReturnedToCustomer,
		OrderStatus::Error,
	] {
		let order = h.seed(status, 100, PaymentMethod::Card, "Main St").await;
		let result = h.engine.delete_order(&order.id).await;
		assert!(matches!(
			result,
			Err(LifecycleError::InvalidTransition { .. })
		));
		// Still present
		assert_eq!(h.stored(&order.id).await.id, order.id);
	}
}

#[tokio::test]
async fn test_multibyte_order_id_is_reported_not_found() {
	// Operation spans render the order id; with logging enabled, an id
	// typed at the console must not break the rendering even when a
	// character straddles the truncation point.
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::INFO)
		.finish();
	let _guard = tracing::subscriber::set_default(subscriber);

	let h = Harness::with_zero_delay();
	for id in ["aбвгд", "заказ-номер-1", "日本語の注文番号です"] {
		assert!(matches!(
			h.engine.cancel_order(id).await,
			Err(LifecycleError::NotFound(_))
		));
		assert!(matches!(
			h.engine.send_to_warehouse(id).await,
			Err(LifecycleError::NotFound(_))
		));
		assert!(matches!(
			h.engine.send_to_shipping(id).await,
			Err(LifecycleError::NotFound(_))
		));
	}
	assert_eq!(h.write_count().await, 0);
}

#[tokio::test]
async fn test_delete_missing_order() {
	let h = Harness::with_zero_delay();
	let result = h.engine.delete_order("missing").await;
	assert!(matches!(result, Err(LifecycleError::NotFound(_))));
}

#[tokio::test]
async fn test_list_orders_empty_store() {
	let h = Harness::with_zero_delay();
	let orders = h.engine.list_orders().await.unwrap();
	assert!(orders.is_empty());
}

#[tokio::test]
async fn test_list_orders_sorted_and_read_only() {
	let h = Harness::with_zero_delay();
	h.seed(OrderStatus::New, 100, PaymentMethod::Card, "Main St").await;
	h.seed(OrderStatus::InWarehouse, 200, PaymentMethod::Card, "Main St").await;
	h.seed(OrderStatus::Closed, 300, PaymentMethod::Card, "Main St").await;
	let before = h.write_count().await;

	let orders = h.engine.list_orders().await.unwrap();
	assert_eq!(orders.len(), 3);
	assert!(orders
		.windows(2)
		.all(|w| (w[0].created_at, w[0].id.as_str()) <= (w[1].created_at, w[1].id.as_str())));
	// Listing never writes
	assert_eq!(h.write_count().await, before);
}

#[tokio::test]
async fn test_full_lifecycle_to_closed() {
	let h = Harness::with_zero_delay();

	let order = h
		.engine
		.create_order(request(1200, PaymentMethod::CashOnDelivery, "Main St"))
		.await
		.unwrap();

	let order = h.engine.send_to_warehouse(&order.id).await.unwrap();
	assert_eq!(order.status, OrderStatus::InWarehouse);

	let order = h.engine.send_to_shipping(&order.id).await.unwrap();
	assert_eq!(order.status, OrderStatus::Closed);

	h.engine.delete_order(&order.id).await.unwrap();
	assert!(h.engine.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_events_follow_persisted_writes() {
	let h = Harness::with_zero_delay();
	let mut rx = h.engine.event_bus().subscribe();

	let order = h.engine.create_order(request(100, PaymentMethod::Card, "Main St")).await.unwrap();
	h.engine.send_to_warehouse(&order.id).await.unwrap();

	assert!(matches!(
		rx.recv().await.unwrap(),
		orderflow_types::OrderEvent::Created { .. }
	));
	match rx.recv().await.unwrap() {
		orderflow_types::OrderEvent::StatusChanged { order_id, from, to } => {
			assert_eq!(order_id, order.id);
			assert_eq!(from, OrderStatus::New);
			assert_eq!(to, OrderStatus::InWarehouse);
		},
		other => panic!("unexpected event: {:?}", other),
	}
}
