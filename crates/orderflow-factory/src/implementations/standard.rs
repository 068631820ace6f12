//! Standard order factory implementation.
//!
//! Builds order records with a freshly generated UUID identifier, creation
//! timestamps and the initial `New` status.

use crate::{FactoryError, FactoryInterface, OrderFactory};
use orderflow_types::{
	current_timestamp, ConfigSchema, ImplementationRegistry, Order, OrderRequest, OrderStatus,
	Schema, ValidationError,
};
use uuid::Uuid;

/// Standard order factory.
pub struct StandardFactory;

impl FactoryInterface for StandardFactory {
	fn build_order(&self, request: &OrderRequest) -> Order {
		let now = current_timestamp();
		Order {
			id: Uuid::new_v4().to_string(),
			product_name: request.product_name.trim().to_string(),
			amount: request.amount,
			customer: request.customer,
			delivery_address: request.delivery_address.trim().to_string(),
			payment: request.payment,
			status: OrderStatus::New,
			created_at: now,
			updated_at: now,
		}
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StandardFactorySchema)
	}
}

/// Configuration schema for the standard factory.
pub struct StandardFactorySchema;

impl ConfigSchema for StandardFactorySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The standard factory has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Factory function to create a standard order factory from configuration.
///
/// Configuration parameters:
/// - None required for the standard factory
pub fn create_factory(config: &toml::Value) -> Result<Box<dyn FactoryInterface>, FactoryError> {
	StandardFactorySchema
		.validate(config)
		.map_err(|e| FactoryError::Configuration(e.to_string()))?;

	Ok(Box::new(StandardFactory))
}

/// Registry entry for the standard factory implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "standard";
	type Factory = OrderFactory;

	fn factory() -> Self::Factory {
		create_factory
	}
}

impl crate::FactoryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_types::{CustomerType, PaymentMethod};
	use rust_decimal::Decimal;

	fn request() -> OrderRequest {
		OrderRequest {
			product_name: "  Laptop  ".to_string(),
			amount: Decimal::from(1500),
			customer: CustomerType::Company,
			delivery_address: " Main St 1 ".to_string(),
			payment: PaymentMethod::Card,
		}
	}

	#[test]
	fn test_builds_new_order() {
		let order = StandardFactory.build_order(&request());

		assert_eq!(order.status, OrderStatus::New);
		assert_eq!(order.product_name, "Laptop");
		assert_eq!(order.delivery_address, "Main St 1");
		assert_eq!(order.amount, Decimal::from(1500));
		assert_eq!(order.created_at, order.updated_at);
		assert!(!order.id.is_empty());
	}

	#[test]
	fn test_assigns_unique_ids() {
		let a = StandardFactory.build_order(&request());
		let b = StandardFactory.build_order(&request());
		assert_ne!(a.id, b.id);
	}
}
