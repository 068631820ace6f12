//! Order factory module for the orderflow system.
//!
//! This module provides the collaborator that constructs new order records
//! from validated creation requests. The lifecycle engine delegates all
//! construction to a factory implementation; the engine itself never builds
//! an order.

use orderflow_types::{ConfigSchema, ImplementationRegistry, Order, OrderRequest};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod standard;
}

/// Errors that can occur during factory operations.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for order factories.
///
/// A factory receives a creation request that has already passed validation
/// and turns it into a fully formed order record with an assigned identifier,
/// timestamps and the initial `New` status.
pub trait FactoryInterface: Send + Sync {
	/// Builds a new order record from a validated creation request.
	fn build_order(&self, request: &OrderRequest) -> Order;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for factory factory functions.
///
/// This is the function signature that all factory implementations must
/// provide to create instances of their factory interface.
pub type OrderFactory = fn(&toml::Value) -> Result<Box<dyn FactoryInterface>, FactoryError>;

/// Registry trait for factory implementations.
pub trait FactoryRegistry: ImplementationRegistry<Factory = OrderFactory> {}

/// Get all registered factory implementations.
///
/// Returns a vector of (name, factory) tuples for all available factory
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, OrderFactory)> {
	use implementations::standard;

	vec![(standard::Registry::NAME, standard::Registry::factory())]
}

/// High-level factory service wrapping a factory implementation.
pub struct FactoryService {
	/// The underlying factory implementation.
	implementation: Box<dyn FactoryInterface>,
}

impl FactoryService {
	/// Creates a new FactoryService with the specified implementation.
	pub fn new(implementation: Box<dyn FactoryInterface>) -> Self {
		Self { implementation }
	}

	/// Builds a new order record from a validated creation request.
	pub fn build_order(&self, request: &OrderRequest) -> Order {
		self.implementation.build_order(request)
	}
}
