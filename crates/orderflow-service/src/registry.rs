//! Factory registry for the orderflow service.
//!
//! This module collects the factory functions of all available collaborator
//! implementations so the engine builder can instantiate whichever ones the
//! configuration names.

use orderflow_core::EngineFactories;
use orderflow_factory::OrderFactory;
use orderflow_storage::StorageFactory;
use std::collections::HashMap;

/// Builds the factory container with all registered implementations.
pub fn engine_factories() -> EngineFactories<StorageFactory, OrderFactory> {
	let mut storage_factories = HashMap::new();
	for (name, factory) in orderflow_storage::get_all_implementations() {
		tracing::debug!("Registering storage implementation: {}", name);
		storage_factories.insert(name.to_string(), factory);
	}

	let mut factory_factories = HashMap::new();
	for (name, factory) in orderflow_factory::get_all_implementations() {
		tracing::debug!("Registering factory implementation: {}", name);
		factory_factories.insert(name.to_string(), factory);
	}

	EngineFactories {
		storage_factories,
		factory_factories,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_all_implementations_registered() {
		let factories = engine_factories();
		assert!(factories.storage_factories.contains_key("memory"));
		assert!(factories.storage_factories.contains_key("file"));
		assert!(factories.factory_factories.contains_key("standard"));
	}
}
