//! Builder pattern for constructing lifecycle engines.
//!
//! Provides a flexible way to compose a LifecycleEngine from pluggable
//! collaborator implementations using factory functions. The builder
//! instantiates the implementations named by the configuration, keeps the
//! primary of each component, and wires the simulated shipping timer.

use crate::engine::{event_bus::EventBus, timer::FixedDelayTimer, LifecycleEngine};
use orderflow_config::Config;
use orderflow_factory::{FactoryError, FactoryInterface, FactoryService};
use orderflow_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
///
/// These errors indicate problems with configuration or missing required
/// components when building an engine instance.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for all factory functions needed to build a LifecycleEngine.
///
/// This struct holds factory functions for creating implementations of each
/// collaborator the engine requires. Each factory function takes a TOML
/// configuration value and returns the corresponding implementation.
pub struct EngineFactories<SF, FF> {
	pub storage_factories: HashMap<String, SF>,
	pub factory_factories: HashMap<String, FF>,
}

/// Builder for constructing a LifecycleEngine with pluggable implementations.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	/// Creates a new EngineBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the LifecycleEngine using factories for each component type.
	pub fn build<SF, FF>(
		self,
		factories: EngineFactories<SF, FF>,
	) -> Result<LifecycleEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		FF: Fn(&toml::Value) -> Result<Box<dyn FactoryInterface>, FactoryError>,
	{
		// Create storage implementations
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			if let Some(factory) = factories.storage_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						// Validation already happened in the factory
						storage_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.storage.primary == name;
						tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					},
					Err(e) => {
						tracing::error!(
							component = "storage",
							implementation = %name,
							error = %e,
							"Failed to create storage implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create storage implementation '{}': {}",
							name, e
						)));
					},
				}
			}
		}

		if storage_impls.is_empty() {
			return Err(BuilderError::MissingComponent(
				"No valid storage implementations available".into(),
			));
		}

		// Get the primary storage implementation
		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary storage '{}' failed to load or has invalid configuration",
				primary_storage
			))
		})?;

		let storage = Arc::new(StorageService::new(storage_backend));

		// Create factory implementations
		let mut factory_impls = HashMap::new();
		for (name, config) in &self.config.factory.implementations {
			if let Some(factory) = factories.factory_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						factory_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.factory.primary == name;
						tracing::info!(component = "factory", implementation = %name, enabled = %is_primary, "Loaded");
					},
					Err(e) => {
						tracing::error!(
							component = "factory",
							implementation = %name,
							error = %e,
							"Failed to create factory implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create factory implementation '{}': {}",
							name, e
						)));
					},
				}
			}
		}

		if factory_impls.is_empty() {
			return Err(BuilderError::MissingComponent(
				"No valid factory implementations available".into(),
			));
		}

		// Get the primary factory implementation
		let primary_factory = &self.config.factory.primary;
		let factory_impl = factory_impls.remove(primary_factory).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary factory '{}' failed to load or has invalid configuration",
				primary_factory
			))
		})?;

		let factory = Arc::new(FactoryService::new(factory_impl));

		let timer = Arc::new(FixedDelayTimer::from_seconds(
			self.config.shipping.transit_seconds,
		));

		Ok(LifecycleEngine::new(
			storage,
			factory,
			timer,
			EventBus::default(),
		))
	}
}
