//! Configuration module for the orderflow system.
//!
//! This module provides structures and utilities for managing the order
//! service configuration. It supports loading configuration from TOML files,
//! resolving environment variable references, and validating that all
//! required configuration values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the order service.
///
/// This structure contains all configuration sections required for the
/// service to operate: service identity, the storage backend, the order
/// factory, and the simulated shipping step.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the order factory.
	pub factory: FactoryConfig,
	/// Configuration for the simulated shipping step.
	#[serde(default)]
	pub shipping: ShippingConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the order factory.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FactoryConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of factory implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the simulated shipping step.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShippingConfig {
	/// Simulated transit time in seconds between the shipping start and
	/// the order being closed. Defaults to 5 seconds if not specified.
	#[serde(default = "default_transit_seconds")]
	pub transit_seconds: u64,
}

impl Default for ShippingConfig {
	fn default() -> Self {
		Self {
			transit_seconds: default_transit_seconds(),
		}
	}
}

/// Returns the default simulated transit time in seconds.
fn default_transit_seconds() -> u64 {
	5
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures the service ID is not empty
	/// - Validates that the primary storage implementation is configured
	/// - Validates that the primary factory implementation is configured
	/// - Checks the shipping transit time is within bounds
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate service config
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate factory config
		if self.factory.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one factory implementation must be configured".into(),
			));
		}
		if self.factory.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Factory primary implementation cannot be empty".into(),
			));
		}
		if !self
			.factory
			.implementations
			.contains_key(&self.factory.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary factory '{}' not found in implementations",
				self.factory.primary
			)));
		}

		// Validate shipping config
		if self.shipping.transit_seconds > 3600 {
			return Err(ConfigError::Validation(
				"Shipping transit_seconds cannot exceed 3600 (1 hour)".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
