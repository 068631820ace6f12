//! Common types module for the orderflow system.
//!
//! This module defines the core data types and structures used throughout
//! the order management system. It provides a centralized location for shared
//! types to ensure consistency across all components.

/// Event types for inter-component communication.
pub mod events;
/// Order domain types including the order record, statuses and creation requests.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage types for managing persistent data.
pub mod storage;
/// Utility functions shared across crates.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use events::*;
pub use order::*;
pub use registry::*;
pub use storage::*;
pub use utils::{current_timestamp, truncate_id};
pub use validation::*;
