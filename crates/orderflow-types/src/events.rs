//! Event types for inter-component communication.
//!
//! This module defines the event system used by the order management system
//! for asynchronous notification of lifecycle changes. Events flow through an
//! event bus allowing observers to react to persisted state changes without
//! participating in them.

use crate::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Events published by the lifecycle engine after a persisted change.
///
/// Every event corresponds to a completed store write; observers never see
/// a state that was not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A new order has been created and stored.
	Created { order: Order },
	/// An order's status has changed and the update has been persisted.
	StatusChanged {
		order_id: String,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// An order has been removed from the store.
	Deleted { order_id: String },
}
