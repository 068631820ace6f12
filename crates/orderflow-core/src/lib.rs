//! Core lifecycle engine for the orderflow system.
//!
//! This module owns the order status state machine and its transition rules:
//! which transitions are legal, what side conditions gate each transition,
//! and what the resulting status must be. Storage and order construction are
//! consumed through their narrow collaborator contracts; presentation is the
//! service binary's concern.

pub mod builder;
pub mod engine;

pub use builder::{BuilderError, EngineBuilder, EngineFactories};
pub use engine::event_bus::EventBus;
pub use engine::timer::{FixedDelayTimer, ShippingTimer};
pub use engine::{LifecycleEngine, LifecycleError};
