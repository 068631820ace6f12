//! Simulated shipping transit timer.
//!
//! The shipping step waits between the `InShipping` write and the `Closed`
//! write. The wait is behind a trait so the engine's decision logic stays
//! testable without real time passing; production wiring uses a fixed
//! tokio sleep configured from `shipping.transit_seconds`.

use async_trait::async_trait;
use std::time::Duration;

/// Abstraction over the simulated carrier transit time.
#[async_trait]
pub trait ShippingTimer: Send + Sync {
	/// Resolves once the simulated transit has completed.
	async fn transit(&self);
}

/// Production timer that sleeps for a fixed duration.
pub struct FixedDelayTimer {
	delay: Duration,
}

impl FixedDelayTimer {
	/// Creates a timer with the given transit duration.
	pub fn new(delay: Duration) -> Self {
		Self { delay }
	}

	/// Creates a timer with a transit duration given in whole seconds.
	pub fn from_seconds(seconds: u64) -> Self {
		Self::new(Duration::from_secs(seconds))
	}
}

#[async_trait]
impl ShippingTimer for FixedDelayTimer {
	async fn transit(&self) {
		tokio::time::sleep(self.delay).await;
	}
}
