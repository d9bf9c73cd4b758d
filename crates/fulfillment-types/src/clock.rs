//! Clock abstraction for time-dependent logic.
//!
//! The SLA grace period and the customer cancellation window are wall-clock
//! comparisons against persisted timestamps. Components take the clock as a
//! dependency so tests can advance a manual clock instead of sleeping.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of the current time.
pub trait Clock: Send + Sync {
	/// Returns the current instant.
	fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Deterministic clock for tests.
///
/// Stores the current instant as unix milliseconds and only moves when told
/// to, so timer-driven behavior can be exercised without waiting.
#[derive(Debug)]
pub struct ManualClock {
	millis: AtomicI64,
}

impl ManualClock {
	/// Creates a manual clock fixed at the given instant.
	pub fn new(start: DateTime<Utc>) -> Self {
		Self {
			millis: AtomicI64::new(start.timestamp_millis()),
		}
	}

	/// Advances the clock by the given duration.
	pub fn advance(&self, by: Duration) {
		self.millis
			.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
	}

	/// Moves the clock to the given instant.
	pub fn set(&self, to: DateTime<Utc>) {
		self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<Utc> {
		DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn manual_clock_advances() {
		let start = Utc::now();
		let clock = ManualClock::new(start);
		assert_eq!(clock.now().timestamp_millis(), start.timestamp_millis());

		clock.advance(Duration::from_secs(600));
		let elapsed = clock.now().signed_duration_since(start);
		assert_eq!(elapsed.num_seconds(), 600);
	}
}
