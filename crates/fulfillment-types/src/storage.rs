//! Storage-related types for the fulfillment system.

use std::str::FromStr;

/// Storage keys for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for storing order records
	Orders,
	/// Key for storing per-order status history ledgers
	OrderHistory,
	/// Key for storing collaborative order records
	CollaborativeOrders,
	/// Key for storing collaboration assignment records
	Assignments,
	/// Key mapping (collaborative order, invited vendor) pairs to their
	/// live assignment, guarding duplicate invitations
	AssignmentIndex,
	/// Key for storing scheduler execution bookkeeping
	SchedulerRuns,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::OrderHistory => "order_history",
			StorageKey::CollaborativeOrders => "collaborative_orders",
			StorageKey::Assignments => "assignments",
			StorageKey::AssignmentIndex => "assignment_index",
			StorageKey::SchedulerRuns => "scheduler_runs",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::OrderHistory,
			Self::CollaborativeOrders,
			Self::Assignments,
			Self::AssignmentIndex,
			Self::SchedulerRuns,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"order_history" => Ok(Self::OrderHistory),
			"collaborative_orders" => Ok(Self::CollaborativeOrders),
			"assignments" => Ok(Self::Assignments),
			"assignment_index" => Ok(Self::AssignmentIndex),
			"scheduler_runs" => Ok(Self::SchedulerRuns),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_str() {
		for key in StorageKey::all() {
			assert_eq!(key.as_str().parse::<StorageKey>(), Ok(key));
		}
	}
}
