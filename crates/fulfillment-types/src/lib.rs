//! Shared types for the order fulfillment system.
//!
//! This crate defines the domain entities that flow between the fulfillment
//! components: orders and their lifecycle states, the actors that may act on
//! them, the status history ledger, collaborative orders and their vendor
//! assignments, pricing values, and the storage key and clock abstractions.

pub mod actor;
pub mod clock;
pub mod collaboration;
pub mod order;
pub mod pricing;
pub mod storage;

pub use actor::{Actor, ActorKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collaboration::{
	AssignmentStatus, CollaborationAssignment, CollaborativeOrder, CollaborativeOrderStatus,
	NewCollaborativeOrder,
};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, StatusChange};
pub use pricing::{ItemSumPricing, Pricing, PricingCalculator, PricingError};
pub use storage::StorageKey;
