//! Core engine for the order fulfillment system.
//!
//! This crate provides the orchestration logic governing a food order from
//! placement to delivery or cancellation: the lifecycle state machine, the
//! background scheduler that auto-cancels orders a vendor fails to confirm
//! in time, and the collaboration coordinator for multi-vendor event
//! orders. The API surface, payments, catalog and notification transports
//! are external collaborators reached through the narrow interfaces in
//! `fulfillment-types`, `fulfillment-storage` and `fulfillment-notify`.

pub mod builder;
pub mod collaboration;
pub mod config;
pub mod engine;
pub mod scheduler;

pub use builder::{Fulfillment, FulfillmentBuilder};
pub use collaboration::{CollaborationCoordinator, CollaborationError, InviteResponse};
pub use config::{Config, ConfigError};
pub use engine::{CancelEligibility, OrderStateMachine, PlaceOrderError, TransitionError};
pub use scheduler::{SchedulerConfig, SchedulerHandle, SlaScheduler, TickSummary, AUTO_CANCEL_NOTE};
