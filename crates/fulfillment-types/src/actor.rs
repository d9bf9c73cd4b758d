//! Actor types for authorization decisions.
//!
//! Every mutation of an order is performed by an actor: a customer, a vendor,
//! a delivery agent, or the system itself (timer-driven transitions). The
//! actor kind is a closed enumeration checked against a per-edge permission
//! table rather than free-form role strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an actor holds when acting on an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ActorKind {
	/// The customer who placed the order.
	Customer,
	/// The vendor fulfilling the order.
	Vendor,
	/// The delivery agent assigned to the order.
	DeliveryAgent,
	/// The non-human actor driving timer-based transitions.
	System,
}

impl fmt::Display for ActorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ActorKind::Customer => write!(f, "customer"),
			ActorKind::Vendor => write!(f, "vendor"),
			ActorKind::DeliveryAgent => write!(f, "delivery-agent"),
			ActorKind::System => write!(f, "system"),
		}
	}
}

/// An actor identity: a role plus the caller's user id.
///
/// The system actor carries no id; it represents the scheduler and is only
/// permitted on the edges the permission table explicitly grants it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
	/// The role the caller claims for this operation.
	pub kind: ActorKind,
	/// The caller's user id, `None` for the system actor.
	pub id: Option<String>,
}

impl Actor {
	/// Creates a customer actor.
	pub fn customer(id: impl Into<String>) -> Self {
		Self {
			kind: ActorKind::Customer,
			id: Some(id.into()),
		}
	}

	/// Creates a vendor actor.
	pub fn vendor(id: impl Into<String>) -> Self {
		Self {
			kind: ActorKind::Vendor,
			id: Some(id.into()),
		}
	}

	/// Creates a delivery agent actor.
	pub fn delivery_agent(id: impl Into<String>) -> Self {
		Self {
			kind: ActorKind::DeliveryAgent,
			id: Some(id.into()),
		}
	}

	/// Creates the system actor used by the scheduler.
	pub fn system() -> Self {
		Self {
			kind: ActorKind::System,
			id: None,
		}
	}
}
