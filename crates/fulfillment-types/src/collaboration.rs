//! Collaborative order and vendor assignment types.
//!
//! A collaborative order is a large event order that may be fulfilled
//! jointly by several vendors. It can exist before (or without) a
//! conventional order record. Participation of an invited vendor is
//! tracked by an assignment with its own small state machine, kept
//! deliberately independent of the order delivery lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::order::generate_order_number;

/// Status of a collaborative order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum CollaborativeOrderStatus {
	/// Created, collaborators may still be invited.
	Pending,
	/// The owning vendor has committed to the event.
	Confirmed,
	/// Preparation for the event is underway.
	InPreparation,
	/// The event was served. Terminal.
	Fulfilled,
	/// The event was called off. Terminal.
	Cancelled,
}

impl CollaborativeOrderStatus {
	/// Whether no further transition is permitted from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			CollaborativeOrderStatus::Fulfilled | CollaborativeOrderStatus::Cancelled
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			CollaborativeOrderStatus::Pending => "pending",
			CollaborativeOrderStatus::Confirmed => "confirmed",
			CollaborativeOrderStatus::InPreparation => "in_preparation",
			CollaborativeOrderStatus::Fulfilled => "fulfilled",
			CollaborativeOrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for CollaborativeOrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Request to create a collaborative order.
#[derive(Debug, Clone)]
pub struct NewCollaborativeOrder {
	/// The vendor who owns the event and may invite collaborators.
	pub vendor_id: String,
	/// The customer hosting the event, if known.
	pub customer_id: Option<String>,
	/// When the event takes place.
	pub event_date: DateTime<Utc>,
	/// Expected number of guests.
	pub headcount: u32,
	/// Free-text description of the requested menu.
	pub menu_description: String,
}

/// A large event order that may require multiple vendors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborativeOrder {
	/// Surrogate id used as the storage key.
	pub id: String,
	/// Human-readable order number.
	pub order_number: String,
	/// The underlying conventional order, once one exists.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_id: Option<String>,
	/// The vendor who owns the event.
	pub vendor_id: String,
	/// The customer hosting the event, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_id: Option<String>,
	/// When the event takes place.
	pub event_date: DateTime<Utc>,
	/// Expected number of guests.
	pub headcount: u32,
	/// Free-text description of the requested menu.
	pub menu_description: String,
	/// Current status.
	pub status: CollaborativeOrderStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl CollaborativeOrder {
	/// Builds a new collaborative order in `Pending`.
	pub fn new(request: NewCollaborativeOrder, now: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			order_number: generate_order_number(),
			order_id: None,
			vendor_id: request.vendor_id,
			customer_id: request.customer_id,
			event_date: request.event_date,
			headcount: request.headcount,
			menu_description: request.menu_description,
			status: CollaborativeOrderStatus::Pending,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Status of a collaboration assignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentStatus {
	/// Invitation sent, awaiting the invited vendor's response.
	Invited,
	/// The invited vendor accepted and is participating.
	Active,
	/// The invited vendor declined. Terminal.
	Declined,
	/// Either party ended an active assignment. Terminal.
	Withdrawn,
}

impl AssignmentStatus {
	/// Whether no further transition is permitted from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, AssignmentStatus::Declined | AssignmentStatus::Withdrawn)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			AssignmentStatus::Invited => "invited",
			AssignmentStatus::Active => "active",
			AssignmentStatus::Declined => "declined",
			AssignmentStatus::Withdrawn => "withdrawn",
		}
	}
}

impl fmt::Display for AssignmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// One vendor's invited participation in a collaborative order.
///
/// Rows are never deleted; a vendor can only be re-invited after a prior
/// assignment for the same order reached a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationAssignment {
	/// Surrogate id used as the storage key.
	pub id: String,
	/// The collaborative order this assignment belongs to.
	pub collaborative_order_id: String,
	/// The vendor who sent the invitation.
	pub requesting_vendor_id: String,
	/// The vendor who was invited.
	pub invited_vendor_id: String,
	/// Current assignment status.
	pub status: AssignmentStatus,
	/// Message attached to the invitation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl CollaborationAssignment {
	/// Builds a fresh invitation.
	pub fn invite(
		collaborative_order_id: impl Into<String>,
		requesting_vendor_id: impl Into<String>,
		invited_vendor_id: impl Into<String>,
		message: Option<String>,
		now: DateTime<Utc>,
	) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			collaborative_order_id: collaborative_order_id.into(),
			requesting_vendor_id: requesting_vendor_id.into(),
			invited_vendor_id: invited_vendor_id.into(),
			status: AssignmentStatus::Invited,
			message,
			created_at: now,
			updated_at: now,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn terminal_assignment_states() {
		assert!(!AssignmentStatus::Invited.is_terminal());
		assert!(!AssignmentStatus::Active.is_terminal());
		assert!(AssignmentStatus::Declined.is_terminal());
		assert!(AssignmentStatus::Withdrawn.is_terminal());
	}

	#[test]
	fn new_collaborative_order_is_pending_without_order() {
		let order = CollaborativeOrder::new(
			NewCollaborativeOrder {
				vendor_id: "vend-1".into(),
				customer_id: None,
				event_date: Utc::now(),
				headcount: 120,
				menu_description: "Wedding buffet".into(),
			},
			Utc::now(),
		);

		assert_eq!(order.status, CollaborativeOrderStatus::Pending);
		assert!(order.order_id.is_none());
	}
}
