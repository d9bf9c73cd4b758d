//! Collaboration coordinator for multi-vendor event orders.
//!
//! Lets the vendor who owns a collaborative order invite other vendors to
//! share fulfillment, and lets invited vendors respond. Assignments form a
//! second, smaller state machine kept deliberately independent from the
//! order delivery lifecycle, so collaboration bookkeeping never blocks or
//! races with it.
//!
//! Duplicate-invite protection works through an index record per
//! (collaborative order, invited vendor) pair: the index points at the
//! live assignment and is only written through guarded commits, so two
//! concurrent invitations for the same vendor cannot both win.

use fulfillment_notify::{Notification, NotificationService, NotifyCategory};
use fulfillment_storage::{StorageError, StorageService, WriteOp};
use fulfillment_types::{
	AssignmentStatus, Clock, CollaborationAssignment, CollaborativeOrder,
	CollaborativeOrderStatus, NewCollaborativeOrder, StorageKey,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during collaboration operations.
///
/// All variants except `Storage` are expected, recoverable outcomes; none
/// of them mutate state.
#[derive(Debug, Error)]
pub enum CollaborationError {
	/// The requesting vendor does not own the collaborative order.
	#[error("requesting vendor does not own this collaborative order")]
	NotOwner,
	/// A non-terminal assignment already exists for this vendor.
	#[error("an active invitation already exists for this vendor")]
	DuplicateActiveInvite,
	/// The caller is not a party to this assignment.
	#[error("caller is not a party to this assignment")]
	Forbidden,
	/// The assignment is not awaiting a response.
	#[error("assignment is not awaiting a response (currently {status})")]
	NotPending { status: AssignmentStatus },
	/// The assignment already reached a terminal state.
	#[error("assignment is already in terminal state {status}")]
	AlreadyTerminal { status: AssignmentStatus },
	/// The collaborative order can not move to the requested status.
	#[error("no transition from {from} to {to}")]
	InvalidTransition {
		from: CollaborativeOrderStatus,
		to: CollaborativeOrderStatus,
	},
	/// No record exists under the given id.
	#[error("not found: {0}")]
	NotFound(String),
	/// The data store failed.
	#[error("storage error: {0}")]
	Storage(String),
}

impl CollaborationError {
	fn from_storage(err: StorageError, id: &str) -> Self {
		match err {
			StorageError::NotFound => CollaborationError::NotFound(id.to_string()),
			other => CollaborationError::Storage(other.to_string()),
		}
	}
}

/// An invited vendor's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteResponse {
	/// Join the collaboration; the assignment becomes `Active`.
	Accept,
	/// Turn it down; the assignment becomes `Declined`.
	Decline,
}

/// Manages invitations and assignments between vendors.
pub struct CollaborationCoordinator {
	storage: Arc<StorageService>,
	notifications: Arc<NotificationService>,
	clock: Arc<dyn Clock>,
}

impl CollaborationCoordinator {
	pub fn new(
		storage: Arc<StorageService>,
		notifications: Arc<NotificationService>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			storage,
			notifications,
			clock,
		}
	}

	/// Creates a collaborative order owned by `vendor_id`.
	///
	/// The order starts without an underlying conventional order; one can
	/// be attached later once placed.
	pub async fn create_collaborative_order(
		&self,
		request: NewCollaborativeOrder,
	) -> Result<CollaborativeOrder, CollaborationError> {
		let order = CollaborativeOrder::new(request, self.clock.now());
		self.storage
			.store(StorageKey::CollaborativeOrders.as_str(), &order.id, &order)
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;

		tracing::info!(
			order_number = %order.order_number,
			vendor_id = %order.vendor_id,
			headcount = order.headcount,
			"collaborative order created"
		);
		Ok(order)
	}

	/// Gets a collaborative order by id.
	pub async fn get_collaborative_order(
		&self,
		order_id: &str,
	) -> Result<CollaborativeOrder, CollaborationError> {
		self.storage
			.retrieve(StorageKey::CollaborativeOrders.as_str(), order_id)
			.await
			.map_err(|e| CollaborationError::from_storage(e, order_id))
	}

	/// Invites a vendor to collaborate on an order.
	pub async fn invite(
		&self,
		collab_order_id: &str,
		requesting_vendor: &str,
		invited_vendor: &str,
		message: Option<&str>,
	) -> Result<CollaborationAssignment, CollaborationError> {
		let order = self.get_collaborative_order(collab_order_id).await?;
		if order.vendor_id != requesting_vendor {
			return Err(CollaborationError::NotOwner);
		}

		// The index points at the live assignment for this pair, if any.
		let index_id = pair_index_id(collab_order_id, invited_vendor);
		let index_snapshot = match self
			.storage
			.retrieve_with_raw::<String>(StorageKey::AssignmentIndex.as_str(), &index_id)
			.await
		{
			Ok((assignment_id, raw)) => {
				let existing: CollaborationAssignment = self
					.storage
					.retrieve(StorageKey::Assignments.as_str(), &assignment_id)
					.await
					.map_err(|e| CollaborationError::Storage(e.to_string()))?;
				if !existing.status.is_terminal() {
					return Err(CollaborationError::DuplicateActiveInvite);
				}
				Some(raw)
			},
			Err(StorageError::NotFound) => None,
			Err(e) => return Err(CollaborationError::Storage(e.to_string())),
		};

		let assignment = CollaborationAssignment::invite(
			collab_order_id,
			requesting_vendor,
			invited_vendor,
			message.map(str::to_string),
			self.clock.now(),
		);

		let ops = vec![
			WriteOp::put(StorageKey::Assignments.as_str(), &assignment.id, &assignment)
				.map_err(|e| CollaborationError::Storage(e.to_string()))?,
			WriteOp::put(
				StorageKey::AssignmentIndex.as_str(),
				&index_id,
				&assignment.id,
			)
			.map_err(|e| CollaborationError::Storage(e.to_string()))?,
		];
		let applied = self
			.storage
			.compare_and_swap(
				StorageKey::AssignmentIndex.as_str(),
				&index_id,
				index_snapshot.as_deref(),
				ops,
			)
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;
		if !applied {
			// A concurrent invitation claimed the pair first.
			return Err(CollaborationError::DuplicateActiveInvite);
		}

		self.notifications.dispatch(Notification {
			recipient: invited_vendor.to_string(),
			subject: format!("Collaboration invite for order {}", order.order_number),
			body: message
				.map(str::to_string)
				.unwrap_or_else(|| format!(
					"You have been invited to collaborate on order {} ({} guests).",
					order.order_number, order.headcount
				)),
			category: NotifyCategory::CollaborationInvite,
		});
		tracing::info!(
			order_number = %order.order_number,
			invited_vendor = %invited_vendor,
			"collaboration invitation sent"
		);
		Ok(assignment)
	}

	/// Records the invited vendor's response to an invitation.
	pub async fn respond(
		&self,
		assignment_id: &str,
		invited_vendor: &str,
		response: InviteResponse,
	) -> Result<CollaborationAssignment, CollaborationError> {
		let (assignment, snapshot) = self.load_assignment(assignment_id).await?;
		if assignment.invited_vendor_id != invited_vendor {
			return Err(CollaborationError::Forbidden);
		}
		if assignment.status != AssignmentStatus::Invited {
			return Err(CollaborationError::NotPending {
				status: assignment.status,
			});
		}

		let mut updated = assignment;
		updated.status = match response {
			InviteResponse::Accept => AssignmentStatus::Active,
			InviteResponse::Decline => AssignmentStatus::Declined,
		};
		updated.updated_at = self.clock.now();

		let mut ops = vec![WriteOp::put(
			StorageKey::Assignments.as_str(),
			assignment_id,
			&updated,
		)
		.map_err(|e| CollaborationError::Storage(e.to_string()))?];
		if updated.status.is_terminal() {
			// Release the pair index so the vendor can be re-invited.
			ops.push(WriteOp::delete(
				StorageKey::AssignmentIndex.as_str(),
				&pair_index_id(&updated.collaborative_order_id, invited_vendor),
			));
		}
		self.commit_assignment(assignment_id, &snapshot, ops).await?;

		let verdict = match updated.status {
			AssignmentStatus::Active => "accepted",
			_ => "declined",
		};
		self.notifications.dispatch(Notification {
			recipient: updated.requesting_vendor_id.clone(),
			subject: format!("Collaboration invite {}", verdict),
			body: format!(
				"Vendor {} has {} your collaboration invitation.",
				updated.invited_vendor_id, verdict
			),
			category: NotifyCategory::CollaborationUpdate,
		});
		tracing::info!(
			assignment_id = %assignment_id,
			status = %updated.status,
			"collaboration invitation answered"
		);
		Ok(updated)
	}

	/// Ends an active assignment. Either party may withdraw.
	///
	/// Withdrawing an already-terminal assignment is a no-op that reports
	/// `AlreadyTerminal`, so callers can tell "nothing changed" apart from
	/// "you just ended it".
	pub async fn withdraw(
		&self,
		assignment_id: &str,
		vendor_id: &str,
	) -> Result<CollaborationAssignment, CollaborationError> {
		let (assignment, snapshot) = self.load_assignment(assignment_id).await?;
		if assignment.requesting_vendor_id != vendor_id
			&& assignment.invited_vendor_id != vendor_id
		{
			return Err(CollaborationError::Forbidden);
		}
		if assignment.status.is_terminal() {
			return Err(CollaborationError::AlreadyTerminal {
				status: assignment.status,
			});
		}
		if assignment.status != AssignmentStatus::Active {
			return Err(CollaborationError::NotPending {
				status: assignment.status,
			});
		}

		let mut updated = assignment;
		updated.status = AssignmentStatus::Withdrawn;
		updated.updated_at = self.clock.now();

		let ops = vec![
			WriteOp::put(StorageKey::Assignments.as_str(), assignment_id, &updated)
				.map_err(|e| CollaborationError::Storage(e.to_string()))?,
			WriteOp::delete(
				StorageKey::AssignmentIndex.as_str(),
				&pair_index_id(&updated.collaborative_order_id, &updated.invited_vendor_id),
			),
		];
		self.commit_assignment(assignment_id, &snapshot, ops).await?;

		// Address the counter-party of whoever withdrew.
		let counter_party = if updated.requesting_vendor_id == vendor_id {
			updated.invited_vendor_id.clone()
		} else {
			updated.requesting_vendor_id.clone()
		};
		self.notifications.dispatch(Notification {
			recipient: counter_party,
			subject: "Collaboration withdrawn".to_string(),
			body: format!(
				"Vendor {} has withdrawn from the collaboration.",
				vendor_id
			),
			category: NotifyCategory::CollaborationUpdate,
		});
		tracing::info!(assignment_id = %assignment_id, "collaboration assignment withdrawn");
		Ok(updated)
	}

	/// Moves a collaborative order along its own lifecycle. Owner only.
	pub async fn update_status(
		&self,
		collab_order_id: &str,
		vendor_id: &str,
		requested: CollaborativeOrderStatus,
	) -> Result<CollaborativeOrder, CollaborationError> {
		let (order, snapshot) = self
			.storage
			.retrieve_with_raw::<CollaborativeOrder>(
				StorageKey::CollaborativeOrders.as_str(),
				collab_order_id,
			)
			.await
			.map_err(|e| CollaborationError::from_storage(e, collab_order_id))?;
		if order.vendor_id != vendor_id {
			return Err(CollaborationError::NotOwner);
		}
		if !is_collab_successor(order.status, requested) {
			return Err(CollaborationError::InvalidTransition {
				from: order.status,
				to: requested,
			});
		}

		let mut updated = order;
		updated.status = requested;
		updated.updated_at = self.clock.now();

		let ops = vec![WriteOp::put(
			StorageKey::CollaborativeOrders.as_str(),
			collab_order_id,
			&updated,
		)
		.map_err(|e| CollaborationError::Storage(e.to_string()))?];
		let applied = self
			.storage
			.compare_and_swap(
				StorageKey::CollaborativeOrders.as_str(),
				collab_order_id,
				Some(&snapshot),
				ops,
			)
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;
		if !applied {
			let current: CollaborativeOrder = self
				.storage
				.retrieve(StorageKey::CollaborativeOrders.as_str(), collab_order_id)
				.await
				.map_err(|e| CollaborationError::from_storage(e, collab_order_id))?;
			return Err(CollaborationError::InvalidTransition {
				from: current.status,
				to: requested,
			});
		}

		tracing::info!(
			order_number = %updated.order_number,
			status = %requested,
			"collaborative order transitioned"
		);
		Ok(updated)
	}

	/// Links the underlying conventional order once one has been placed.
	pub async fn attach_order(
		&self,
		collab_order_id: &str,
		vendor_id: &str,
		order_id: &str,
	) -> Result<CollaborativeOrder, CollaborationError> {
		let (order, snapshot) = self
			.storage
			.retrieve_with_raw::<CollaborativeOrder>(
				StorageKey::CollaborativeOrders.as_str(),
				collab_order_id,
			)
			.await
			.map_err(|e| CollaborationError::from_storage(e, collab_order_id))?;
		if order.vendor_id != vendor_id {
			return Err(CollaborationError::NotOwner);
		}

		let mut updated = order;
		updated.order_id = Some(order_id.to_string());
		updated.updated_at = self.clock.now();

		let ops = vec![WriteOp::put(
			StorageKey::CollaborativeOrders.as_str(),
			collab_order_id,
			&updated,
		)
		.map_err(|e| CollaborationError::Storage(e.to_string()))?];
		let applied = self
			.storage
			.compare_and_swap(
				StorageKey::CollaborativeOrders.as_str(),
				collab_order_id,
				Some(&snapshot),
				ops,
			)
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;
		if !applied {
			return Err(CollaborationError::Storage(
				"collaborative order changed concurrently, retry".into(),
			));
		}
		Ok(updated)
	}

	/// Gets an assignment by id.
	pub async fn get_assignment(
		&self,
		assignment_id: &str,
	) -> Result<CollaborationAssignment, CollaborationError> {
		Ok(self.load_assignment(assignment_id).await?.0)
	}

	/// All assignments ever created for a collaborative order, terminal
	/// ones included.
	pub async fn assignments_for(
		&self,
		collab_order_id: &str,
	) -> Result<Vec<CollaborationAssignment>, CollaborationError> {
		let all: Vec<(String, CollaborationAssignment)> = self
			.storage
			.retrieve_all(StorageKey::Assignments.as_str())
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;

		let mut assignments: Vec<CollaborationAssignment> = all
			.into_iter()
			.map(|(_, assignment)| assignment)
			.filter(|assignment| assignment.collaborative_order_id == collab_order_id)
			.collect();
		assignments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
		Ok(assignments)
	}

	async fn load_assignment(
		&self,
		assignment_id: &str,
	) -> Result<(CollaborationAssignment, Vec<u8>), CollaborationError> {
		self.storage
			.retrieve_with_raw(StorageKey::Assignments.as_str(), assignment_id)
			.await
			.map_err(|e| CollaborationError::from_storage(e, assignment_id))
	}

	/// Applies an assignment mutation guarded on its snapshot. A failed
	/// guard means a concurrent writer got there first; report the state
	/// that won.
	async fn commit_assignment(
		&self,
		assignment_id: &str,
		snapshot: &[u8],
		ops: Vec<WriteOp>,
	) -> Result<(), CollaborationError> {
		let applied = self
			.storage
			.compare_and_swap(
				StorageKey::Assignments.as_str(),
				assignment_id,
				Some(snapshot),
				ops,
			)
			.await
			.map_err(|e| CollaborationError::Storage(e.to_string()))?;
		if applied {
			return Ok(());
		}

		let (current, _) = self.load_assignment(assignment_id).await?;
		Err(if current.status.is_terminal() {
			CollaborationError::AlreadyTerminal {
				status: current.status,
			}
		} else {
			CollaborationError::NotPending {
				status: current.status,
			}
		})
	}
}

/// Index id for the (collaborative order, invited vendor) pair.
fn pair_index_id(collab_order_id: &str, invited_vendor: &str) -> String {
	format!("{}:{}", collab_order_id, invited_vendor)
}

/// Successor table for the collaborative order lifecycle, parallel to the
/// conventional order's but with event-specific terminal states.
fn is_collab_successor(from: CollaborativeOrderStatus, to: CollaborativeOrderStatus) -> bool {
	use CollaborativeOrderStatus::*;
	matches!(
		(from, to),
		(Pending, Confirmed)
			| (Pending, Cancelled)
			| (Confirmed, InPreparation)
			| (Confirmed, Cancelled)
			| (InPreparation, Fulfilled)
	)
}
