//! Transition and authorization tables for the order lifecycle.
//!
//! Pure decision logic: which edges exist, and which actor roles may drive
//! each edge. Identity is checked against the party ids on the order record
//! itself, so an actor must be *the* customer/vendor/agent of the order,
//! not merely hold the role.

use fulfillment_types::{Actor, ActorKind, Order, OrderStatus};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Allowed next states per current state. Terminal states map to nothing.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Pending,
		HashSet::from([OrderStatus::Confirmed, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Confirmed,
		HashSet::from([OrderStatus::Preparing, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Preparing,
		HashSet::from([OrderStatus::Ready]),
	);
	m.insert(
		OrderStatus::Ready,
		HashSet::from([OrderStatus::OutForDelivery]),
	);
	m.insert(
		OrderStatus::OutForDelivery,
		HashSet::from([OrderStatus::Delivered]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Checks if `to` is a direct successor of `from`.
pub fn is_successor(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

/// Roles permitted to drive the edge `from -> to`.
///
/// The system role appears only on cancellation edges; it is how the
/// scheduler cancels unconfirmed orders.
fn permitted_roles(from: OrderStatus, to: OrderStatus) -> &'static [ActorKind] {
	match (from, to) {
		(OrderStatus::Pending, OrderStatus::Confirmed) => &[ActorKind::Vendor],
		(OrderStatus::Confirmed, OrderStatus::Preparing) => &[ActorKind::Vendor],
		(OrderStatus::Preparing, OrderStatus::Ready) => {
			&[ActorKind::Vendor, ActorKind::DeliveryAgent]
		},
		(OrderStatus::Ready, OrderStatus::OutForDelivery) => &[ActorKind::DeliveryAgent],
		(OrderStatus::OutForDelivery, OrderStatus::Delivered) => &[ActorKind::DeliveryAgent],
		(OrderStatus::Pending | OrderStatus::Confirmed, OrderStatus::Cancelled) => {
			&[ActorKind::Customer, ActorKind::Vendor, ActorKind::System]
		},
		_ => &[],
	}
}

/// Checks role and identity for the edge `from -> to` on this order.
pub fn actor_may(order: &Order, from: OrderStatus, to: OrderStatus, actor: &Actor) -> bool {
	if !permitted_roles(from, to).contains(&actor.kind) {
		return false;
	}

	match actor.kind {
		ActorKind::Customer => actor.id.as_deref() == Some(order.customer_id.as_str()),
		ActorKind::Vendor => actor.id.as_deref() == Some(order.vendor_id.as_str()),
		// The agent must be the one assigned; an unassigned order has no
		// agent edge at all.
		ActorKind::DeliveryAgent => {
			actor.id.is_some() && actor.id == order.delivery_agent_id
		},
		ActorKind::System => true,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use fulfillment_types::{NewOrder, Pricing};

	fn order_in(status: OrderStatus) -> Order {
		let mut order = Order::new(
			NewOrder {
				customer_id: "cust-1".into(),
				vendor_id: "vend-1".into(),
				items: vec![],
				delivery_address: "addr".into(),
				delivery_instructions: None,
			},
			vec![],
			Pricing::zero(),
			Utc::now(),
		);
		order.status = status;
		order
	}

	#[test]
	fn happy_path_edges_exist() {
		assert!(is_successor(OrderStatus::Pending, OrderStatus::Confirmed));
		assert!(is_successor(OrderStatus::Confirmed, OrderStatus::Preparing));
		assert!(is_successor(OrderStatus::Preparing, OrderStatus::Ready));
		assert!(is_successor(OrderStatus::Ready, OrderStatus::OutForDelivery));
		assert!(is_successor(OrderStatus::OutForDelivery, OrderStatus::Delivered));
	}

	#[test]
	fn cancellation_only_from_pending_and_confirmed() {
		assert!(is_successor(OrderStatus::Pending, OrderStatus::Cancelled));
		assert!(is_successor(OrderStatus::Confirmed, OrderStatus::Cancelled));
		assert!(!is_successor(OrderStatus::Preparing, OrderStatus::Cancelled));
		assert!(!is_successor(OrderStatus::Ready, OrderStatus::Cancelled));
		assert!(!is_successor(OrderStatus::OutForDelivery, OrderStatus::Cancelled));
	}

	#[test]
	fn terminal_states_have_no_successors() {
		for to in [
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::Cancelled,
			OrderStatus::Delivered,
		] {
			assert!(!is_successor(OrderStatus::Delivered, to));
			assert!(!is_successor(OrderStatus::Cancelled, to));
		}
	}

	#[test]
	fn no_skipping_states() {
		assert!(!is_successor(OrderStatus::Pending, OrderStatus::Preparing));
		assert!(!is_successor(OrderStatus::Confirmed, OrderStatus::Ready));
		assert!(!is_successor(OrderStatus::Pending, OrderStatus::Delivered));
	}

	#[test]
	fn only_the_assigned_vendor_confirms() {
		let order = order_in(OrderStatus::Pending);
		assert!(actor_may(
			&order,
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			&Actor::vendor("vend-1")
		));
		assert!(!actor_may(
			&order,
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			&Actor::vendor("vend-2")
		));
		assert!(!actor_may(
			&order,
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			&Actor::customer("cust-1")
		));
	}

	#[test]
	fn unassigned_agent_cannot_act() {
		let mut order = order_in(OrderStatus::Ready);
		assert!(!actor_may(
			&order,
			OrderStatus::Ready,
			OrderStatus::OutForDelivery,
			&Actor::delivery_agent("agent-1")
		));

		order.delivery_agent_id = Some("agent-1".into());
		assert!(actor_may(
			&order,
			OrderStatus::Ready,
			OrderStatus::OutForDelivery,
			&Actor::delivery_agent("agent-1")
		));
		assert!(!actor_may(
			&order,
			OrderStatus::Ready,
			OrderStatus::OutForDelivery,
			&Actor::delivery_agent("agent-2")
		));
	}

	#[test]
	fn system_may_only_cancel() {
		let order = order_in(OrderStatus::Pending);
		assert!(actor_may(
			&order,
			OrderStatus::Pending,
			OrderStatus::Cancelled,
			&Actor::system()
		));
		assert!(!actor_may(
			&order,
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			&Actor::system()
		));
	}
}
