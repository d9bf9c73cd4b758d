//! Order types and lifecycle states.
//!
//! An order is one customer's purchase from one vendor, tracked through a
//! fixed delivery lifecycle. The record keeps a first-entry timestamp per
//! state so SLA checks and cancellation windows can be evaluated against
//! persisted time, and a cancellation block that is populated exactly when
//! the order reaches `Cancelled`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::{ActorKind, Pricing};

/// Status of an order in the fulfillment lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order has been placed and awaits vendor confirmation.
	Pending,
	/// Vendor has accepted the order.
	Confirmed,
	/// Vendor is preparing the food.
	Preparing,
	/// Order is ready for pickup by the delivery agent.
	Ready,
	/// Delivery agent is en route to the customer.
	OutForDelivery,
	/// Order has been handed to the customer. Terminal.
	Delivered,
	/// Order was cancelled by the customer, the vendor, or the system. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Whether no further transition is permitted from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}

	/// Returns the string representation used in logs and storage.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::OutForDelivery => "out_for_delivery",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// One line of an order, with a snapshot of the food's name and description
/// taken at order time so later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
	/// Catalog id of the ordered food.
	pub food_id: String,
	/// Food name at time of order.
	pub name: String,
	/// Food description at time of order.
	pub description: String,
	/// Number of units ordered.
	pub quantity: u32,
	/// Price per unit at time of order.
	pub unit_price: Decimal,
	/// Line total, `quantity * unit_price`.
	pub total_price: Decimal,
	/// Special cooking instructions from the customer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub special_instructions: Option<String>,
}

/// A request line for a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
	pub food_id: String,
	pub name: String,
	pub description: String,
	pub quantity: u32,
	pub unit_price: Decimal,
	pub special_instructions: Option<String>,
}

impl From<NewOrderItem> for OrderItem {
	fn from(item: NewOrderItem) -> Self {
		let total_price = item.unit_price * Decimal::from(item.quantity);
		OrderItem {
			food_id: item.food_id,
			name: item.name,
			description: item.description,
			quantity: item.quantity,
			unit_price: item.unit_price,
			total_price,
			special_instructions: item.special_instructions,
		}
	}
}

/// Intake request for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
	pub customer_id: String,
	pub vendor_id: String,
	pub items: Vec<NewOrderItem>,
	pub delivery_address: String,
	pub delivery_instructions: Option<String>,
}

/// A customer's order with one vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Surrogate id used as the storage key.
	pub id: String,
	/// Human-readable order number, unique and immutable.
	pub order_number: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
	/// First-entry timestamp per status. Entries are never overwritten.
	#[serde(default)]
	pub status_timestamps: HashMap<OrderStatus, DateTime<Utc>>,
	/// The customer who placed the order.
	pub customer_id: String,
	/// The vendor fulfilling the order.
	pub vendor_id: String,
	/// The delivery agent, once assigned.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_agent_id: Option<String>,
	/// Ordered items with price snapshots.
	pub items: Vec<OrderItem>,
	/// Where the order is delivered.
	pub delivery_address: String,
	/// Free-text delivery instructions from the customer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_instructions: Option<String>,
	/// Monetary values supplied by the pricing collaborator at creation.
	/// The core persists and exposes them, never recomputes them.
	pub pricing: Pricing,
	/// When the order was cancelled. Set iff status is `Cancelled`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cancelled_at: Option<DateTime<Utc>>,
	/// Free-text reason recorded at cancellation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cancellation_reason: Option<String>,
	/// Which role cancelled the order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cancelled_by: Option<ActorKind>,
}

impl Order {
	/// Builds a new order in `Pending` with its first status timestamp set.
	pub fn new(request: NewOrder, items: Vec<OrderItem>, pricing: Pricing, now: DateTime<Utc>) -> Self {
		let mut status_timestamps = HashMap::new();
		status_timestamps.insert(OrderStatus::Pending, now);

		Self {
			id: Uuid::new_v4().to_string(),
			order_number: generate_order_number(),
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
			status_timestamps,
			customer_id: request.customer_id,
			vendor_id: request.vendor_id,
			delivery_agent_id: None,
			items,
			delivery_address: request.delivery_address,
			delivery_instructions: request.delivery_instructions,
			pricing,
			cancelled_at: None,
			cancellation_reason: None,
			cancelled_by: None,
		}
	}

	/// Records the first entry into `status`. Existing entries are kept,
	/// so the map stays append-only under retries and races.
	pub fn record_status_entry(&mut self, status: OrderStatus, at: DateTime<Utc>) {
		self.status_timestamps.entry(status).or_insert(at);
	}

	/// Returns when the order first entered `status`, if it ever did.
	pub fn entered_at(&self, status: OrderStatus) -> Option<DateTime<Utc>> {
		self.status_timestamps.get(&status).copied()
	}

	/// Total number of units across all items.
	pub fn total_items(&self) -> u32 {
		self.items.iter().map(|item| item.quantity).sum()
	}
}

/// Generates a unique human-readable order number.
pub fn generate_order_number() -> String {
	let hex = Uuid::new_v4().simple().to_string();
	format!("ORD-{}", hex[..8].to_uppercase())
}

/// One row of the append-only status history ledger.
///
/// Rows are only ever appended, never mutated or deleted; they exist for
/// audit and dispute resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChange {
	/// The status the order entered.
	pub status: OrderStatus,
	/// The role that drove the transition.
	pub actor: ActorKind,
	/// The acting user's id, `None` for the system actor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub actor_id: Option<String>,
	/// Optional free-text note recorded with the transition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
	/// When the transition happened.
	pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	fn sample_request() -> NewOrder {
		NewOrder {
			customer_id: "cust-1".into(),
			vendor_id: "vend-1".into(),
			items: vec![NewOrderItem {
				food_id: "food-1".into(),
				name: "Rice & Curry".into(),
				description: "Lunch pack".into(),
				quantity: 3,
				unit_price: Decimal::new(450, 2),
				special_instructions: None,
			}],
			delivery_address: "12 Temple Road".into(),
			delivery_instructions: None,
		}
	}

	#[test]
	fn order_number_format() {
		let number = generate_order_number();
		assert!(number.starts_with("ORD-"));
		assert_eq!(number.len(), 12);
		assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
	}

	#[test]
	fn new_order_starts_pending_with_timestamp() {
		let request = sample_request();
		let items: Vec<OrderItem> = request.items.clone().into_iter().map(Into::into).collect();
		let now = Utc::now();
		let order = Order::new(request, items, Pricing::zero(), now);

		assert_eq!(order.status, OrderStatus::Pending);
		assert_eq!(order.entered_at(OrderStatus::Pending), Some(now));
		assert!(order.cancelled_at.is_none());
		assert_eq!(order.total_items(), 3);
	}

	#[test]
	fn status_entries_are_append_only() {
		let request = sample_request();
		let items: Vec<OrderItem> = request.items.clone().into_iter().map(Into::into).collect();
		let first = Utc::now();
		let mut order = Order::new(request, items, Pricing::zero(), first);

		let later = first + chrono::Duration::minutes(5);
		order.record_status_entry(OrderStatus::Pending, later);
		assert_eq!(order.entered_at(OrderStatus::Pending), Some(first));

		order.record_status_entry(OrderStatus::Confirmed, later);
		assert_eq!(order.entered_at(OrderStatus::Confirmed), Some(later));
	}

	#[test]
	fn line_total_is_computed() {
		let item: OrderItem = NewOrderItem {
			food_id: "food-2".into(),
			name: "Kottu".into(),
			description: "Chicken kottu".into(),
			quantity: 4,
			unit_price: Decimal::new(1250, 2),
			special_instructions: None,
		}
		.into();

		assert_eq!(item.total_price, Decimal::new(5000, 2));
	}

	#[test]
	fn order_round_trips_through_json() {
		let request = sample_request();
		let items: Vec<OrderItem> = request.items.clone().into_iter().map(Into::into).collect();
		let order = Order::new(request, items, Pricing::zero(), Utc::now());

		let encoded = serde_json::to_vec(&order).unwrap();
		let decoded: Order = serde_json::from_slice(&encoded).unwrap();
		assert_eq!(decoded.order_number, order.order_number);
		assert_eq!(decoded.entered_at(OrderStatus::Pending), order.entered_at(OrderStatus::Pending));
	}
}
