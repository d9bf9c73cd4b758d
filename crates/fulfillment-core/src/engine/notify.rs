//! Notification copy for order lifecycle events.
//!
//! The engine decides who hears about a transition and with what wording;
//! the dispatch itself is fire-and-forget. Auto-cancellation by the SLA
//! timer gets its own customer-facing copy, distinct from a cancellation a
//! vendor chose to make.

use fulfillment_notify::{Notification, NotifyCategory};
use fulfillment_types::{Actor, ActorKind, Order, OrderStatus};

/// Builds the notification for a successful transition, addressed to the
/// counter-party of whoever acted. Returns `None` for edges nobody needs
/// to hear about.
pub(crate) fn transition_notification(order: &Order, actor: &Actor) -> Option<Notification> {
	match order.status {
		OrderStatus::Confirmed => Some(Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} confirmed", order.order_number),
			body: format!(
				"The vendor has confirmed your order {} and will start preparing it shortly.",
				order.order_number
			),
			category: NotifyCategory::OrderConfirmed,
		}),
		OrderStatus::Preparing => Some(Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} is being prepared", order.order_number),
			body: format!("Your order {} is now being prepared.", order.order_number),
			category: NotifyCategory::OrderProgress,
		}),
		OrderStatus::Ready => Some(Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} is ready", order.order_number),
			body: format!(
				"Your order {} is ready and waiting for pickup by the delivery agent.",
				order.order_number
			),
			category: NotifyCategory::OrderProgress,
		}),
		OrderStatus::OutForDelivery => Some(Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} is out for delivery", order.order_number),
			body: format!("Your order {} is on its way.", order.order_number),
			category: NotifyCategory::OrderProgress,
		}),
		OrderStatus::Delivered => Some(Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} delivered", order.order_number),
			body: format!(
				"Your order {} has been delivered. Enjoy your meal!",
				order.order_number
			),
			category: NotifyCategory::OrderProgress,
		}),
		OrderStatus::Cancelled => Some(cancellation_notification(order, actor)),
		OrderStatus::Pending => None,
	}
}

/// Cancellation copy depends on who cancelled.
fn cancellation_notification(order: &Order, actor: &Actor) -> Notification {
	match actor.kind {
		ActorKind::System => Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} - vendor did not respond", order.order_number),
			body: format!(
				"Unfortunately, your order {} (total {}) was automatically cancelled \
				 because the vendor did not confirm it in time. Any payment will be \
				 refunded. Please try ordering from another vendor in your area.",
				order.order_number, order.pricing.total
			),
			category: NotifyCategory::AutoCancelled,
		},
		ActorKind::Customer => Notification {
			recipient: order.vendor_id.clone(),
			subject: format!("Order {} cancelled by the customer", order.order_number),
			body: format!(
				"The customer has cancelled order {}. No further preparation is needed.",
				order.order_number
			),
			category: NotifyCategory::OrderCancelled,
		},
		// Vendor-initiated; delivery agents cannot reach this edge.
		_ => Notification {
			recipient: order.customer_id.clone(),
			subject: format!("Order {} cancelled", order.order_number),
			body: format!(
				"We're sorry - the vendor had to cancel your order {}. Any payment \
				 will be refunded.",
				order.order_number
			),
			category: NotifyCategory::OrderCancelled,
		},
	}
}

/// Tells the vendor a new order arrived.
pub(crate) fn placed_notification(order: &Order) -> Notification {
	Notification {
		recipient: order.vendor_id.clone(),
		subject: format!("New order {}", order.order_number),
		body: format!(
			"You have received order {} with {} items. Please confirm it promptly.",
			order.order_number,
			order.total_items()
		),
		category: NotifyCategory::OrderPlaced,
	}
}

/// Tells a delivery agent they were assigned to an order.
pub(crate) fn agent_assigned_notification(order: &Order, agent_id: &str) -> Notification {
	Notification {
		recipient: agent_id.to_string(),
		subject: format!("Assigned to order {}", order.order_number),
		body: format!(
			"You have been assigned to deliver order {} to {}.",
			order.order_number, order.delivery_address
		),
		category: NotifyCategory::OrderProgress,
	}
}
