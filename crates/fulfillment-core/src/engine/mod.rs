//! Order state machine implementation.
//!
//! Manages order state transitions with validation, ensuring orders move
//! through valid lifecycle states: Pending -> Confirmed -> Preparing ->
//! Ready -> OutForDelivery -> Delivered, with Cancelled reachable from the
//! first two. This is the only write path for order state; the API surface
//! and the scheduler both come through [`OrderStateMachine::transition`],
//! which funnels every race through one guarded check-and-set.

use chrono::{DateTime, Utc};
use fulfillment_notify::NotificationService;
use fulfillment_storage::{StorageError, StorageService, WriteOp};
use fulfillment_types::{
	Actor, ActorKind, Clock, NewOrder, Order, OrderItem, OrderStatus, PricingCalculator,
	StatusChange, StorageKey,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

mod notify;
pub mod transitions;

use crate::config::PolicySettings;

/// Errors that can occur during order state transitions.
///
/// All variants except `Storage` are expected, recoverable outcomes
/// returned to the caller; none of them mutate state.
#[derive(Debug, Error)]
pub enum TransitionError {
	/// The requested state is not a direct successor of the current one.
	#[error("no transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// The actor lacks the role or identity for this edge.
	#[error("{actor} is not permitted to move this order from {from} to {to}")]
	Forbidden {
		actor: ActorKind,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// The order already reached `Delivered` or `Cancelled`.
	#[error("order is already in terminal state {status}")]
	AlreadyTerminal { status: OrderStatus },
	/// The customer cancellation window after confirmation has passed.
	#[error("customer cancellation window has expired")]
	WindowExpired,
	/// No order exists under the given id.
	#[error("order not found: {0}")]
	OrderNotFound(String),
	/// The data store failed; distinct from every business rejection.
	#[error("storage error: {0}")]
	Storage(String),
}

impl TransitionError {
	fn from_storage(err: StorageError, order_id: &str) -> Self {
		match err {
			StorageError::NotFound => TransitionError::OrderNotFound(order_id.to_string()),
			other => TransitionError::Storage(other.to_string()),
		}
	}
}

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
	/// The request was malformed (no items, zero quantities).
	#[error("invalid order: {0}")]
	Validation(String),
	/// The pricing collaborator could not produce a quote.
	#[error("pricing failed: {0}")]
	Pricing(String),
	/// The data store failed.
	#[error("storage error: {0}")]
	Storage(String),
}

/// Answer to "may this actor cancel this order right now?".
#[derive(Debug, Clone, PartialEq)]
pub struct CancelEligibility {
	/// Whether a cancellation attempt would be accepted.
	pub allowed: bool,
	/// Time left in the customer cancellation window, when one applies.
	pub window_remaining: Option<Duration>,
}

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	notifications: Arc<NotificationService>,
	pricing: Arc<dyn PricingCalculator>,
	clock: Arc<dyn Clock>,
	policy: PolicySettings,
}

impl OrderStateMachine {
	pub fn new(
		storage: Arc<StorageService>,
		notifications: Arc<NotificationService>,
		pricing: Arc<dyn PricingCalculator>,
		clock: Arc<dyn Clock>,
		policy: PolicySettings,
	) -> Self {
		Self {
			storage,
			notifications,
			pricing,
			clock,
			policy,
		}
	}

	/// Places a new order in `Pending` and notifies the vendor.
	///
	/// The pricing collaborator is consulted exactly once, here; transitions
	/// never recompute monetary values.
	pub async fn place_order(&self, request: NewOrder) -> Result<Order, PlaceOrderError> {
		if request.items.is_empty() {
			return Err(PlaceOrderError::Validation(
				"order must contain at least one item".into(),
			));
		}
		if request.items.iter().any(|item| item.quantity == 0) {
			return Err(PlaceOrderError::Validation(
				"item quantities must be positive".into(),
			));
		}

		let items: Vec<OrderItem> = request.items.clone().into_iter().map(Into::into).collect();
		let pricing = self
			.pricing
			.quote(&items)
			.await
			.map_err(|e| PlaceOrderError::Pricing(e.to_string()))?;

		let now = self.clock.now();
		let order = Order::new(request, items, pricing, now);
		let history = vec![StatusChange {
			status: OrderStatus::Pending,
			actor: ActorKind::Customer,
			actor_id: Some(order.customer_id.clone()),
			note: None,
			at: now,
		}];

		let ops = vec![
			WriteOp::put(StorageKey::Orders.as_str(), &order.id, &order)
				.map_err(|e| PlaceOrderError::Storage(e.to_string()))?,
			WriteOp::put(StorageKey::OrderHistory.as_str(), &order.id, &history)
				.map_err(|e| PlaceOrderError::Storage(e.to_string()))?,
		];
		let inserted = self
			.storage
			.compare_and_swap(StorageKey::Orders.as_str(), &order.id, None, ops)
			.await
			.map_err(|e| PlaceOrderError::Storage(e.to_string()))?;
		if !inserted {
			return Err(PlaceOrderError::Storage(format!(
				"order id collision for {}",
				order.id
			)));
		}

		self.notifications.dispatch(notify::placed_notification(&order));
		tracing::info!(
			order_number = %order.order_number,
			vendor_id = %order.vendor_id,
			"order placed"
		);
		Ok(order)
	}

	/// Transitions an order to a new status.
	///
	/// On success the new state, its first-entry timestamp and an appended
	/// history row are persisted in one guarded commit, and a notification
	/// to the counter-party is scheduled as a side effect. A concurrent
	/// writer makes the guard fail, in which case the loser re-reads and
	/// reports what it now sees, having changed nothing.
	pub async fn transition(
		&self,
		order_id: &str,
		requested: OrderStatus,
		actor: &Actor,
		note: Option<&str>,
	) -> Result<Order, TransitionError> {
		let (order, snapshot) = self
			.storage
			.retrieve_with_raw::<Order>(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| TransitionError::from_storage(e, order_id))?;

		self.check_transition(&order, requested, actor)?;

		let now = self.clock.now();
		let mut updated = order.clone();
		updated.status = requested;
		updated.updated_at = now;
		updated.record_status_entry(requested, now);
		if requested == OrderStatus::Cancelled {
			updated.cancelled_at = Some(now);
			updated.cancellation_reason = note.map(str::to_string);
			updated.cancelled_by = Some(actor.kind);
		}

		let mut history = self.load_history(order_id).await?;
		history.push(StatusChange {
			status: requested,
			actor: actor.kind,
			actor_id: actor.id.clone(),
			note: note.map(str::to_string),
			at: now,
		});

		let ops = vec![
			WriteOp::put(StorageKey::Orders.as_str(), order_id, &updated)
				.map_err(|e| TransitionError::Storage(e.to_string()))?,
			WriteOp::put(StorageKey::OrderHistory.as_str(), order_id, &history)
				.map_err(|e| TransitionError::Storage(e.to_string()))?,
		];
		let applied = self
			.storage
			.compare_and_swap(StorageKey::Orders.as_str(), order_id, Some(&snapshot), ops)
			.await
			.map_err(|e| TransitionError::Storage(e.to_string()))?;

		if !applied {
			// Lost the race to a concurrent writer. Report against the
			// state that actually won; no history row, no notification.
			let current: Order = self
				.storage
				.retrieve(StorageKey::Orders.as_str(), order_id)
				.await
				.map_err(|e| TransitionError::from_storage(e, order_id))?;
			tracing::debug!(
				order_number = %current.order_number,
				requested = %requested,
				current = %current.status,
				"transition lost a concurrent update"
			);
			return Err(if current.status.is_terminal() {
				TransitionError::AlreadyTerminal {
					status: current.status,
				}
			} else {
				TransitionError::InvalidTransition {
					from: current.status,
					to: requested,
				}
			});
		}

		if let Some(notification) = notify::transition_notification(&updated, actor) {
			self.notifications.dispatch(notification);
		}
		tracing::info!(
			order_number = %updated.order_number,
			from = %order.status,
			to = %requested,
			actor = %actor.kind,
			"order transitioned"
		);
		Ok(updated)
	}

	/// Cancels an order; thin wrapper over `transition` to `Cancelled`.
	pub async fn cancel_order(
		&self,
		order_id: &str,
		actor: &Actor,
		reason: Option<&str>,
	) -> Result<Order, TransitionError> {
		self.transition(order_id, OrderStatus::Cancelled, actor, reason)
			.await
	}

	/// Reports whether the actor could cancel right now, without mutating
	/// anything, and how much of the cancellation window remains when one
	/// applies.
	pub async fn can_cancel(
		&self,
		order_id: &str,
		actor: &Actor,
	) -> Result<CancelEligibility, TransitionError> {
		let order: Order = self
			.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| TransitionError::from_storage(e, order_id))?;

		match self.check_transition(&order, OrderStatus::Cancelled, actor) {
			Ok(()) => {
				let window_remaining =
					if actor.kind == ActorKind::Customer && order.status == OrderStatus::Confirmed {
						self.window_remaining(&order)
					} else {
						None
					};
				Ok(CancelEligibility {
					allowed: true,
					window_remaining,
				})
			},
			Err(
				TransitionError::InvalidTransition { .. }
				| TransitionError::Forbidden { .. }
				| TransitionError::AlreadyTerminal { .. }
				| TransitionError::WindowExpired,
			) => Ok(CancelEligibility {
				allowed: false,
				window_remaining: None,
			}),
			Err(e) => Err(e),
		}
	}

	/// Assigns a delivery agent to a live order. Vendor-only; not a status
	/// change, but still a guarded write so it cannot clobber a concurrent
	/// transition.
	pub async fn assign_delivery_agent(
		&self,
		order_id: &str,
		actor: &Actor,
		agent_id: &str,
	) -> Result<Order, TransitionError> {
		// Bounded retries: an assignment losing to a status transition can
		// simply be reapplied on the fresh record.
		for _ in 0..3 {
			let (order, snapshot) = self
				.storage
				.retrieve_with_raw::<Order>(StorageKey::Orders.as_str(), order_id)
				.await
				.map_err(|e| TransitionError::from_storage(e, order_id))?;

			if order.status.is_terminal() {
				return Err(TransitionError::AlreadyTerminal {
					status: order.status,
				});
			}
			if actor.kind != ActorKind::Vendor
				|| actor.id.as_deref() != Some(order.vendor_id.as_str())
			{
				return Err(TransitionError::Forbidden {
					actor: actor.kind,
					from: order.status,
					to: order.status,
				});
			}

			let mut updated = order.clone();
			updated.delivery_agent_id = Some(agent_id.to_string());
			updated.updated_at = self.clock.now();

			let ops = vec![WriteOp::put(StorageKey::Orders.as_str(), order_id, &updated)
				.map_err(|e| TransitionError::Storage(e.to_string()))?];
			let applied = self
				.storage
				.compare_and_swap(StorageKey::Orders.as_str(), order_id, Some(&snapshot), ops)
				.await
				.map_err(|e| TransitionError::Storage(e.to_string()))?;

			if applied {
				self.notifications
					.dispatch(notify::agent_assigned_notification(&updated, agent_id));
				return Ok(updated);
			}
		}

		Err(TransitionError::Storage(format!(
			"could not assign agent to {} after repeated conflicts",
			order_id
		)))
	}

	/// Gets an order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, TransitionError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| TransitionError::from_storage(e, order_id))
	}

	/// Returns the ordered status history ledger for an order.
	pub async fn get_history(&self, order_id: &str) -> Result<Vec<StatusChange>, TransitionError> {
		// Distinguish "no such order" from "order with no rows yet".
		if !self
			.storage
			.exists(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| TransitionError::Storage(e.to_string()))?
		{
			return Err(TransitionError::OrderNotFound(order_id.to_string()));
		}
		self.load_history(order_id).await
	}

	/// Validates edge, authorization and the cancellation window against
	/// the in-memory order snapshot. Pure; mutates nothing.
	fn check_transition(
		&self,
		order: &Order,
		requested: OrderStatus,
		actor: &Actor,
	) -> Result<(), TransitionError> {
		if order.status.is_terminal() {
			return Err(TransitionError::AlreadyTerminal {
				status: order.status,
			});
		}
		if !transitions::is_successor(order.status, requested) {
			return Err(TransitionError::InvalidTransition {
				from: order.status,
				to: requested,
			});
		}
		if !transitions::actor_may(order, order.status, requested, actor) {
			return Err(TransitionError::Forbidden {
				actor: actor.kind,
				from: order.status,
				to: requested,
			});
		}

		// Customers may back out of a confirmed order only within the
		// window after confirmation. The system actor never hits this:
		// it only cancels orders that never reached Confirmed.
		if requested == OrderStatus::Cancelled
			&& actor.kind == ActorKind::Customer
			&& order.status == OrderStatus::Confirmed
			&& self.window_remaining(order).is_none()
		{
			return Err(TransitionError::WindowExpired);
		}
		Ok(())
	}

	/// Time left in the customer cancellation window, `None` once it has
	/// fully elapsed or the order was never confirmed.
	fn window_remaining(&self, order: &Order) -> Option<Duration> {
		let confirmed_at = order.entered_at(OrderStatus::Confirmed)?;
		let elapsed = elapsed_since(self.clock.now(), confirmed_at);
		self.policy.cancellation_window().checked_sub(elapsed)
	}

	async fn load_history(&self, order_id: &str) -> Result<Vec<StatusChange>, TransitionError> {
		match self
			.storage
			.retrieve::<Vec<StatusChange>>(StorageKey::OrderHistory.as_str(), order_id)
			.await
		{
			Ok(history) => Ok(history),
			Err(StorageError::NotFound) => Ok(Vec::new()),
			Err(e) => Err(TransitionError::Storage(e.to_string())),
		}
	}
}

/// Wall-clock elapsed time, clamped to zero under clock skew.
pub(crate) fn elapsed_since(now: DateTime<Utc>, earlier: DateTime<Utc>) -> Duration {
	now.signed_duration_since(earlier).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_notify::{MemoryNotifier, NotifyCategory};
	use fulfillment_storage::MemoryStorage;
	use fulfillment_types::{ItemSumPricing, ManualClock, NewOrderItem};
	use rust_decimal::Decimal;

	struct Harness {
		engine: OrderStateMachine,
		clock: Arc<ManualClock>,
		sink: MemoryNotifier,
	}

	fn harness() -> Harness {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let sink = MemoryNotifier::new();
		let notifications = Arc::new(NotificationService::new(Box::new(sink.clone())));
		let clock = Arc::new(ManualClock::new(Utc::now()));
		let engine = OrderStateMachine::new(
			storage,
			notifications,
			Arc::new(ItemSumPricing::default()),
			clock.clone(),
			PolicySettings::default(),
		);
		Harness {
			engine,
			clock,
			sink,
		}
	}

	fn request() -> NewOrder {
		NewOrder {
			customer_id: "cust-1".into(),
			vendor_id: "vend-1".into(),
			items: vec![NewOrderItem {
				food_id: "food-1".into(),
				name: "Rice & Curry".into(),
				description: "Lunch pack".into(),
				quantity: 2,
				unit_price: Decimal::new(500, 2),
				special_instructions: None,
			}],
			delivery_address: "12 Temple Road".into(),
			delivery_instructions: None,
		}
	}

	fn minutes(m: u64) -> Duration {
		Duration::from_secs(m * 60)
	}

	#[tokio::test]
	async fn happy_path_reaches_delivered() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();
		assert_eq!(order.status, OrderStatus::Pending);

		let vendor = Actor::vendor("vend-1");
		h.engine
			.transition(&order.id, OrderStatus::Confirmed, &vendor, None)
			.await
			.unwrap();
		h.engine
			.transition(&order.id, OrderStatus::Preparing, &vendor, None)
			.await
			.unwrap();
		h.engine
			.assign_delivery_agent(&order.id, &vendor, "agent-1")
			.await
			.unwrap();
		h.engine
			.transition(&order.id, OrderStatus::Ready, &vendor, None)
			.await
			.unwrap();

		let agent = Actor::delivery_agent("agent-1");
		h.engine
			.transition(&order.id, OrderStatus::OutForDelivery, &agent, None)
			.await
			.unwrap();
		let delivered = h
			.engine
			.transition(&order.id, OrderStatus::Delivered, &agent, None)
			.await
			.unwrap();

		assert_eq!(delivered.status, OrderStatus::Delivered);
		assert!(delivered.cancelled_at.is_none());
		assert!(delivered.entered_at(OrderStatus::Delivered).is_some());

		let history = h.engine.get_history(&order.id).await.unwrap();
		let states: Vec<OrderStatus> = history.iter().map(|row| row.status).collect();
		assert_eq!(
			states,
			vec![
				OrderStatus::Pending,
				OrderStatus::Confirmed,
				OrderStatus::Preparing,
				OrderStatus::Ready,
				OrderStatus::OutForDelivery,
				OrderStatus::Delivered,
			]
		);
	}

	#[tokio::test]
	async fn cancelled_at_is_set_iff_cancelled() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();
		assert!(order.cancelled_at.is_none());

		let cancelled = h
			.engine
			.cancel_order(&order.id, &Actor::customer("cust-1"), Some("changed my mind"))
			.await
			.unwrap();
		assert_eq!(cancelled.status, OrderStatus::Cancelled);
		assert!(cancelled.cancelled_at.is_some());
		assert_eq!(cancelled.cancelled_by, Some(ActorKind::Customer));
		assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));
	}

	#[tokio::test]
	async fn repeated_cancellation_reports_already_terminal() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();
		let customer = Actor::customer("cust-1");

		h.engine.cancel_order(&order.id, &customer, None).await.unwrap();
		let err = h
			.engine
			.cancel_order(&order.id, &customer, None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			TransitionError::AlreadyTerminal {
				status: OrderStatus::Cancelled
			}
		));

		// No extra history row for the rejected attempt.
		let history = h.engine.get_history(&order.id).await.unwrap();
		assert_eq!(history.len(), 2);
	}

	#[tokio::test]
	async fn skipping_states_is_rejected() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();

		let err = h
			.engine
			.transition(&order.id, OrderStatus::Preparing, &Actor::vendor("vend-1"), None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			TransitionError::InvalidTransition {
				from: OrderStatus::Pending,
				to: OrderStatus::Preparing
			}
		));
	}

	#[tokio::test]
	async fn wrong_vendor_is_forbidden() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();

		let err = h
			.engine
			.transition(&order.id, OrderStatus::Confirmed, &Actor::vendor("vend-2"), None)
			.await
			.unwrap_err();
		assert!(matches!(err, TransitionError::Forbidden { .. }));

		// The rejection changed nothing.
		let current = h.engine.get_order(&order.id).await.unwrap();
		assert_eq!(current.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn customer_window_closes_after_ten_minutes() {
		let h = harness();
		let customer = Actor::customer("cust-1");
		let vendor = Actor::vendor("vend-1");

		// Within the window: 9m59s after confirmation.
		let order = h.engine.place_order(request()).await.unwrap();
		h.engine
			.transition(&order.id, OrderStatus::Confirmed, &vendor, None)
			.await
			.unwrap();
		h.clock.advance(minutes(10) - Duration::from_secs(1));
		let eligibility = h.engine.can_cancel(&order.id, &customer).await.unwrap();
		assert!(eligibility.allowed);
		assert_eq!(eligibility.window_remaining, Some(Duration::from_secs(1)));
		h.engine.cancel_order(&order.id, &customer, None).await.unwrap();

		// Past the window: 10m01s after confirmation.
		let order = h.engine.place_order(request()).await.unwrap();
		h.engine
			.transition(&order.id, OrderStatus::Confirmed, &vendor, None)
			.await
			.unwrap();
		h.clock.advance(minutes(10) + Duration::from_secs(1));
		let eligibility = h.engine.can_cancel(&order.id, &customer).await.unwrap();
		assert!(!eligibility.allowed);
		let err = h
			.engine
			.cancel_order(&order.id, &customer, None)
			.await
			.unwrap_err();
		assert!(matches!(err, TransitionError::WindowExpired));

		// The vendor is not subject to the customer window.
		let vendor_view = h.engine.can_cancel(&order.id, &vendor).await.unwrap();
		assert!(vendor_view.allowed);
	}

	#[tokio::test]
	async fn confirm_and_system_cancel_race_has_one_winner() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();
		h.clock.advance(minutes(11));

		let confirm = h.engine.transition(
			&order.id,
			OrderStatus::Confirmed,
			&Actor::vendor("vend-1"),
			None,
		);
		let cancel = h.engine.transition(
			&order.id,
			OrderStatus::Cancelled,
			&Actor::system(),
			Some("auto-cancelled: vendor did not confirm in time"),
		);
		let (confirm_result, cancel_result) = tokio::join!(confirm, cancel);

		assert!(
			confirm_result.is_ok() != cancel_result.is_ok(),
			"exactly one of the racing transitions must win"
		);

		// One placement row plus exactly one transition row - never two
		// contradictory ones.
		let history = h.engine.get_history(&order.id).await.unwrap();
		assert_eq!(history.len(), 2);

		let current = h.engine.get_order(&order.id).await.unwrap();
		match current.status {
			OrderStatus::Cancelled => {
				assert_eq!(current.cancelled_by, Some(ActorKind::System));
				assert!(current.cancelled_at.is_some());
			},
			OrderStatus::Confirmed => assert!(current.cancelled_at.is_none()),
			other => panic!("unexpected winner state {other}"),
		}
	}

	#[tokio::test]
	async fn system_cancellation_notifies_the_customer_distinctly() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();

		h.engine
			.transition(
				&order.id,
				OrderStatus::Cancelled,
				&Actor::system(),
				Some("auto-cancelled: vendor did not confirm in time"),
			)
			.await
			.unwrap();

		// Placement notification to the vendor, auto-cancel copy to the
		// customer.
		let sent = h.sink.wait_for(2, Duration::from_secs(1)).await;
		let auto = sent
			.iter()
			.find(|n| n.category == NotifyCategory::AutoCancelled)
			.expect("auto-cancel notification");
		assert_eq!(auto.recipient, "cust-1");

		let vendor_cancelled = h.engine.place_order(request()).await.unwrap();
		h.engine
			.cancel_order(&vendor_cancelled.id, &Actor::vendor("vend-1"), Some("out of stock"))
			.await
			.unwrap();
		let sent = h.sink.wait_for(4, Duration::from_secs(1)).await;
		let vendor_copy = sent
			.iter()
			.find(|n| n.category == NotifyCategory::OrderCancelled)
			.expect("vendor cancellation notification");
		assert_eq!(vendor_copy.recipient, "cust-1");
		assert_ne!(vendor_copy.subject, auto.subject);
	}

	#[tokio::test]
	async fn place_order_rejects_empty_and_zero_quantity() {
		let h = harness();

		let mut empty = request();
		empty.items.clear();
		assert!(matches!(
			h.engine.place_order(empty).await,
			Err(PlaceOrderError::Validation(_))
		));

		let mut zero = request();
		zero.items[0].quantity = 0;
		assert!(matches!(
			h.engine.place_order(zero).await,
			Err(PlaceOrderError::Validation(_))
		));
	}

	#[tokio::test]
	async fn pricing_is_computed_once_at_intake() {
		let h = harness();
		let order = h.engine.place_order(request()).await.unwrap();
		assert_eq!(order.pricing.subtotal, Decimal::new(1000, 2));
		assert_eq!(order.pricing.total, Decimal::new(1000, 2));

		let confirmed = h
			.engine
			.transition(&order.id, OrderStatus::Confirmed, &Actor::vendor("vend-1"), None)
			.await
			.unwrap();
		assert_eq!(confirmed.pricing, order.pricing);
	}

	#[tokio::test]
	async fn unknown_order_reports_not_found() {
		let h = harness();
		let err = h
			.engine
			.transition("missing", OrderStatus::Confirmed, &Actor::vendor("vend-1"), None)
			.await
			.unwrap_err();
		assert!(matches!(err, TransitionError::OrderNotFound(_)));

		let err = h.engine.get_history("missing").await.unwrap_err();
		assert!(matches!(err, TransitionError::OrderNotFound(_)));
	}
}
