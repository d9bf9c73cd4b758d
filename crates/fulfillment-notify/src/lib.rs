//! Notification dispatch for the order fulfillment system.
//!
//! The fulfillment core decides *that* and *what* to notify; delivery
//! transport (email, push) lives behind the [`NotifyInterface`] sink.
//! Dispatch is fire-and-forget: callers enqueue and return immediately,
//! a background worker drains the queue, and sink failures are logged
//! and swallowed so they can never roll back an order transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod memory;
}

pub use implementations::log::LogNotifier;
pub use implementations::memory::MemoryNotifier;

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs when the transport fails to deliver.
	#[error("Delivery failed: {0}")]
	Delivery(String),
}

/// What kind of event a notification reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotifyCategory {
	/// A new order arrived for a vendor.
	OrderPlaced,
	/// The vendor confirmed an order.
	OrderConfirmed,
	/// An order moved forward in the delivery lifecycle.
	OrderProgress,
	/// An order was cancelled by a customer or vendor.
	OrderCancelled,
	/// An order was cancelled by the SLA timer.
	AutoCancelled,
	/// A vendor was invited to collaborate on an order.
	CollaborationInvite,
	/// A collaboration assignment changed state.
	CollaborationUpdate,
}

/// A single message addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
	/// User id of the recipient.
	pub recipient: String,
	/// Short subject line.
	pub subject: String,
	/// Message body.
	pub body: String,
	/// Event category, used by transports for routing and templating.
	pub category: NotifyCategory,
}

/// Trait defining the interface for notification transports.
///
/// Implementations deliver a single notification; the service above them
/// owns queueing and failure isolation.
#[async_trait]
pub trait NotifyInterface: Send + Sync {
	/// Delivers one notification.
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Service that dispatches notifications without blocking the caller.
///
/// `dispatch` pushes onto an unbounded channel and returns; a worker task
/// spawned at construction drains the channel into the sink. The service
/// never reports delivery failures back to the caller.
pub struct NotificationService {
	queue: mpsc::UnboundedSender<Notification>,
}

impl NotificationService {
	/// Creates the service and spawns its worker task.
	///
	/// Must be called within a Tokio runtime.
	pub fn new(sink: Box<dyn NotifyInterface>) -> Self {
		let (queue, mut receiver) = mpsc::unbounded_channel::<Notification>();

		tokio::spawn(async move {
			while let Some(notification) = receiver.recv().await {
				if let Err(e) = sink.deliver(&notification).await {
					tracing::warn!(
						recipient = %notification.recipient,
						category = ?notification.category,
						error = %e,
						"failed to deliver notification"
					);
				}
			}
		});

		Self { queue }
	}

	/// Enqueues a notification and returns immediately.
	pub fn dispatch(&self, notification: Notification) {
		if self.queue.send(notification).is_err() {
			// Worker is gone, e.g. during shutdown. Nothing to do but log.
			tracing::warn!("notification queue closed, dropping notification");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	struct FailingSink;

	#[async_trait]
	impl NotifyInterface for FailingSink {
		async fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
			Err(NotifyError::Delivery("smtp down".into()))
		}
	}

	fn sample(recipient: &str) -> Notification {
		Notification {
			recipient: recipient.into(),
			subject: "Order ORD-TEST1234 confirmed".into(),
			body: "Your order is being prepared.".into(),
			category: NotifyCategory::OrderConfirmed,
		}
	}

	#[tokio::test]
	async fn dispatch_reaches_the_sink() {
		let sink = MemoryNotifier::new();
		let service = NotificationService::new(Box::new(sink.clone()));

		service.dispatch(sample("cust-1"));
		service.dispatch(sample("cust-2"));

		let sent = sink.wait_for(2, Duration::from_secs(1)).await;
		assert_eq!(sent.len(), 2);
		assert_eq!(sent[0].recipient, "cust-1");
	}

	#[tokio::test]
	async fn sink_failures_do_not_reach_the_caller() {
		let service = NotificationService::new(Box::new(FailingSink));

		// Both enqueue fine; the worker logs and keeps draining.
		service.dispatch(sample("cust-1"));
		service.dispatch(sample("cust-2"));
		tokio::time::sleep(Duration::from_millis(50)).await;
	}
}
