//! Logging notification sink.
//!
//! Writes every notification to the tracing log instead of an external
//! transport. This is the default sink for development and for hosts that
//! wire their own delivery pipeline downstream of the log.

use crate::{Notification, NotifyError, NotifyInterface};
use async_trait::async_trait;

/// Sink that records notifications in the application log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl NotifyInterface for LogNotifier {
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		tracing::info!(
			recipient = %notification.recipient,
			category = ?notification.category,
			subject = %notification.subject,
			"notification"
		);
		Ok(())
	}
}
