//! In-memory notification sink.
//!
//! Captures delivered notifications so tests can assert on what the core
//! decided to send.

use crate::{Notification, NotifyError, NotifyInterface};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Sink that collects notifications in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
	sent: Arc<RwLock<Vec<Notification>>>,
}

impl MemoryNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of everything delivered so far.
	pub async fn sent(&self) -> Vec<Notification> {
		self.sent.read().await.clone()
	}

	/// Waits until at least `count` notifications were delivered, or the
	/// timeout elapses, and returns what arrived. Dispatch is
	/// asynchronous, so tests need a drain point.
	pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
		let deadline = tokio::time::Instant::now() + timeout;
		loop {
			let sent = self.sent.read().await;
			if sent.len() >= count || tokio::time::Instant::now() >= deadline {
				return sent.clone();
			}
			drop(sent);
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	}
}

#[async_trait]
impl NotifyInterface for MemoryNotifier {
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		self.sent.write().await.push(notification.clone());
		Ok(())
	}
}
