//! Background scheduler enforcing the vendor confirmation SLA.
//!
//! A recurring task scans for `Pending` orders older than the grace period
//! and drives each through the state machine as the system actor. The
//! scheduler is an owned component with an explicit start/stop lifecycle;
//! nothing starts at import time, and all deadlines are wall-clock
//! comparisons against persisted timestamps, so restarts lose nothing.

use chrono::{DateTime, Utc};
use fulfillment_storage::StorageService;
use fulfillment_types::{Actor, Clock, Order, OrderStatus, StorageKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::engine::{elapsed_since, OrderStateMachine, TransitionError};

/// Note recorded on every timer-driven cancellation.
pub const AUTO_CANCEL_NOTE: &str = "auto-cancelled: vendor did not confirm in time";

/// Runtime settings for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
	/// How often the auto-cancel scan runs.
	pub tick_interval: Duration,
	/// How long a vendor has to confirm a pending order.
	pub confirmation_grace: Duration,
	/// How often the run-history bookkeeping is pruned.
	pub prune_interval: Duration,
	/// How long run records are retained.
	pub run_history_max_age: Duration,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			tick_interval: Duration::from_secs(60),
			confirmation_grace: Duration::from_secs(600),
			prune_interval: Duration::from_secs(604_800),
			run_history_max_age: Duration::from_secs(604_800),
		}
	}
}

/// What one scan accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
	/// Pending orders past the grace period this tick considered.
	pub expired: usize,
	/// How many of them were actually cancelled.
	pub cancelled: usize,
}

/// Bookkeeping row written after each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExecutionRecord {
	id: String,
	run_at: DateTime<Utc>,
	expired: usize,
	cancelled: usize,
}

/// Auto-cancels orders a vendor failed to confirm in time.
pub struct SlaScheduler {
	engine: Arc<OrderStateMachine>,
	storage: Arc<StorageService>,
	clock: Arc<dyn Clock>,
	config: SchedulerConfig,
}

/// Handle to a running scheduler; dropping it does not stop the task,
/// calling [`SchedulerHandle::stop`] does.
pub struct SchedulerHandle {
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}

impl SchedulerHandle {
	/// Signals the scheduler to stop and waits for it to finish.
	pub async fn stop(self) {
		let _ = self.shutdown.send(true);
		let _ = self.task.await;
	}
}

impl SlaScheduler {
	pub fn new(
		engine: Arc<OrderStateMachine>,
		storage: Arc<StorageService>,
		clock: Arc<dyn Clock>,
		config: SchedulerConfig,
	) -> Self {
		Self {
			engine,
			storage,
			clock,
			config,
		}
	}

	/// Spawns the recurring scan and returns its handle.
	pub fn start(self: &Arc<Self>) -> SchedulerHandle {
		let (shutdown, receiver) = watch::channel(false);
		let scheduler = Arc::clone(self);
		let task = tokio::spawn(async move {
			scheduler.run(receiver).await;
		});
		tracing::info!(
			tick_interval_secs = self.config.tick_interval.as_secs(),
			grace_secs = self.config.confirmation_grace.as_secs(),
			"auto-cancel scheduler started"
		);
		SchedulerHandle { shutdown, task }
	}

	/// The scheduler loop. Ticks run inline in this task, so two scans can
	/// never overlap; ticks that fire while a scan is still running are
	/// skipped rather than queued.
	async fn run(&self, mut shutdown: watch::Receiver<bool>) {
		let mut tick = tokio::time::interval(self.config.tick_interval);
		tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
		let mut prune = tokio::time::interval(self.config.prune_interval);
		prune.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

		loop {
			tokio::select! {
				_ = tick.tick() => {
					self.tick().await;
				},
				_ = prune.tick() => {
					self.prune_run_history().await;
				},
				changed = shutdown.changed() => {
					if changed.is_err() || *shutdown.borrow() {
						break;
					}
				},
			}
		}
		tracing::info!("auto-cancel scheduler stopped");
	}

	/// Runs one auto-cancel scan.
	///
	/// Each order is processed independently: an order that was confirmed
	/// between selection and transition loses the conditional update inside
	/// the engine and is simply skipped, and a failure on one order never
	/// aborts the rest of the batch. A scan that cannot read the store at
	/// all logs and waits for the next tick.
	pub async fn tick(&self) -> TickSummary {
		let now = self.clock.now();
		let rows = match self
			.storage
			.retrieve_all::<serde_json::Value>(StorageKey::Orders.as_str())
			.await
		{
			Ok(rows) => rows,
			Err(e) => {
				tracing::error!(error = %e, "auto-cancel scan could not read orders; will retry next tick");
				return TickSummary::default();
			},
		};

		let mut summary = TickSummary::default();
		for (order_id, row) in rows {
			// Decode per row so one bad record cannot abort the batch.
			let order: Order = match serde_json::from_value(row) {
				Ok(order) => order,
				Err(e) => {
					tracing::warn!(order_id = %order_id, error = %e, "skipping undecodable order record");
					continue;
				},
			};
			if order.status != OrderStatus::Pending
				|| elapsed_since(now, order.created_at) <= self.config.confirmation_grace
			{
				continue;
			}
			summary.expired += 1;

			match self
				.engine
				.transition(
					&order_id,
					OrderStatus::Cancelled,
					&Actor::system(),
					Some(AUTO_CANCEL_NOTE),
				)
				.await
			{
				Ok(cancelled) => {
					summary.cancelled += 1;
					tracing::info!(
						order_number = %cancelled.order_number,
						"auto-cancelled unconfirmed order"
					);
				},
				Err(
					TransitionError::AlreadyTerminal { .. }
					| TransitionError::InvalidTransition { .. },
				) => {
					tracing::debug!(
						order_number = %order.order_number,
						"order changed state before auto-cancel, skipping"
					);
				},
				Err(e) => {
					tracing::error!(
						order_number = %order.order_number,
						error = %e,
						"failed to auto-cancel order"
					);
				},
			}
		}

		let record = ExecutionRecord {
			id: Uuid::new_v4().to_string(),
			run_at: now,
			expired: summary.expired,
			cancelled: summary.cancelled,
		};
		if let Err(e) = self
			.storage
			.store(StorageKey::SchedulerRuns.as_str(), &record.id, &record)
			.await
		{
			tracing::warn!(error = %e, "failed to record scheduler run");
		}

		if summary.cancelled > 0 {
			tracing::info!(
				cancelled = summary.cancelled,
				"auto-cancelled orders due to vendor non-response"
			);
		}
		summary
	}

	/// Deletes run records older than the retention period. Housekeeping
	/// only; order data is never touched.
	pub async fn prune_run_history(&self) -> usize {
		let now = self.clock.now();
		let records = match self
			.storage
			.retrieve_all::<ExecutionRecord>(StorageKey::SchedulerRuns.as_str())
			.await
		{
			Ok(records) => records,
			Err(e) => {
				tracing::warn!(error = %e, "could not read scheduler run history");
				return 0;
			},
		};

		let mut removed = 0;
		for (id, record) in records {
			if elapsed_since(now, record.run_at) <= self.config.run_history_max_age {
				continue;
			}
			match self
				.storage
				.remove(StorageKey::SchedulerRuns.as_str(), &id)
				.await
			{
				Ok(()) => removed += 1,
				Err(e) => {
					tracing::warn!(error = %e, "failed to prune scheduler run record");
				},
			}
		}

		if removed > 0 {
			tracing::info!(removed, "pruned old scheduler run records");
		}
		removed
	}
}
