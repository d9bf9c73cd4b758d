//! Composition of the fulfillment core.
//!
//! The builder wires storage, notifications, clock and pricing into the
//! engine, coordinator and scheduler. Nothing here starts running by
//! itself: the host's composition root decides if and when to start the
//! scheduler, which is what makes the whole core testable against a
//! virtual clock.

use fulfillment_notify::{LogNotifier, NotificationService, NotifyInterface};
use fulfillment_storage::{FileStorage, MemoryStorage, StorageInterface, StorageService};
use fulfillment_types::{Clock, ItemSumPricing, PricingCalculator, SystemClock};
use std::sync::Arc;

use crate::collaboration::CollaborationCoordinator;
use crate::config::{Config, ConfigError, StorageBackendKind};
use crate::engine::OrderStateMachine;
use crate::scheduler::{SchedulerConfig, SlaScheduler};

/// The assembled fulfillment core.
pub struct Fulfillment {
	engine: Arc<OrderStateMachine>,
	coordinator: Arc<CollaborationCoordinator>,
	scheduler: Arc<SlaScheduler>,
}

impl Fulfillment {
	/// The order state machine: placement, transitions, cancellation,
	/// history.
	pub fn orders(&self) -> &Arc<OrderStateMachine> {
		&self.engine
	}

	/// The collaboration coordinator for multi-vendor event orders.
	pub fn collaborations(&self) -> &Arc<CollaborationCoordinator> {
		&self.coordinator
	}

	/// The SLA scheduler. Call [`crate::scheduler::SlaScheduler::start`]
	/// from the host to begin auto-cancel scans.
	pub fn scheduler(&self) -> &Arc<SlaScheduler> {
		&self.scheduler
	}
}

/// Builder for the fulfillment core.
pub struct FulfillmentBuilder {
	config: Config,
	storage: Option<Box<dyn StorageInterface>>,
	notifier: Option<Box<dyn NotifyInterface>>,
	pricing: Option<Arc<dyn PricingCalculator>>,
	clock: Option<Arc<dyn Clock>>,
}

impl FulfillmentBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			storage: None,
			notifier: None,
			pricing: None,
			clock: None,
		}
	}

	/// Overrides the storage backend the configuration would have chosen.
	pub fn with_storage(mut self, storage: Box<dyn StorageInterface>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Sets the notification transport. Defaults to the logging sink.
	pub fn with_notifier(mut self, notifier: Box<dyn NotifyInterface>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	/// Sets the pricing collaborator. Defaults to summing line totals
	/// with no delivery fee.
	pub fn with_pricing(mut self, pricing: Arc<dyn PricingCalculator>) -> Self {
		self.pricing = Some(pricing);
		self
	}

	/// Sets the time source. Defaults to the system clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Assembles the core. Must be called within a Tokio runtime, since
	/// the notification worker is spawned here.
	pub fn build(self) -> Result<Fulfillment, ConfigError> {
		self.config.validate()?;

		let backend = match self.storage {
			Some(backend) => backend,
			None => match self.config.storage.backend {
				StorageBackendKind::Memory => Box::new(MemoryStorage::new()),
				StorageBackendKind::File => {
					Box::new(FileStorage::new(self.config.storage.path.clone()))
				},
			},
		};
		let storage = Arc::new(StorageService::new(backend));

		let notifier = self
			.notifier
			.unwrap_or_else(|| Box::new(LogNotifier::new()));
		let notifications = Arc::new(NotificationService::new(notifier));

		let pricing = self
			.pricing
			.unwrap_or_else(|| Arc::new(ItemSumPricing::default()));
		let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

		let engine = Arc::new(OrderStateMachine::new(
			storage.clone(),
			notifications.clone(),
			pricing,
			clock.clone(),
			self.config.policy.clone(),
		));
		let coordinator = Arc::new(CollaborationCoordinator::new(
			storage.clone(),
			notifications.clone(),
			clock.clone(),
		));
		let scheduler = Arc::new(SlaScheduler::new(
			engine.clone(),
			storage,
			clock,
			SchedulerConfig {
				tick_interval: self.config.scheduler.tick_interval(),
				confirmation_grace: self.config.policy.confirmation_grace(),
				prune_interval: self.config.scheduler.prune_interval(),
				run_history_max_age: self.config.scheduler.run_history_max_age(),
			},
		));

		Ok(Fulfillment {
			engine,
			coordinator,
			scheduler,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_types::{NewOrder, NewOrderItem, OrderStatus};
	use rust_decimal::Decimal;

	fn memory_config() -> Config {
		Config::from_toml_str(
			r#"
			[storage]
			backend = "memory"
			"#,
		)
		.unwrap()
	}

	#[tokio::test]
	async fn builds_a_working_core_from_config() {
		let fulfillment = FulfillmentBuilder::new(memory_config()).build().unwrap();

		let order = fulfillment
			.orders()
			.place_order(NewOrder {
				customer_id: "cust-1".into(),
				vendor_id: "vend-1".into(),
				items: vec![NewOrderItem {
					food_id: "food-1".into(),
					name: "Lamprais".into(),
					description: "Banana-leaf wrapped".into(),
					quantity: 1,
					unit_price: Decimal::new(950, 2),
					special_instructions: None,
				}],
				delivery_address: "12 Temple Road".into(),
				delivery_instructions: None,
			})
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Pending);
		// Default pricing sums line totals with no fee.
		assert_eq!(order.pricing.total, Decimal::new(950, 2));
	}

	#[tokio::test]
	async fn file_backend_round_trips_through_the_builder() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = Config::default();
		config.storage.path = dir.path().to_path_buf();

		let fulfillment = FulfillmentBuilder::new(config).build().unwrap();
		let order = fulfillment
			.orders()
			.place_order(NewOrder {
				customer_id: "cust-1".into(),
				vendor_id: "vend-1".into(),
				items: vec![NewOrderItem {
					food_id: "food-1".into(),
					name: "Watalappan".into(),
					description: "Dessert tray".into(),
					quantity: 2,
					unit_price: Decimal::new(400, 2),
					special_instructions: None,
				}],
				delivery_address: "12 Temple Road".into(),
				delivery_instructions: None,
			})
			.await
			.unwrap();

		let read_back = fulfillment.orders().get_order(&order.id).await.unwrap();
		assert_eq!(read_back.order_number, order.order_number);
	}
}
