//! Pricing types and the pricing collaborator boundary.
//!
//! Subtotal, fees and total are owned by the order record but computed by an
//! external calculator exactly once, at order creation. The core persists
//! and exposes the values; no transition ever recomputes them.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::OrderItem;

/// Monetary breakdown of an order, opaque to the fulfillment core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pricing {
	/// Sum of line totals.
	pub subtotal: Decimal,
	/// Delivery fee charged to the customer.
	pub delivery_fee: Decimal,
	/// Amount charged, `subtotal + delivery_fee`.
	pub total: Decimal,
}

impl Pricing {
	/// An all-zero pricing block, used as a placeholder in tests.
	pub fn zero() -> Self {
		Self {
			subtotal: Decimal::ZERO,
			delivery_fee: Decimal::ZERO,
			total: Decimal::ZERO,
		}
	}
}

/// Errors the pricing collaborator can report.
#[derive(Debug, Error)]
pub enum PricingError {
	/// The calculator could not produce a quote.
	#[error("pricing unavailable: {0}")]
	Unavailable(String),
}

/// External collaborator that prices an order at creation time.
#[async_trait]
pub trait PricingCalculator: Send + Sync {
	/// Produces the monetary breakdown for the given items.
	async fn quote(&self, items: &[OrderItem]) -> Result<Pricing, PricingError>;
}

/// Reference calculator that sums line totals and adds a flat delivery fee.
#[derive(Debug, Default)]
pub struct ItemSumPricing {
	/// Flat fee added to every order.
	pub delivery_fee: Decimal,
}

#[async_trait]
impl PricingCalculator for ItemSumPricing {
	async fn quote(&self, items: &[OrderItem]) -> Result<Pricing, PricingError> {
		let subtotal: Decimal = items.iter().map(|item| item.total_price).sum();
		Ok(Pricing {
			subtotal,
			delivery_fee: self.delivery_fee,
			total: subtotal + self.delivery_fee,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn item_sum_pricing_adds_flat_fee() {
		let calculator = ItemSumPricing {
			delivery_fee: Decimal::new(250, 2),
		};
		let items = vec![
			OrderItem {
				food_id: "f1".into(),
				name: "Hoppers".into(),
				description: "Plain hoppers".into(),
				quantity: 6,
				unit_price: Decimal::new(80, 2),
				total_price: Decimal::new(480, 2),
				special_instructions: None,
			},
			OrderItem {
				food_id: "f2".into(),
				name: "Sambol".into(),
				description: "Coconut sambol".into(),
				quantity: 1,
				unit_price: Decimal::new(120, 2),
				total_price: Decimal::new(120, 2),
				special_instructions: None,
			},
		];

		let pricing = calculator.quote(&items).await.unwrap();
		assert_eq!(pricing.subtotal, Decimal::new(600, 2));
		assert_eq!(pricing.total, Decimal::new(850, 2));
	}
}
