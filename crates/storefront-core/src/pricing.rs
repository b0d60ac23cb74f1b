//! Order total computation.
//!
//! Totals are computed server-side from the cart and the store's pricing
//! configuration; client-supplied amounts are never trusted. Tax is kept
//! at full precision, only the grand total is rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};
use storefront_config::PricingConfig;
use storefront_types::OrderTotals;

/// Computes the totals for an order with the given subtotal.
///
/// Delivery is free strictly above the configured threshold. Tax applies
/// to the subtotal only, not the delivery fee.
pub fn compute_totals(subtotal: Decimal, pricing: &PricingConfig) -> OrderTotals {
	let delivery_fee = if subtotal > pricing.free_delivery_threshold {
		Decimal::ZERO
	} else {
		pricing.delivery_fee
	};
	let tax = subtotal * pricing.tax_rate;
	let total = (subtotal + delivery_fee + tax)
		.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

	OrderTotals {
		subtotal,
		delivery_fee,
		tax,
		total,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pricing() -> PricingConfig {
		PricingConfig::default()
	}

	#[test]
	fn small_order_pays_delivery() {
		let totals = compute_totals(Decimal::new(1000, 2), &pricing());
		assert_eq!(totals.delivery_fee, Decimal::new(299, 2));
		assert_eq!(totals.tax, Decimal::new(8000, 4));
		assert_eq!(totals.total, Decimal::new(1379, 2));
	}

	#[test]
	fn large_order_ships_free() {
		let totals = compute_totals(Decimal::new(2897, 2), &pricing());
		assert_eq!(totals.delivery_fee, Decimal::ZERO);
		assert_eq!(totals.tax, Decimal::new(23176, 4));
		assert_eq!(totals.total, Decimal::new(3129, 2));
	}

	#[test]
	fn threshold_is_strictly_above() {
		let at_threshold = compute_totals(Decimal::new(2500, 2), &pricing());
		assert_eq!(at_threshold.delivery_fee, Decimal::new(299, 2));

		let above = compute_totals(Decimal::new(2501, 2), &pricing());
		assert_eq!(above.delivery_fee, Decimal::ZERO);
	}

	#[test]
	fn total_rounds_to_cents() {
		let totals = compute_totals(Decimal::new(1299, 2), &pricing());
		// 12.99 + 2.99 + 1.0392 = 17.0192
		assert_eq!(totals.total, Decimal::new(1702, 2));
		assert_eq!(totals.total_minor_units(), 1702);
	}

	#[test]
	fn custom_rates_apply() {
		let pricing = PricingConfig {
			delivery_fee: Decimal::new(500, 2),
			free_delivery_threshold: Decimal::new(5000, 2),
			tax_rate: Decimal::new(10, 2),
		};
		let totals = compute_totals(Decimal::new(2000, 2), &pricing);
		assert_eq!(totals.delivery_fee, Decimal::new(500, 2));
		assert_eq!(totals.total, Decimal::new(2700, 2));
	}
}
