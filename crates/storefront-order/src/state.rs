//! Order status transition rules.
//!
//! The fulfillment timeline only moves forward: confirmed, preparing,
//! ready, picked up, on the way, delivered. Stages may be skipped but
//! never revisited, and an order can only be cancelled before the food
//! leaves the restaurant.

use crate::OrderError;
use storefront_types::OrderStatus;

/// Validates order status transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
	/// Checks whether a transition between two statuses is allowed.
	pub fn can_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
		if from == to || from.is_terminal() {
			return false;
		}

		match to {
			OrderStatus::Cancelled => {
				// Cancellation window closes once the driver has the food.
				matches!(
					from,
					OrderStatus::Pending
						| OrderStatus::Confirmed
						| OrderStatus::Preparing
						| OrderStatus::Ready
				)
			},
			_ => match (from.timeline_position(), to.timeline_position()) {
				(Some(from_pos), Some(to_pos)) => to_pos > from_pos,
				_ => false,
			},
		}
	}

	/// Validates a transition, returning an error describing the
	/// rejected move.
	pub fn validate_transition(from: &OrderStatus, to: &OrderStatus) -> Result<(), OrderError> {
		if Self::can_transition(from, to) {
			Ok(())
		} else {
			Err(OrderError::InvalidTransition {
				from: *from,
				to: *to,
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forward_moves_are_allowed() {
		assert!(OrderStateMachine::can_transition(
			&OrderStatus::Confirmed,
			&OrderStatus::Preparing
		));
		assert!(OrderStateMachine::can_transition(
			&OrderStatus::OnTheWay,
			&OrderStatus::Delivered
		));
	}

	#[test]
	fn stages_may_be_skipped() {
		assert!(OrderStateMachine::can_transition(
			&OrderStatus::Confirmed,
			&OrderStatus::OnTheWay
		));
	}

	#[test]
	fn backward_moves_are_rejected() {
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::Ready,
			&OrderStatus::Preparing
		));
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::Delivered,
			&OrderStatus::OnTheWay
		));
	}

	#[test]
	fn self_transition_is_rejected() {
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::Preparing,
			&OrderStatus::Preparing
		));
	}

	#[test]
	fn cancellation_window_closes_at_pickup() {
		assert!(OrderStateMachine::can_transition(
			&OrderStatus::Preparing,
			&OrderStatus::Cancelled
		));
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::PickedUp,
			&OrderStatus::Cancelled
		));
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::OnTheWay,
			&OrderStatus::Cancelled
		));
	}

	#[test]
	fn terminal_states_admit_no_moves() {
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::Cancelled,
			&OrderStatus::Confirmed
		));
		assert!(!OrderStateMachine::can_transition(
			&OrderStatus::Delivered,
			&OrderStatus::Cancelled
		));
	}
}
