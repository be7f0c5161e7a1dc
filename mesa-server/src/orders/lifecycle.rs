//! Order lifecycle rules
//!
//! Pure helpers: transition checks under a [`TransitionPolicy`], timestamp
//! clamping and the customer-facing preparation estimate.

use crate::core::TransitionPolicy;
use shared::error::{AppError, AppResult};
use shared::models::{OrderItemStatus, OrderStatus};

/// A status enum with a transition table
pub trait LifecycleStatus: Copy + Eq {
    fn can_transition_to(&self, next: Self) -> bool;
    fn name(&self) -> &'static str;
}

impl LifecycleStatus for OrderStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        OrderStatus::can_transition_to(self, next)
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

impl LifecycleStatus for OrderItemStatus {
    fn can_transition_to(&self, next: Self) -> bool {
        OrderItemStatus::can_transition_to(self, next)
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }
}

/// Decide whether `from → to` may be applied
///
/// Returns whether the edge is part of the state machine. Under
/// `Permissive` an illegal edge is still accepted (and logged).
pub fn check_transition<S: LifecycleStatus>(
    policy: TransitionPolicy,
    from: S,
    to: S,
) -> AppResult<bool> {
    if from.can_transition_to(to) {
        return Ok(true);
    }
    match policy {
        TransitionPolicy::Strict => Err(AppError::invalid_transition(from.name(), to.name())),
        TransitionPolicy::Permissive => {
            tracing::warn!(
                from = from.name(),
                to = to.name(),
                "Status change outside the lifecycle accepted"
            );
            Ok(false)
        }
    }
}

/// `updated_at` never precedes `created_at`, even with a skewed clock
pub fn clamp_updated_at(now: i64, created_at: i64) -> i64 {
    now.max(created_at)
}

/// Human estimate shown to the customer for an order in `status`
pub fn estimated_time(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "15-20 minutes",
        OrderStatus::Confirmed => "10-15 minutes",
        OrderStatus::InProgress => "5-10 minutes",
        OrderStatus::Ready => "Ready for pickup",
        OrderStatus::Delivered => "Already delivered",
        OrderStatus::Cancelled => "Order cancelled",
    }
}
