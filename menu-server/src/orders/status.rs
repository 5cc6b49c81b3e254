//! Order status state machine
//!
//! 订单状态只向前流转：`pending → preparing → ready → served`。
//! Re-setting the current status is accepted (idempotent re-delivery from
//! the dashboard); moving backward is rejected.

use shared::models::OrderStatus;
use thiserror::Error;

/// Rejected status transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot move order backward from {from} to {to}")]
    Backward { from: OrderStatus, to: OrderStatus },
}

/// Validate a status transition under the forward-only rule
///
/// Skipping states forward (e.g. `pending → ready`) is allowed; the
/// kitchen sometimes batches updates.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
    if to.rank() < from.rank() {
        return Err(TransitionError::Backward { from, to });
    }
    Ok(())
}

/// Whether an order in `status` may still be declined (hard-deleted)
///
/// Decline is destructive and only exposed while the kitchen has not
/// started working on the order.
pub fn can_decline(status: OrderStatus) -> bool {
    status == OrderStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus::*;

    #[test]
    fn forward_steps_are_allowed() {
        assert!(validate_transition(Pending, Preparing).is_ok());
        assert!(validate_transition(Preparing, Ready).is_ok());
        assert!(validate_transition(Ready, Served).is_ok());
    }

    #[test]
    fn forward_skips_are_allowed() {
        assert!(validate_transition(Pending, Ready).is_ok());
        assert!(validate_transition(Pending, Served).is_ok());
        assert!(validate_transition(Preparing, Served).is_ok());
    }

    #[test]
    fn same_state_is_idempotent() {
        for status in [Pending, Preparing, Ready, Served] {
            assert!(validate_transition(status, status).is_ok());
        }
    }

    #[test]
    fn backward_is_rejected() {
        assert_eq!(
            validate_transition(Ready, Preparing),
            Err(TransitionError::Backward {
                from: Ready,
                to: Preparing
            })
        );
        assert!(validate_transition(Served, Pending).is_err());
        assert!(validate_transition(Preparing, Pending).is_err());
    }

    #[test]
    fn decline_only_while_pending() {
        assert!(can_decline(Pending));
        assert!(!can_decline(Preparing));
        assert!(!can_decline(Ready));
        assert!(!can_decline(Served));
    }
}
