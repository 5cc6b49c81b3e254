//! Payment reconciliation
//!
//! Owns the legal moves of `payment_status` / `payment_method` / `paid_at`.
//!
//! 支付流转：`unpaid → pending → paid`；`cancelled` 是重置门，清空支付方式后
//! 顾客可以重新选择。现金路径选择即进入 `pending`（由店员当面核销）；UPI 路径
//! 需要顾客再点一次 "I have paid" 才进入 `pending`。
//!
//! Field-coupling rules enforced here:
//! - `method == None` whenever status is `cancelled` (the reset gate must
//!   re-enable selection)
//! - `cash` never coexists with `unpaid` (cash selection jumps straight to
//!   `pending`; only UPI waits in `unpaid` for the customer confirmation)
//! - `paid_at` is set iff status is `paid`

use shared::models::{PaymentMethod, PaymentStatus};
use thiserror::Error;

/// Rejected payment operation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Method is locked once confirmed; switching requires an explicit
    /// cancel round trip
    #[error("payment method is locked while status is {status}; cancel the payment first")]
    MethodLocked { status: PaymentStatus },

    /// Customer confirmation only exists on the UPI path
    #[error("confirm is only valid after selecting UPI")]
    NotUpiFlow,

    /// The payment was already verified by staff
    #[error("payment is already verified")]
    AlreadyPaid,
}

/// The payment-relevant slice of an order record
///
/// Transitions are pure; persistence happens in the repository as a
/// targeted partial update of exactly these fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentState {
    pub status: PaymentStatus,
    pub method: Option<PaymentMethod>,
    pub paid_at: Option<i64>,
}

impl PaymentState {
    /// Initial state of a freshly placed order
    pub fn new() -> Self {
        Self {
            status: PaymentStatus::Unpaid,
            method: None,
            paid_at: None,
        }
    }

    /// Locked = the other method may not be selected without cancelling
    pub fn is_locked(&self) -> bool {
        matches!(self.status, PaymentStatus::Pending | PaymentStatus::Paid)
    }

    /// Customer picks a payment method
    ///
    /// Cash is staff-verified in person, so it jumps straight to `pending`;
    /// UPI stays `unpaid` until the customer confirms. Selecting from
    /// `cancelled` re-enters the flow.
    pub fn select_method(self, method: PaymentMethod) -> Result<Self, PaymentError> {
        if self.is_locked() {
            return Err(PaymentError::MethodLocked {
                status: self.status,
            });
        }
        let status = match method {
            PaymentMethod::Cash => PaymentStatus::Pending,
            PaymentMethod::Upi => PaymentStatus::Unpaid,
        };
        Ok(Self {
            status,
            method: Some(method),
            paid_at: None,
        })
    }

    /// Customer-side "I have paid" (UPI path only)
    ///
    /// Signals "awaiting kitchen verification", never a definitive paid.
    pub fn confirm_paid(self) -> Result<Self, PaymentError> {
        if self.status == PaymentStatus::Paid {
            return Err(PaymentError::AlreadyPaid);
        }
        if self.method != Some(PaymentMethod::Upi) {
            return Err(PaymentError::NotUpiFlow);
        }
        Ok(Self {
            status: PaymentStatus::Pending,
            paid_at: None,
            ..self
        })
    }

    /// Staff verification — unconditional override
    ///
    /// Idempotent: a second call succeeds and refreshes `paid_at`.
    pub fn mark_paid(self, now: i64) -> Self {
        Self {
            status: PaymentStatus::Paid,
            paid_at: Some(now),
            ..self
        }
    }

    /// Staff cancellation — the reset gate
    ///
    /// The only transition that clears the method, re-enabling selection.
    /// `paid` is terminal and cannot be cancelled; pull it back with
    /// [`mark_pending`](Self::mark_pending) first.
    pub fn cancel(self) -> Result<Self, PaymentError> {
        if self.status == PaymentStatus::Paid {
            return Err(PaymentError::AlreadyPaid);
        }
        Ok(Self {
            status: PaymentStatus::Cancelled,
            method: None,
            paid_at: None,
        })
    }

    /// Force `pending` without constraint
    ///
    /// Shared by the cash auto-flow, the UPI confirmation, and staff
    /// pulling back a mistaken mark-paid.
    pub fn mark_pending(self) -> Self {
        Self {
            status: PaymentStatus::Pending,
            paid_at: None,
            ..self
        }
    }

    /// Field-coupling rules; every transition above must preserve them
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.status == PaymentStatus::Cancelled && self.method.is_some() {
            return Err("method must be null while status is cancelled".into());
        }
        if self.status == PaymentStatus::Unpaid && self.method == Some(PaymentMethod::Cash) {
            return Err("cash selection cannot remain unpaid".into());
        }
        if (self.status == PaymentStatus::Paid) != self.paid_at.is_some() {
            return Err("paid_at must be set iff status is paid".into());
        }
        Ok(())
    }
}

impl Default for PaymentState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::PaymentMethod::*;
    use shared::models::PaymentStatus::*;

    fn assert_invariants(state: &PaymentState) {
        state.check_invariants().expect("payment invariants");
    }

    #[test]
    fn cash_selection_goes_straight_to_pending() {
        let state = PaymentState::new().select_method(Cash).unwrap();
        assert_eq!(state.status, Pending);
        assert_eq!(state.method, Some(Cash));
        assert_invariants(&state);
    }

    #[test]
    fn upi_selection_stays_unpaid_until_confirmed() {
        let state = PaymentState::new().select_method(Upi).unwrap();
        assert_eq!(state.status, Unpaid);
        assert_eq!(state.method, Some(Upi));

        let state = state.confirm_paid().unwrap();
        assert_eq!(state.status, Pending);
        assert_invariants(&state);
    }

    #[test]
    fn confirm_without_upi_is_rejected() {
        assert_eq!(
            PaymentState::new().confirm_paid(),
            Err(PaymentError::NotUpiFlow)
        );
        let cash = PaymentState::new().select_method(Cash).unwrap();
        assert_eq!(cash.confirm_paid(), Err(PaymentError::NotUpiFlow));
    }

    #[test]
    fn method_is_locked_once_pending() {
        let state = PaymentState::new().select_method(Cash).unwrap();
        assert!(state.is_locked());
        assert_eq!(
            state.select_method(Upi),
            Err(PaymentError::MethodLocked { status: Pending })
        );
    }

    #[test]
    fn mark_paid_is_an_idempotent_override() {
        let state = PaymentState::new().mark_paid(100);
        assert_eq!(state.status, Paid);
        assert_eq!(state.paid_at, Some(100));
        assert_invariants(&state);

        // Second call succeeds and refreshes the timestamp
        let state = state.mark_paid(200);
        assert_eq!(state.status, Paid);
        assert_eq!(state.paid_at, Some(200));
        assert_invariants(&state);
    }

    #[test]
    fn cancel_clears_method_and_reopens_selection() {
        let state = PaymentState::new().select_method(Cash).unwrap();
        let state = state.cancel().unwrap();
        assert_eq!(state.status, Cancelled);
        assert_eq!(state.method, None);
        assert_invariants(&state);

        // Reset gate: selection restarts the flow
        let state = state.select_method(Upi).unwrap();
        assert_eq!(state.status, Unpaid);
        assert_eq!(state.method, Some(Upi));
        assert_invariants(&state);
    }

    #[test]
    fn cancel_on_paid_is_rejected() {
        let state = PaymentState::new().mark_paid(1);
        assert_eq!(state.cancel(), Err(PaymentError::AlreadyPaid));
    }

    #[test]
    fn mark_pending_pulls_back_a_paid_order() {
        let state = PaymentState::new().select_method(Cash).unwrap().mark_paid(1);
        let state = state.mark_pending();
        assert_eq!(state.status, Pending);
        assert_eq!(state.paid_at, None);
        assert_invariants(&state);

        // Now the cancel round trip is available again
        let state = state.cancel().unwrap();
        assert_eq!(state.method, None);
        assert_invariants(&state);
    }

    #[test]
    fn every_sequence_preserves_invariants() {
        // Walk a gauntlet of operations and check after each step
        let mut state = PaymentState::new();
        assert_invariants(&state);
        state = state.select_method(Upi).unwrap();
        assert_invariants(&state);
        state = state.confirm_paid().unwrap();
        assert_invariants(&state);
        state = state.cancel().unwrap();
        assert_invariants(&state);
        state = state.select_method(Cash).unwrap();
        assert_invariants(&state);
        state = state.mark_paid(42);
        assert_invariants(&state);
    }
}
