//! Order / payment wire enums and the derived payment view
//!
//! 订单状态与支付状态在前后端之间以小写字符串传输。

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Order status
// =============================================================================

/// Kitchen-facing order status
///
/// Monotonic in normal operation: `pending → preparing → ready → served`.
/// `served` is terminal and stamps `completed_at`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

impl OrderStatus {
    /// Position in the forward-only sequence
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Preparing => 1,
            Self::Ready => 2,
            Self::Served => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Served)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Preparing => write!(f, "preparing"),
            Self::Ready => write!(f, "ready"),
            Self::Served => write!(f, "served"),
        }
    }
}

// =============================================================================
// Payment status / method
// =============================================================================

/// Payment status
///
/// `unpaid → pending → paid`; any non-terminal state can move to
/// `cancelled`, which acts as a reset gate back into method selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Cancelled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment method chosen by the customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upi => write!(f, "upi"),
            Self::Cash => write!(f, "cash"),
        }
    }
}

// =============================================================================
// Derived payment view (customer bill page)
// =============================================================================

/// Which step of the payment flow the bill page should render
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStage {
    /// No usable method yet (unpaid without method, or cancelled)
    SelectMethod,
    /// UPI chosen, waiting for the customer's "I have paid"
    AwaitingConfirmation,
    /// Pending staff verification (cash handed over, or UPI confirmed)
    AwaitingVerification,
    /// Staff confirmed the payment
    Settled,
}

/// Customer-facing payment UI state, derived from the order record
///
/// Both the server (`GET /api/orders/{id}/payment`) and the bill page
/// derive this from the same fields, so the rules live here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentView {
    pub stage: PaymentStage,
    pub status: PaymentStatus,
    pub method: Option<PaymentMethod>,
    /// Locked once the method is confirmed (`pending` or `paid`)
    pub locked: bool,
    /// Switching methods while locked requires an explicit cancel round trip
    pub requires_cancel_to_switch: bool,
    pub paid_at: Option<i64>,
}

impl PaymentView {
    pub fn derive(
        status: PaymentStatus,
        method: Option<PaymentMethod>,
        paid_at: Option<i64>,
    ) -> Self {
        let stage = match (status, method) {
            (PaymentStatus::Paid, _) => PaymentStage::Settled,
            (PaymentStatus::Pending, _) => PaymentStage::AwaitingVerification,
            (PaymentStatus::Unpaid, Some(PaymentMethod::Upi)) => {
                PaymentStage::AwaitingConfirmation
            }
            // unpaid without method, cancelled, or unpaid/cash (cash jumps
            // straight to pending, so this last pairing only appears
            // transiently between writes)
            _ => PaymentStage::SelectMethod,
        };
        let locked = matches!(status, PaymentStatus::Pending | PaymentStatus::Paid);
        Self {
            stage,
            status,
            method,
            locked,
            requires_cancel_to_switch: locked,
            paid_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_order_asks_for_method() {
        let view = PaymentView::derive(PaymentStatus::Unpaid, None, None);
        assert_eq!(view.stage, PaymentStage::SelectMethod);
        assert!(!view.locked);
    }

    #[test]
    fn upi_selected_awaits_customer_confirmation() {
        let view = PaymentView::derive(PaymentStatus::Unpaid, Some(PaymentMethod::Upi), None);
        assert_eq!(view.stage, PaymentStage::AwaitingConfirmation);
        assert!(!view.locked);
    }

    #[test]
    fn pending_is_locked_regardless_of_method() {
        for method in [Some(PaymentMethod::Upi), Some(PaymentMethod::Cash)] {
            let view = PaymentView::derive(PaymentStatus::Pending, method, None);
            assert_eq!(view.stage, PaymentStage::AwaitingVerification);
            assert!(view.locked);
            assert!(view.requires_cancel_to_switch);
        }
    }

    #[test]
    fn cancelled_resets_to_method_selection() {
        let view = PaymentView::derive(PaymentStatus::Cancelled, None, None);
        assert_eq!(view.stage, PaymentStage::SelectMethod);
        assert!(!view.locked);
    }

    #[test]
    fn paid_is_settled() {
        let view = PaymentView::derive(PaymentStatus::Paid, Some(PaymentMethod::Cash), Some(1));
        assert_eq!(view.stage, PaymentStage::Settled);
        assert!(view.locked);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Upi).unwrap(),
            "\"upi\""
        );
    }
}
