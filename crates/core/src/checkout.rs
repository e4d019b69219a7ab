//! Payment resolution state machine.
//!
//! Checkout decides *how* an order gets paid before the order exists.
//! The flow starts at [`PaymentFlow::AwaitingPaymentChoice`] and ends at
//! either [`PaymentFlow::OrderReady`] (the storefront may now create the
//! order) or [`PaymentFlow::PaymentFailed`] (the attempt is dead, the
//! customer starts over from the payment choice).
//!
//! Two rules are load-bearing:
//! - Cash on delivery resolves immediately and never touches the gateway.
//! - An online payment only reaches [`PaymentFlow::OrderReady`] when the
//!   widget's confirmation carries the gateway order id we registered.
//!
//! Transitions consume the current state and return the next one, so an
//! impossible move is unrepresentable at runtime rather than a silent
//! no-op. The enum is serde-serializable because the storefront parks the
//! in-flight state in the session while the hosted widget is open.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{CartTotals, PricingPolicy};
use crate::types::{PaymentMode, PaymentStatus, Rupees};

/// Errors raised by checkout guards and refused transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart has no items. Checkout is closed to empty carts no matter
    /// what the threshold says.
    #[error("cart is empty")]
    EmptyCart,

    /// The payable total is under the store's minimum-order threshold.
    #[error("order total {total} is below the minimum of {minimum}")]
    BelowMinimumOrder {
        /// Payable total of the cart.
        total: Rupees,
        /// Configured minimum-order threshold.
        minimum: Rupees,
    },

    /// A transition was requested from a state that does not allow it.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        /// Name of the state the flow was in.
        state: &'static str,
        /// Name of the refused action.
        action: &'static str,
    },

    /// The widget confirmed a different gateway order than the one this
    /// flow registered.
    #[error("gateway confirmation is for a different order")]
    ConfirmationMismatch,
}

/// Identifiers posted back by the hosted payment widget after the
/// customer completes payment. Field names match the widget callback
/// payload; signature verification happens on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

/// The resolved payment carried into order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPayment {
    /// Chosen payment mode.
    pub mode: PaymentMode,
    /// Gateway outcome. `None` for cash on delivery.
    pub status: Option<PaymentStatus>,
    /// Gateway identifiers. `None` for cash on delivery.
    pub confirmation: Option<GatewayConfirmation>,
}

impl ResolvedPayment {
    /// Resolution for a cash-on-delivery order.
    #[must_use]
    pub const fn cash() -> Self {
        Self {
            mode: PaymentMode::Cod,
            status: None,
            confirmation: None,
        }
    }

    /// Resolution for a successful online payment.
    #[must_use]
    pub const fn online(confirmation: GatewayConfirmation) -> Self {
        Self {
            mode: PaymentMode::Online,
            status: Some(PaymentStatus::Success),
            confirmation: Some(confirmation),
        }
    }
}

/// One checkout attempt's progress towards a payable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFlow {
    /// Customer has not picked a payment mode yet.
    AwaitingPaymentChoice,
    /// Online payment chosen; a gateway order is being registered.
    AwaitingGatewayOrder,
    /// Gateway order registered; the hosted widget is in front of the
    /// customer. The flow remembers which gateway order it expects.
    AwaitingGatewayConfirmation {
        gateway_order_id: String,
    },
    /// Payment is settled (or deferred to delivery). The order may be
    /// created exactly once from this state.
    OrderReady(ResolvedPayment),
    /// The attempt failed or was abandoned. Terminal.
    PaymentFailed {
        reason: String,
    },
}

impl PaymentFlow {
    /// A fresh attempt, waiting for the customer to pick a payment mode.
    #[must_use]
    pub const fn new() -> Self {
        Self::AwaitingPaymentChoice
    }

    /// Short state name for errors and logs.
    #[must_use]
    pub const fn state_name(&self) -> &'static str {
        match self {
            Self::AwaitingPaymentChoice => "awaiting payment choice",
            Self::AwaitingGatewayOrder => "awaiting gateway order",
            Self::AwaitingGatewayConfirmation { .. } => "awaiting gateway confirmation",
            Self::OrderReady(_) => "order ready",
            Self::PaymentFailed { .. } => "payment failed",
        }
    }

    /// Whether the attempt has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::OrderReady(_) | Self::PaymentFailed { .. })
    }

    /// Resolve the attempt as cash on delivery.
    ///
    /// Goes straight to [`Self::OrderReady`]; the gateway is never
    /// contacted for cash orders.
    ///
    /// # Errors
    ///
    /// Returns an eligibility error if the cart is empty or under the
    /// minimum, or `InvalidTransition` outside `AwaitingPaymentChoice`.
    pub fn choose_cash(
        self,
        totals: &CartTotals,
        policy: &PricingPolicy,
    ) -> Result<Self, CheckoutError> {
        match self {
            Self::AwaitingPaymentChoice => {
                ensure_eligible(totals, policy)?;
                Ok(Self::OrderReady(ResolvedPayment::cash()))
            }
            other => Err(CheckoutError::InvalidTransition {
                state: other.state_name(),
                action: "choose cash on delivery",
            }),
        }
    }

    /// Start an online payment.
    ///
    /// # Errors
    ///
    /// Returns an eligibility error if the cart is empty or under the
    /// minimum, or `InvalidTransition` outside `AwaitingPaymentChoice`.
    /// The guard runs *before* any gateway call is made.
    pub fn choose_online(
        self,
        totals: &CartTotals,
        policy: &PricingPolicy,
    ) -> Result<Self, CheckoutError> {
        match self {
            Self::AwaitingPaymentChoice => {
                ensure_eligible(totals, policy)?;
                Ok(Self::AwaitingGatewayOrder)
            }
            other => Err(CheckoutError::InvalidTransition {
                state: other.state_name(),
                action: "choose online payment",
            }),
        }
    }

    /// Record the gateway order the backend registered for this attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `AwaitingGatewayOrder`.
    pub fn gateway_order_registered(
        self,
        gateway_order_id: impl Into<String>,
    ) -> Result<Self, CheckoutError> {
        match self {
            Self::AwaitingGatewayOrder => Ok(Self::AwaitingGatewayConfirmation {
                gateway_order_id: gateway_order_id.into(),
            }),
            other => Err(CheckoutError::InvalidTransition {
                state: other.state_name(),
                action: "register gateway order",
            }),
        }
    }

    /// Accept the widget's confirmation and resolve the payment.
    ///
    /// # Errors
    ///
    /// Returns `ConfirmationMismatch` if the confirmation names a
    /// different gateway order than the one registered, and
    /// `InvalidTransition` outside `AwaitingGatewayConfirmation`.
    pub fn confirm(self, confirmation: GatewayConfirmation) -> Result<Self, CheckoutError> {
        match self {
            Self::AwaitingGatewayConfirmation { gateway_order_id } => {
                if confirmation.razorpay_order_id == gateway_order_id {
                    Ok(Self::OrderReady(ResolvedPayment::online(confirmation)))
                } else {
                    Err(CheckoutError::ConfirmationMismatch)
                }
            }
            other => Err(CheckoutError::InvalidTransition {
                state: other.state_name(),
                action: "confirm payment",
            }),
        }
    }

    /// Mark the attempt failed (gateway error, widget dismissed, or a
    /// mismatched confirmation).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from terminal states; a settled
    /// attempt cannot retroactively fail.
    pub fn fail(self, reason: impl Into<String>) -> Result<Self, CheckoutError> {
        if self.is_terminal() {
            return Err(CheckoutError::InvalidTransition {
                state: self.state_name(),
                action: "fail payment",
            });
        }
        Ok(Self::PaymentFailed {
            reason: reason.into(),
        })
    }
}

impl Default for PaymentFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared guard for both transitions out of the payment choice.
fn ensure_eligible(totals: &CartTotals, policy: &PricingPolicy) -> Result<(), CheckoutError> {
    if totals.item_count == 0 {
        return Err(CheckoutError::EmptyCart);
    }
    if totals.total < policy.minimum_order {
        return Err(CheckoutError::BelowMinimumOrder {
            total: totals.total,
            minimum: policy.minimum_order,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pricing::CartLine;
    use rust_decimal::Decimal;

    fn policy(minimum: i64) -> PricingPolicy {
        PricingPolicy {
            shipping: Rupees::new(20),
            taxes: Rupees::new(10),
            minimum_order: Rupees::new(minimum),
        }
    }

    fn totals_for(price: i64, quantity: u32, minimum: i64) -> CartTotals {
        CartTotals::compute(&[CartLine::new(Decimal::from(price), quantity)], &policy(minimum))
    }

    fn confirmation(order_id: &str) -> GatewayConfirmation {
        GatewayConfirmation {
            razorpay_payment_id: "pay_Nx42".to_string(),
            razorpay_order_id: order_id.to_string(),
            razorpay_signature: "c9a1".to_string(),
        }
    }

    #[test]
    fn test_cash_resolves_without_gateway() {
        let totals = totals_for(100, 2, 200);
        let flow = PaymentFlow::new().choose_cash(&totals, &policy(200)).unwrap();

        let PaymentFlow::OrderReady(payment) = flow else {
            panic!("expected OrderReady");
        };
        assert_eq!(payment.mode, PaymentMode::Cod);
        assert!(payment.status.is_none());
        assert!(payment.confirmation.is_none());
    }

    #[test]
    fn test_below_minimum_blocks_both_modes() {
        // Total 230 against a 499 threshold.
        let totals = totals_for(100, 2, 499);

        let cash = PaymentFlow::new().choose_cash(&totals, &policy(499));
        assert_eq!(
            cash.unwrap_err(),
            CheckoutError::BelowMinimumOrder {
                total: Rupees::new(230),
                minimum: Rupees::new(499),
            }
        );

        let online = PaymentFlow::new().choose_online(&totals, &policy(499));
        assert!(matches!(
            online.unwrap_err(),
            CheckoutError::BelowMinimumOrder { .. }
        ));
    }

    #[test]
    fn test_empty_cart_is_its_own_error() {
        let totals = CartTotals::compute(&[], &policy(0));
        let err = PaymentFlow::new()
            .choose_cash(&totals, &policy(0))
            .unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn test_online_happy_path() {
        let totals = totals_for(300, 2, 499);

        let flow = PaymentFlow::new()
            .choose_online(&totals, &policy(499))
            .unwrap()
            .gateway_order_registered("order_9A33XWu170gUtm")
            .unwrap()
            .confirm(confirmation("order_9A33XWu170gUtm"))
            .unwrap();

        let PaymentFlow::OrderReady(payment) = flow else {
            panic!("expected OrderReady");
        };
        assert_eq!(payment.mode, PaymentMode::Online);
        assert_eq!(payment.status, Some(PaymentStatus::Success));
        assert_eq!(
            payment.confirmation.unwrap().razorpay_order_id,
            "order_9A33XWu170gUtm"
        );
    }

    #[test]
    fn test_confirmation_for_wrong_order_is_rejected() {
        let totals = totals_for(300, 2, 499);

        let flow = PaymentFlow::new()
            .choose_online(&totals, &policy(499))
            .unwrap()
            .gateway_order_registered("order_expected")
            .unwrap();

        let err = flow.confirm(confirmation("order_spoofed")).unwrap_err();
        assert_eq!(err, CheckoutError::ConfirmationMismatch);
    }

    #[test]
    fn test_widget_dismissal_fails_the_attempt() {
        let totals = totals_for(300, 2, 499);

        let flow = PaymentFlow::new()
            .choose_online(&totals, &policy(499))
            .unwrap()
            .gateway_order_registered("order_abc")
            .unwrap()
            .fail("payment widget dismissed")
            .unwrap();

        assert!(matches!(flow, PaymentFlow::PaymentFailed { .. }));
        assert!(flow.is_terminal());
    }

    #[test]
    fn test_terminal_states_refuse_transitions() {
        let totals = totals_for(300, 2, 499);
        let ready = PaymentFlow::new().choose_cash(&totals, &policy(499)).unwrap();

        let err = ready.clone().fail("too late").unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { .. }));

        let err = ready.choose_online(&totals, &policy(499)).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { .. }));
    }

    #[test]
    fn test_confirm_requires_registered_gateway_order() {
        let err = PaymentFlow::new()
            .confirm(confirmation("order_abc"))
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                action: "confirm payment",
                ..
            }
        ));
    }

    #[test]
    fn test_flow_survives_session_round_trip() {
        let flow = PaymentFlow::AwaitingGatewayConfirmation {
            gateway_order_id: "order_live".to_string(),
        };
        let json = serde_json::to_string(&flow).unwrap();
        let back: PaymentFlow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flow);
    }
}
