//! Status and mode enums for orders and payments.
//!
//! Wire strings must match the commerce backend exactly, including the
//! lowercase words in "Out for delivery".

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders move forward through `Pending` → `Dispatched` →
/// `Out for delivery` → `Delivered`. `Cancelled` is reachable from any
/// state except `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Dispatched,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order (for filter dropdowns).
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Dispatched,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The exact wire string used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Dispatched => "Dispatched",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position in the forward lifecycle. `Cancelled` has no position.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Dispatched => Some(1),
            Self::OutForDelivery => Some(2),
            Self::Delivered => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Whether an order in this status may be moved to `next`.
    ///
    /// Forward moves only; cancellation is allowed any time before
    /// delivery. Delivered and cancelled orders are frozen.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return false;
        }
        match (self.rank(), next.rank()) {
            (Some(_), None) => self != Self::Delivered,
            (Some(from), Some(to)) => to > from,
            (None, _) => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Dispatched" => Ok(Self::Dispatched),
            "Out for delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash on delivery. No gateway involvement.
    #[serde(rename = "COD")]
    Cod,
    /// Prepaid through the hosted payment gateway.
    Online,
}

impl PaymentMode {
    /// The exact wire string used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Online => "Online",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "Online" => Ok(Self::Online),
            _ => Err(format!("invalid payment mode: {s}")),
        }
    }
}

/// Outcome of a gateway payment attempt, recorded on the order.
///
/// Cash-on-delivery orders carry no payment status at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Success,
    Failed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_out_for_delivery_wire_string() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for delivery\"");

        let back: OrderStatus = serde_json::from_str("\"Out for delivery\"").unwrap();
        assert_eq!(back, OrderStatus::OutForDelivery);
    }

    #[test]
    fn test_payment_mode_wire_strings() {
        assert_eq!(serde_json::to_string(&PaymentMode::Cod).unwrap(), "\"COD\"");
        assert_eq!(
            serde_json::to_string(&PaymentMode::Online).unwrap(),
            "\"Online\""
        );
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Dispatched));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Dispatched.can_transition_to(OrderStatus::OutForDelivery));
        assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Dispatched));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancellation_window() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_from_str_round_trip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
    }
}
