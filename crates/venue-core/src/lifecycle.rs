//! # Lifecycle Rules
//!
//! The three state machines of the system plus the pure parts of order
//! creation (type inference, pricing, numbering). The storage layer calls
//! these inside its transactions; nothing here touches a database.
//!
//! ## Order Status
//! ```text
//! pending ──► preparing ──► ready ──► completed
//!    │            │           │
//!    └────────────┴───────────┴──────► cancelled
//!
//! completed, cancelled: terminal
//! ```
//!
//! ## Payment Status
//! ```text
//! pending ──► paid ──► refunded
//!    │                    ▲
//!    └────────────────────┘
//!
//! refunded: terminal. A cancelled order cannot be paid.
//! ```
//!
//! ## Transfer Status
//! ```text
//! pending ──► completed      (stock moves here, exactly once)
//!    │
//!    └──────► cancelled      (no stock effect)
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::requests::PaymentUpdate;
use crate::types::{OrderStatus, OrderType, PaymentMethod, PaymentStatus, TransferStatus};
use crate::validation::normalize_optional;
use crate::ORDER_NUMBER_PREFIX;

// =============================================================================
// Order Status
// =============================================================================

impl OrderStatus {
    /// `completed` and `cancelled` accept no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `next` is one edge away from `self`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Preparing) | (Preparing, Ready) | (Ready, Completed) => true,
            (Pending | Preparing | Ready, Cancelled) => true,
            _ => false,
        }
    }
}

/// Rejects any status change that is not an edge of the order graph.
pub fn check_status_transition(
    order_ref: &str,
    from: OrderStatus,
    to: OrderStatus,
) -> CoreResult<()> {
    if from.is_terminal() {
        return Err(CoreError::invalid_state(format!(
            "order {order_ref} is {}, no further status changes allowed",
            from.as_str()
        )));
    }

    if !from.can_transition_to(to) {
        return Err(CoreError::invalid_state(format!(
            "order {order_ref} cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    Ok(())
}

// =============================================================================
// Payment Status
// =============================================================================

impl PaymentStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Refunded)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Paid, Refunded) | (Pending, Refunded)
        )
    }
}

/// Rejects payment changes outside the payment graph, and payment of a
/// cancelled order.
pub fn check_payment_transition(
    order_ref: &str,
    order_status: OrderStatus,
    from: PaymentStatus,
    to: PaymentStatus,
) -> CoreResult<()> {
    if to == PaymentStatus::Paid && order_status == OrderStatus::Cancelled {
        return Err(CoreError::invalid_state(format!(
            "order {order_ref} is cancelled and cannot be paid"
        )));
    }

    if !from.can_transition_to(to) {
        return Err(CoreError::invalid_state(format!(
            "order {order_ref} payment cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }

    Ok(())
}

/// Method and reference to record alongside a payment status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
}

/// Validates the method/reference pair of a payment update.
///
/// Marking paid needs a method, and M-Pesa needs a non-blank reference.
/// Other targets keep whatever method was supplied (usually none).
///
/// ## Example
/// ```rust
/// use venue_core::lifecycle::validate_payment_details;
/// use venue_core::{PaymentMethod, PaymentStatus, PaymentUpdate};
///
/// let update = PaymentUpdate {
///     payment_status: PaymentStatus::Paid,
///     payment_method: Some(PaymentMethod::Mpesa),
///     reference: Some("  ".into()),
/// };
/// assert!(validate_payment_details(&update).is_err());
/// ```
pub fn validate_payment_details(update: &PaymentUpdate) -> CoreResult<PaymentDetails> {
    let reference = normalize_optional(update.reference.as_deref());

    if update.payment_status == PaymentStatus::Paid {
        let Some(method) = update.payment_method else {
            return Err(CoreError::invalid_argument(
                "payment method is required when marking an order paid",
            ));
        };

        if method == PaymentMethod::Mpesa && reference.is_none() {
            return Err(CoreError::invalid_argument(
                "M-Pesa payments require a transaction reference",
            ));
        }
    }

    Ok(PaymentDetails {
        method: update.payment_method,
        reference,
    })
}

// =============================================================================
// Transfer Status
// =============================================================================

impl TransferStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

/// Only pending transfers complete or cancel.
pub fn check_transfer_transition(
    transfer_id: &str,
    from: TransferStatus,
    to: TransferStatus,
) -> CoreResult<()> {
    if from != TransferStatus::Pending || to == TransferStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "transfer {transfer_id} is {}, cannot move to {}",
            from.as_str(),
            to.as_str()
        )));
    }
    Ok(())
}

// =============================================================================
// Order Creation
// =============================================================================

/// Resolves the order type from the request.
///
/// Inferred as dine-in when a table is given, takeaway otherwise. An
/// explicit type must agree with the presence of a table.
pub fn resolve_order_type(
    requested: Option<OrderType>,
    table_id: Option<&str>,
) -> CoreResult<OrderType> {
    let has_table = table_id.is_some_and(|t| !t.trim().is_empty());

    match (requested, has_table) {
        (None, true) | (Some(OrderType::DineIn), true) => Ok(OrderType::DineIn),
        (None, false) | (Some(OrderType::Takeaway), false) => Ok(OrderType::Takeaway),
        (Some(OrderType::Takeaway), true) => Err(CoreError::invalid_argument(
            "takeaway orders must not reference a table",
        )),
        (Some(OrderType::DineIn), false) => Err(CoreError::invalid_argument(
            "dine-in orders require a table",
        )),
    }
}

/// Σ unit price × quantity over priced lines.
pub fn order_total<I>(lines: I) -> CoreResult<Money>
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines.into_iter().try_fold(Money::zero(), |acc, (price, qty)| {
        price
            .checked_multiply_quantity(qty)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| CoreError::invalid_argument("order total is out of range"))
    })
}

/// `ORD-<unix-millis>-<n>` with `n` in `0..1000`.
pub fn order_number(now: DateTime<Utc>, entropy: u128) -> String {
    format!(
        "{ORDER_NUMBER_PREFIX}-{}-{}",
        now.timestamp_millis(),
        entropy % 1000
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
