//! # Authorization Policy
//!
//! One place that decides what an authenticated actor may do. The server
//! builds an [`Actor`] from the bearer token and consults these functions
//! before calling an engine.
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────────────┐
//! │ Role         │ Orders                         │ Inventory / tables    │
//! ├──────────────┼────────────────────────────────┼───────────────────────┤
//! │ waiter       │ own orders only                │ read, table status    │
//! │              │ status → preparing | ready     │                       │
//! │              │ payment on own orders          │                       │
//! │ cashier      │ any order, any reachable state │ read, table status    │
//! │ bartender    │ any order, any reachable state │ read, table status    │
//! │ admin        │ any order, any reachable state │ full                  │
//! └──────────────┴────────────────────────────────┴───────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::requests::OrderFilter;
use crate::types::{OrderStatus, Role};
use crate::validation::normalize_optional;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    /// Staff id.
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            role,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[inline]
    pub fn is_waiter(&self) -> bool {
        self.role == Role::Waiter
    }
}

/// What an actor wants to do to an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    View,
    ChangeStatus(OrderStatus),
    ChangePayment,
}

/// Owner of a new order. Waiters always own what they create; everybody
/// else may place an order on behalf of any waiter, defaulting to themselves.
pub fn resolve_order_owner(actor: &Actor, requested: Option<&str>) -> String {
    if actor.is_waiter() {
        return actor.id.clone();
    }
    normalize_optional(requested).unwrap_or_else(|| actor.id.clone())
}

/// Gate for every read or transition on an existing order.
pub fn authorize_order_action(actor: &Actor, owner_id: &str, action: OrderAction) -> CoreResult<()> {
    if !actor.is_waiter() {
        return Ok(());
    }

    if owner_id != actor.id {
        return Err(CoreError::permission_denied(
            "waiters can only access their own orders",
        ));
    }

    match action {
        OrderAction::ChangeStatus(OrderStatus::Preparing | OrderStatus::Ready) => Ok(()),
        OrderAction::ChangeStatus(_) => Err(CoreError::permission_denied(
            "waiters can only move orders to preparing or ready",
        )),
        OrderAction::View | OrderAction::ChangePayment => Ok(()),
    }
}

/// Narrows an order listing to what the actor may see.
pub fn scope_order_filter(actor: &Actor, mut filter: OrderFilter) -> OrderFilter {
    if actor.is_waiter() {
        filter.waiter_id = Some(actor.id.clone());
    }
    filter
}

/// Transfers, catalog edits, location and table administration.
pub fn require_admin(actor: &Actor, action: &str) -> CoreResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::permission_denied(format!(
            "only admins can {action}"
        )))
    }
}
