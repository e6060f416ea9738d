//! Order notification payloads.
//!
//! Serialized as `{"event":"order:new","data":{...order with items...}}`,
//! the shape the floor and kitchen screens listen for.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::OrderDetail;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "event", content = "data")]
pub enum OrderEvent {
    #[serde(rename = "order:new")]
    New(OrderDetail),
    #[serde(rename = "order:updated")]
    Updated(OrderDetail),
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::New(_) => "order:new",
            OrderEvent::Updated(_) => "order:updated",
        }
    }

    pub fn order(&self) -> &OrderDetail {
        match self {
            OrderEvent::New(detail) | OrderEvent::Updated(detail) => detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, OrderStatus, OrderType, PaymentStatus};
    use chrono::Utc;

    fn detail() -> OrderDetail {
        let now = Utc::now();
        OrderDetail {
            order: Order {
                id: "o-1".into(),
                order_number: "ORD-1-1".into(),
                waiter_id: "w-1".into(),
                waiter_name: None,
                cashier_id: None,
                table_id: None,
                table_number: None,
                order_type: OrderType::Takeaway,
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
                payment_method: None,
                payment_reference: None,
                total_amount_cents: 500,
                created_at: now,
                updated_at: now,
                completed_at: None,
                paid_at: None,
            },
            items: vec![],
        }
    }

    #[test]
    fn test_event_envelope() {
        let json = serde_json::to_value(OrderEvent::New(detail())).unwrap();
        assert_eq!(json["event"], "order:new");
        assert_eq!(json["data"]["id"], "o-1");
        assert_eq!(json["data"]["status"], "pending");
        assert!(json["data"]["items"].is_array());

        let updated = OrderEvent::Updated(detail());
        assert_eq!(updated.name(), "order:updated");
        assert_eq!(updated.order().order.id, "o-1");
    }
}
