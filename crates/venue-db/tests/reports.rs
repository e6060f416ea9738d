//! Sales reports and the dashboard summary.

mod common;

use chrono::{Duration, Utc};
use common::{staff, venue};
use venue_core::{
    Actor, NewOrder, OrderLineRequest, OrderStatus, PaymentMethod, ReportRange, Role,
};

fn order(lines: &[(&str, i64)]) -> NewOrder {
    NewOrder {
        items: lines
            .iter()
            .map(|(item_id, quantity)| OrderLineRequest {
                item_id: item_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
        ..Default::default()
    }
}

fn last_day() -> ReportRange {
    ReportRange::resolve(None, None, 1, Utc::now() + Duration::minutes(1))
}

#[tokio::test]
async fn item_sales_count_only_paid_orders() {
    let v = venue().await;
    let tusker = v.item("Tusker", 25_000, 0).await;
    let coke = v.item("Coke", 8_000, 0).await;

    let paid = v
        .db
        .orders()
        .create(&v.waiter, order(&[(&tusker.id, 4), (&coke.id, 1)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(&v.cashier, &paid.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();

    // Unpaid orders are not sales.
    v.db.orders()
        .create(&v.waiter, order(&[(&coke.id, 10)]))
        .await
        .unwrap();

    let rows = v.db.reports().item_sales(last_day()).await.unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].number, 1);
    assert_eq!(rows[0].item_name, "Tusker");
    assert_eq!(rows[0].quantity_sold, 4);
    assert_eq!(rows[0].revenue_cents, 100_000);

    assert_eq!(rows[1].number, 2);
    assert_eq!(rows[1].item_name, "Coke");
    assert_eq!(rows[1].quantity_sold, 1);
    assert_eq!(rows[1].revenue_cents, 8_000);

    let past = ReportRange::resolve(
        Some(Utc::now() - Duration::days(10)),
        Some(Utc::now() - Duration::days(5)),
        30,
        Utc::now(),
    );
    assert!(v.db.reports().item_sales(past).await.unwrap().is_empty());
}

#[tokio::test]
async fn staff_sales_split_by_method() {
    let v = venue().await;
    let tusker = v.item("Tusker", 25_000, 0).await;

    let cash = v
        .db
        .orders()
        .create(&v.waiter, order(&[(&tusker.id, 2)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(&v.cashier, &cash.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();

    let mpesa = v
        .db
        .orders()
        .create(&v.waiter, order(&[(&tusker.id, 1)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(
            &v.cashier,
            &mpesa.order.id,
            Some(PaymentMethod::Mpesa),
            Some("QK12ABC34D".into()),
        )
        .await
        .unwrap();

    let other = v
        .db
        .orders()
        .create(&v.other_waiter, order(&[(&tusker.id, 1)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(&v.cashier, &other.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();

    // Admin orders never show up in staff sales.
    let boss = staff(&v.db, "boss", Role::Admin).await;
    let boss = Actor::new(boss.id, Role::Admin);
    let own = v
        .db
        .orders()
        .create(&boss, order(&[(&tusker.id, 9)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(&boss, &own.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();

    let rows = v.db.reports().staff_sales(last_day()).await.unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].number, 1);
    assert_eq!(rows[0].staff_id, v.waiter.id);
    assert_eq!(rows[0].order_count, 2);
    assert_eq!(rows[0].cash_cents, 50_000);
    assert_eq!(rows[0].mpesa_cents, 25_000);
    assert_eq!(rows[0].total_cents, 75_000);

    assert_eq!(rows[1].number, 2);
    assert_eq!(rows[1].staff_id, v.other_waiter.id);
    assert_eq!(rows[1].total_cents, 25_000);
}

#[tokio::test]
async fn summary_reflects_floor_state() {
    let v = venue().await;
    let tusker = v.item("Tusker", 25_000, 10).await;
    let table = v.table("1").await;

    let dine_in = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                table_id: Some(table.id.clone()),
                ..order(&[(&tusker.id, 1)])
            },
        )
        .await
        .unwrap();
    v.db.orders()
        .update_status(&v.waiter, &dine_in.order.id, OrderStatus::Preparing)
        .await
        .unwrap();

    let takeaway = v
        .db
        .orders()
        .create(&v.cashier, order(&[(&tusker.id, 2)]))
        .await
        .unwrap();
    v.db.orders()
        .mark_paid(&v.cashier, &takeaway.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();

    v.db.transfers()
        .create(
            &v.admin,
            venue_core::NewTransfer {
                from_location_id: v.main_store.id.clone(),
                to_location_id: v.bar.id.clone(),
                item_id: tusker.id.clone(),
                quantity: 5,
            },
        )
        .await
        .unwrap();

    let summary = v.db.reports().summary(Utc::now()).await.unwrap();
    assert_eq!(summary.pending_orders, 1);
    assert_eq!(summary.preparing_orders, 1);
    assert_eq!(summary.ready_orders, 0);
    assert_eq!(summary.completed_orders, 0);
    assert_eq!(summary.paid_revenue_today_cents, 50_000);
    assert_eq!(summary.pending_transfers, 1);
    assert_eq!(summary.occupied_tables, 1);
}
