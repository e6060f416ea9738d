//! Order engine: creation, pricing, status and payment state machines.

mod common;

use common::venue;
use venue_core::{
    ErrorKind, ItemUpdate, NewOrder, OrderFilter, OrderLineRequest, OrderStatus, OrderType,
    PaymentMethod, PaymentStatus, PaymentUpdate, TableStatus,
};

fn line(item_id: &str, quantity: i64) -> OrderLineRequest {
    OrderLineRequest {
        item_id: item_id.into(),
        quantity,
    }
}

#[tokio::test]
async fn dine_in_order_lifecycle_releases_table() {
    let v = venue().await;
    let tusker = v.item("Tusker", 25_000, 0).await;
    let samosa = v.item("Samosa", 5_000, 0).await;
    let table = v.table("7").await;

    let created = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&tusker.id, 2), line(&samosa.id, 3)],
                table_id: Some(table.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let order = &created.order;
    assert_eq!(order.order_type, OrderType::DineIn);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.waiter_id, v.waiter.id);
    assert_eq!(order.table_number.as_deref(), Some("7"));
    assert_eq!(order.total_amount_cents, 2 * 25_000 + 3 * 5_000);
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].item_name, "Tusker");
    assert_eq!(
        v.db.tables().get(&table.id).await.unwrap().status,
        TableStatus::Occupied
    );

    for status in [OrderStatus::Preparing, OrderStatus::Ready] {
        v.db.orders()
            .update_status(&v.waiter, &order.id, status)
            .await
            .unwrap();
    }
    let completed = v.db.orders().complete(&v.cashier, &order.id).await.unwrap();
    assert_eq!(completed.order.status, OrderStatus::Completed);
    assert!(completed.order.completed_at.is_some());
    assert_eq!(completed.order.cashier_id.as_deref(), Some(v.cashier.id.as_str()));
    assert_eq!(
        v.db.tables().get(&table.id).await.unwrap().status,
        TableStatus::Available
    );

    let paid = v
        .db
        .orders()
        .mark_paid(&v.cashier, &order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap();
    assert_eq!(paid.order.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.order.payment_method, Some(PaymentMethod::Cash));
    assert!(paid.order.paid_at.is_some());
}

#[tokio::test]
async fn completed_order_is_terminal() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let created = v
        .db
        .orders()
        .create(
            &v.cashier,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let id = created.order.id.clone();

    for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed] {
        v.db.orders().update_status(&v.cashier, &id, status).await.unwrap();
    }
    let before = v.db.orders().get(&id).await.unwrap();

    let err = v
        .db
        .orders()
        .update_status(&v.cashier, &id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = v
        .db
        .orders()
        .update_status(&v.cashier, &id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let after = v.db.orders().get(&id).await.unwrap();
    assert_eq!(after.order.status, OrderStatus::Completed);
    assert_eq!(after.order.updated_at, before.order.updated_at);
}

#[tokio::test]
async fn skipping_states_is_rejected() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let created = v
        .db
        .orders()
        .create(
            &v.cashier,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = v
        .db
        .orders()
        .update_status(&v.cashier, &created.order.id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = v
        .db
        .orders()
        .update_status(&v.cashier, "missing", OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn captured_price_survives_cost_edit() {
    let v = venue().await;
    let gin = v.item("Gin", 180_000, 0).await;

    let created = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&gin.id, 2)],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    v.db.items()
        .update(
            &gin.id,
            ItemUpdate {
                unit_cost_cents: Some(200_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let order = v.db.orders().get(&created.order.id).await.unwrap();
    assert_eq!(order.order.total_amount_cents, 360_000);
    assert_eq!(order.items[0].unit_price_cents, 180_000);
    let recomputed: i64 = order.items.iter().map(|i| i.line_total().cents()).sum();
    assert_eq!(recomputed, order.order.total_amount_cents);
}

#[tokio::test]
async fn order_type_and_table_must_agree() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let table = v.table("1").await;

    let err = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                order_type: Some(OrderType::Takeaway),
                table_id: Some(table.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                order_type: Some(OrderType::DineIn),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let takeaway = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(takeaway.order.order_type, OrderType::Takeaway);
    assert!(takeaway.order.table_id.is_none());

    assert_eq!(
        v.db.tables().get(&table.id).await.unwrap().status,
        TableStatus::Available
    );
}

#[tokio::test]
async fn failed_creation_leaves_nothing_behind() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let table = v.table("3").await;

    let err = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1), line("no-such-item", 1)],
                table_id: Some(table.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(v.db.orders().count().await.unwrap(), 0);
    assert_eq!(
        v.db.tables().get(&table.id).await.unwrap().status,
        TableStatus::Available
    );

    let err = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                table_id: Some("no-such-table".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 0)],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .orders()
        .create(&v.waiter, NewOrder::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(v.db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn payment_requires_method_and_mpesa_reference() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let created = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 2)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let id = created.order.id.clone();

    let err = v
        .db
        .orders()
        .mark_paid(&v.cashier, &id, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .orders()
        .update_payment(
            &v.cashier,
            &id,
            PaymentUpdate {
                payment_status: PaymentStatus::Paid,
                payment_method: Some(PaymentMethod::Mpesa),
                reference: Some("   ".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let unchanged = v.db.orders().get(&id).await.unwrap();
    assert_eq!(unchanged.order.payment_status, PaymentStatus::Pending);

    let paid = v
        .db
        .orders()
        .update_payment(
            &v.cashier,
            &id,
            PaymentUpdate {
                payment_status: PaymentStatus::Paid,
                payment_method: Some(PaymentMethod::Mpesa),
                reference: Some("QK12ABC34D".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(paid.order.payment_reference.as_deref(), Some("QK12ABC34D"));
    assert_eq!(paid.order.cashier_id.as_deref(), Some(v.cashier.id.as_str()));

    let refunded = v
        .db
        .orders()
        .update_payment(
            &v.admin,
            &id,
            PaymentUpdate {
                payment_status: PaymentStatus::Refunded,
                payment_method: None,
                reference: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(refunded.order.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.order.payment_method, Some(PaymentMethod::Mpesa));
    // First cashier stays on record.
    assert_eq!(refunded.order.cashier_id.as_deref(), Some(v.cashier.id.as_str()));

    let err = v
        .db
        .orders()
        .mark_paid(&v.cashier, &id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn cancelled_order_cannot_be_paid_and_frees_table() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let table = v.table("9").await;

    let created = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                items: vec![line(&coke.id, 1)],
                table_id: Some(table.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let cancelled = v
        .db
        .orders()
        .update_status(&v.cashier, &created.order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert!(cancelled.order.completed_at.is_none());
    assert_eq!(
        v.db.tables().get(&table.id).await.unwrap().status,
        TableStatus::Available
    );

    let err = v
        .db
        .orders()
        .mark_paid(&v.cashier, &created.order.id, Some(PaymentMethod::Cash), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn waiters_are_limited_to_their_own_orders() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;

    // Waiters cannot place orders for somebody else.
    let mine = v
        .db
        .orders()
        .create(
            &v.waiter,
            NewOrder {
                waiter_id: Some(v.other_waiter.id.clone()),
                items: vec![line(&coke.id, 1)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(mine.order.waiter_id, v.waiter.id);

    // A cashier can place one on behalf of a waiter.
    let theirs = v
        .db
        .orders()
        .create(
            &v.cashier,
            NewOrder {
                waiter_id: Some(v.other_waiter.id.clone()),
                items: vec![line(&coke.id, 1)],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(theirs.order.waiter_id, v.other_waiter.id);

    let err = v
        .db
        .orders()
        .update_status(&v.waiter, &theirs.order.id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = v
        .db
        .orders()
        .get_for(&v.waiter, &theirs.order.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = v
        .db
        .orders()
        .update_status(&v.waiter, &mine.order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let listed = v
        .db
        .orders()
        .list(&v.waiter, OrderFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.order.id);

    let all = v
        .db
        .orders()
        .list(&v.cashier, OrderFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_filters_by_status_and_limit() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let created = v
            .db
            .orders()
            .create(
                &v.cashier,
                NewOrder {
                    items: vec![line(&coke.id, 1)],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        ids.push(created.order.id);
    }
    v.db.orders()
        .update_status(&v.cashier, &ids[0], OrderStatus::Preparing)
        .await
        .unwrap();

    let preparing = v
        .db
        .orders()
        .list(
            &v.cashier,
            OrderFilter {
                status: Some(OrderStatus::Preparing),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(preparing.len(), 1);
    assert_eq!(preparing[0].id, ids[0]);

    let limited = v
        .db
        .orders()
        .list(
            &v.cashier,
            OrderFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn occupied_tables_count_active_orders() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;
    let table = v.table("4").await;

    for _ in 0..2 {
        v.db.orders()
            .create(
                &v.waiter,
                NewOrder {
                    items: vec![line(&coke.id, 1)],
                    table_id: Some(table.id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let occupied = v.db.tables().occupied().await.unwrap();
    assert_eq!(occupied.len(), 1);
    assert_eq!(occupied[0].table.id, table.id);
    assert_eq!(occupied[0].active_orders, 2);

    let err = v.db.tables().delete(&table.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn concurrent_orders_get_distinct_numbers() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 0).await;

    let new_order = || NewOrder {
        items: vec![line(&coke.id, 1)],
        ..Default::default()
    };
    let orders = v.db.orders();
    let (a, b, c) = tokio::join!(
        orders.create(&v.cashier, new_order()),
        orders.create(&v.cashier, new_order()),
        orders.create(&v.cashier, new_order()),
    );

    let mut numbers = vec![
        a.unwrap().order.order_number,
        b.unwrap().order.order_number,
        c.unwrap().order.order_number,
    ];
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 3);
}
