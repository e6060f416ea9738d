//! Transfer engine: validation, stock movement and completion races.

mod common;

use common::{location, venue, venue_in};
use std::time::Duration;
use venue_core::{
    CoreError, ErrorKind, LocationType, NewTransfer, StockCounter, TransferFilter, TransferStatus,
};
use venue_db::{Database, DbConfig, DbError};

fn transfer(from: &str, to: &str, item_id: &str, quantity: i64) -> NewTransfer {
    NewTransfer {
        from_location_id: from.into(),
        to_location_id: to.into(),
        item_id: item_id.into(),
        quantity,
    }
}

#[tokio::test]
async fn main_store_to_bar_moves_stock_on_completion() {
    let v = venue().await;
    let tusker = v.item("Tusker", 25_000, 50).await;

    let pending = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &tusker.id, 20))
        .await
        .unwrap();
    assert_eq!(pending.status, TransferStatus::Pending);
    assert_eq!(pending.from_location_name, "Main Store");
    assert_eq!(pending.to_location_name, "Bar");
    assert_eq!(pending.item_name, "Tusker");

    // Nothing moves until completion.
    assert_eq!(v.stock(&tusker.id, StockCounter::MainStore).await, 50);
    assert_eq!(v.stock(&tusker.id, StockCounter::Bar).await, 0);

    let done = v.db.transfers().complete(&v.admin, &pending.id).await.unwrap();
    assert_eq!(done.status, TransferStatus::Completed);
    assert!(done.completed_at.is_some());

    assert_eq!(v.stock(&tusker.id, StockCounter::MainStore).await, 30);
    assert_eq!(v.stock(&tusker.id, StockCounter::Bar).await, 20);

    let err = v
        .db
        .transfers()
        .complete(&v.admin, &pending.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(v.stock(&tusker.id, StockCounter::Bar).await, 20);
}

#[tokio::test]
async fn creation_checks_source_stock() {
    let v = venue().await;
    let gin = v.item("Gin", 180_000, 5).await;

    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &gin.id, 6))
        .await
        .unwrap_err();
    match err {
        DbError::Domain(CoreError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 5);
            assert_eq!(requested, 6);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(v.stock(&gin.id, StockCounter::MainStore).await, 5);
    assert!(v
        .db
        .transfers()
        .list(TransferFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn cancel_changes_no_stock_and_is_final() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 24).await;

    let pending = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.counter.id, &coke.id, 12))
        .await
        .unwrap();

    let cancelled = v.db.transfers().cancel(&v.admin, &pending.id).await.unwrap();
    assert_eq!(cancelled.status, TransferStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(v.stock(&coke.id, StockCounter::MainStore).await, 24);
    assert_eq!(v.stock(&coke.id, StockCounter::Counter).await, 0);

    let err = v
        .db
        .transfers()
        .complete(&v.admin, &pending.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = v
        .db
        .transfers()
        .cancel(&v.admin, &pending.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = v.db.transfers().cancel(&v.admin, "missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn location_types_and_roles_are_enforced() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 24).await;

    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.bar.id, &v.counter.id, &coke.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.main_store.id, &coke.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &coke.id, 0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, "nowhere", &coke.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = v
        .db
        .transfers()
        .create(&v.cashier, transfer(&v.main_store.id, &v.bar.id, &coke.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn bidirectional_location_can_send_and_receive() {
    let v = venue().await;
    let kitchen = location(&v.db, "Kitchen Store", LocationType::Both).await;
    let water = v.item("Water", 6_000, 10).await;

    // "Kitchen Store" maps to the main-store counter by name.
    let err = v
        .db
        .transfers()
        .create(&v.admin, transfer(&kitchen.id, &v.main_store.id, &water.id, 1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let t = v
        .db
        .transfers()
        .create(&v.admin, transfer(&kitchen.id, &v.bar.id, &water.id, 4))
        .await
        .unwrap();
    v.db.transfers().complete(&v.admin, &t.id).await.unwrap();
    assert_eq!(v.stock(&water.id, StockCounter::MainStore).await, 6);
    assert_eq!(v.stock(&water.id, StockCounter::Bar).await, 4);
}

#[tokio::test]
async fn completion_rechecks_stock() {
    let v = venue().await;
    let gin = v.item("Gin", 180_000, 50).await;

    let first = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &gin.id, 30))
        .await
        .unwrap();
    let second = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.counter.id, &gin.id, 30))
        .await
        .unwrap();

    v.db.transfers().complete(&v.admin, &first.id).await.unwrap();

    let err = v
        .db
        .transfers()
        .complete(&v.admin, &second.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);

    // The losing transfer rolled back completely and is still pending.
    let second = v.db.transfers().get(&second.id).await.unwrap();
    assert_eq!(second.status, TransferStatus::Pending);
    assert!(second.completed_at.is_none());
    assert_eq!(v.stock(&gin.id, StockCounter::MainStore).await, 20);
    assert_eq!(v.stock(&gin.id, StockCounter::Bar).await, 30);
    assert_eq!(v.stock(&gin.id, StockCounter::Counter).await, 0);

    let pending = v
        .db
        .transfers()
        .list(TransferFilter {
            status: Some(TransferStatus::Pending),
            to_location_id: None,
        })
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(v.db.transfers().pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn location_with_transfers_cannot_be_deleted() {
    let v = venue().await;
    let coke = v.item("Coke", 8_000, 5).await;
    v.db.transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &coke.id, 1))
        .await
        .unwrap();

    let err = v.db.locations().delete(&v.bar.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

/// Two transfers that each fit but not together, completed at the same
/// time over separate connections: exactly one wins.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("race.db"))
        .max_connections(4)
        .busy_timeout(Duration::from_secs(10));
    let v = venue_in(Database::new(config).await.unwrap()).await;
    let gin = v.item("Gin", 180_000, 50).await;

    for _round in 0..5 {
        v.db.items()
            .set_stock(&gin.id, StockCounter::MainStore, 50)
            .await
            .unwrap();

        let a = v
            .db
            .transfers()
            .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &gin.id, 30))
            .await
            .unwrap();
        let b = v
            .db
            .transfers()
            .create(&v.admin, transfer(&v.main_store.id, &v.counter.id, &gin.id, 30))
            .await
            .unwrap();

        let (db_a, db_b) = (v.db.clone(), v.db.clone());
        let (admin_a, admin_b) = (v.admin.clone(), v.admin.clone());
        let task_a =
            tokio::spawn(async move { db_a.transfers().complete(&admin_a, &a.id).await });
        let task_b =
            tokio::spawn(async move { db_b.transfers().complete(&admin_b, &b.id).await });

        let results = [task_a.await.unwrap(), task_b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one completion must succeed: {results:?}");

        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::InsufficientStock);

        assert_eq!(v.stock(&gin.id, StockCounter::MainStore).await, 20);

        // Reset the destinations for the next round.
        v.db.items().set_stock(&gin.id, StockCounter::Bar, 0).await.unwrap();
        v.db.items().set_stock(&gin.id, StockCounter::Counter, 0).await.unwrap();
    }
}

#[tokio::test]
async fn completion_rejects_destination_overflow() {
    let v = venue().await;
    let water = v.item("Water", 6_000, 10).await;
    v.db.items()
        .set_stock(&water.id, StockCounter::Bar, i64::MAX - 1)
        .await
        .unwrap();

    let t = v
        .db
        .transfers()
        .create(&v.admin, transfer(&v.main_store.id, &v.bar.id, &water.id, 5))
        .await
        .unwrap();
    let err = v.db.transfers().complete(&v.admin, &t.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // Source debit rolled back with the failed credit.
    assert_eq!(v.stock(&water.id, StockCounter::MainStore).await, 10);
    assert_eq!(v.stock(&water.id, StockCounter::Bar).await, i64::MAX - 1);
    let t = v.db.transfers().get(&t.id).await.unwrap();
    assert_eq!(t.status, TransferStatus::Pending);
}
