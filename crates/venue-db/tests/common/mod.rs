//! Shared fixtures for the engine tests.

#![allow(dead_code)]

use venue_core::{
    Actor, Item, Location, LocationType, NewItem, NewLocation, NewStaff, NewTable, Role, Staff,
    StockCounter, Table,
};
use venue_db::{Database, DbConfig};

pub struct Venue {
    pub db: Database,
    pub admin: Actor,
    pub cashier: Actor,
    pub waiter: Actor,
    pub other_waiter: Actor,
    pub main_store: Location,
    pub bar: Location,
    pub counter: Location,
}

pub async fn staff(db: &Database, username: &str, role: Role) -> Staff {
    db.staff()
        .create(NewStaff {
            username: username.into(),
            full_name: format!("{username} (test)"),
            role,
        })
        .await
        .unwrap()
}

pub async fn location(db: &Database, name: &str, location_type: LocationType) -> Location {
    db.locations()
        .create(NewLocation {
            name: name.into(),
            location_type,
            stock_counter: None,
            description: None,
        })
        .await
        .unwrap()
}

/// Staff of every role and the three standard locations.
pub async fn venue_in(db: Database) -> Venue {
    let admin = staff(&db, "admin", Role::Admin).await;
    let cashier = staff(&db, "cashier", Role::Cashier).await;
    let waiter = staff(&db, "waiter", Role::Waiter).await;
    let other_waiter = staff(&db, "waiter2", Role::Waiter).await;

    let main_store = location(&db, "Main Store", LocationType::Source).await;
    let bar = location(&db, "Bar", LocationType::Destination).await;
    let counter = location(&db, "Counter", LocationType::Destination).await;

    Venue {
        admin: Actor::new(admin.id, Role::Admin),
        cashier: Actor::new(cashier.id, Role::Cashier),
        waiter: Actor::new(waiter.id, Role::Waiter),
        other_waiter: Actor::new(other_waiter.id, Role::Waiter),
        main_store,
        bar,
        counter,
        db,
    }
}

pub async fn venue() -> Venue {
    venue_in(Database::new(DbConfig::in_memory()).await.unwrap()).await
}

impl Venue {
    /// An item costing `unit_cost_cents` with `main_store` units in the store.
    pub async fn item(&self, name: &str, unit_cost_cents: i64, main_store: i64) -> Item {
        self.db
            .items()
            .create(NewItem {
                name: name.into(),
                unit_cost_cents,
                stock_main_store: Some(main_store),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn table(&self, number: &str) -> Table {
        self.db
            .tables()
            .create(NewTable {
                table_number: number.into(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn stock(&self, item_id: &str, counter: StockCounter) -> i64 {
        self.db.items().get(item_id).await.unwrap().stock(counter)
    }
}
