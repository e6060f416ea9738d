//! Route table.
//!
//! Handlers authenticate through [`Authenticated`](crate::Authenticated),
//! call one engine operation and return its result as JSON. Admin-only
//! endpoints check the policy before touching storage.

pub mod categories;
pub mod items;
pub mod locations;
pub mod orders;
pub mod reports;
pub mod staff;
pub mod tables;
pub mod transfers;

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::notify::order_feed;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(order_feed))
        // Orders
        .route("/api/orders", get(orders::list).post(orders::create))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/orders/{id}/payment-status", patch(orders::update_payment))
        .route("/api/orders/{id}/complete", post(orders::complete))
        .route("/api/orders/{id}/mark-paid", post(orders::mark_paid))
        // Transfers
        .route("/api/transfers", get(transfers::list).post(transfers::create))
        .route("/api/transfers/{id}", get(transfers::get))
        .route("/api/transfers/{id}/complete", post(transfers::complete))
        .route("/api/transfers/{id}/cancel", post(transfers::cancel))
        // Tables
        .route("/api/tables", get(tables::list).post(tables::create))
        .route("/api/tables/available", get(tables::available))
        .route("/api/tables/occupied", get(tables::occupied))
        .route(
            "/api/tables/{id}",
            get(tables::get).patch(tables::update).delete(tables::remove),
        )
        .route("/api/tables/{id}/status", patch(tables::set_status))
        // Catalog
        .route("/api/categories", get(categories::list).post(categories::create))
        .route(
            "/api/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::remove),
        )
        .route("/api/items", get(items::list).post(items::create))
        .route("/api/items/low-stock", get(items::low_stock))
        .route("/api/items/out-of-stock", get(items::out_of_stock))
        .route("/api/items/{id}", get(items::get).patch(items::update))
        .route("/api/items/{id}/stock", post(items::change_stock))
        // Locations
        .route("/api/locations", get(locations::list).post(locations::create))
        .route("/api/locations/sources", get(locations::sources))
        .route("/api/locations/destinations", get(locations::destinations))
        .route(
            "/api/locations/{id}",
            get(locations::get)
                .patch(locations::update)
                .delete(locations::remove),
        )
        // Staff
        .route("/api/staff", get(staff::list).post(staff::create))
        .route("/api/staff/{id}", get(staff::get))
        .route("/api/staff/{id}/active", patch(staff::set_active))
        // Reports
        .route("/api/reports/item-sales", get(reports::item_sales))
        .route("/api/reports/staff-sales", get(reports::staff_sales))
        .route("/api/reports/summary", get(reports::summary))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = state.db.health_check().await;
    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "subscribers": state.notifier.subscriber_count(),
    }))
}
