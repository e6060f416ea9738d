//! Catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use venue_core::policy::require_admin;
use venue_core::{Item, ItemFilter, ItemUpdate, NewItem, StockChange, DEFAULT_LOW_STOCK_THRESHOLD};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.db.items().list(filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.db.items().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    require_admin(&actor, "manage the catalog")?;
    let item = state.db.items().create(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(update): Json<ItemUpdate>,
) -> ApiResult<Json<Item>> {
    require_admin(&actor, "manage the catalog")?;
    Ok(Json(state.db.items().update(&id, update).await?))
}

/// `{"mode":"adjust","counter":"bar","delta":-2}` or
/// `{"mode":"set","counter":"main_store","quantity":48}`
pub async fn change_stock(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(change): Json<StockChange>,
) -> ApiResult<Json<Item>> {
    require_admin(&actor, "edit stock")?;
    Ok(Json(state.db.items().apply(&id, change).await?))
}

pub async fn low_stock(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(query): Query<LowStockQuery>,
) -> ApiResult<Json<Vec<Item>>> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    Ok(Json(state.db.items().low_stock(threshold).await?))
}

pub async fn out_of_stock(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Item>>> {
    Ok(Json(state.db.items().out_of_stock().await?))
}
