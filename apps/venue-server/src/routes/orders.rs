//! Order endpoints. Every successful mutation publishes an order event
//! after the engine has committed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use venue_core::{
    NewOrder, Order, OrderDetail, OrderEvent, OrderFilter, OrderStatus, PaymentMethod,
    PaymentUpdate,
};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkPaidBody {
    pub payment_method: Option<PaymentMethod>,
    #[serde(alias = "mpesa_reference")]
    pub reference: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.db.orders().list(&actor, filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let detail = state.db.orders().create(&actor, input).await?;
    state.notifier.publish(OrderEvent::New(detail.clone()));
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(state.db.orders().get_for(&actor, &id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<OrderDetail>> {
    let detail = state.db.orders().update_status(&actor, &id, body.status).await?;
    Ok(updated(&state, detail))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<PaymentUpdate>,
) -> ApiResult<Json<OrderDetail>> {
    let detail = state.db.orders().update_payment(&actor, &id, body).await?;
    Ok(updated(&state, detail))
}

pub async fn complete(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    let detail = state.db.orders().complete(&actor, &id).await?;
    Ok(updated(&state, detail))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<MarkPaidBody>,
) -> ApiResult<Json<OrderDetail>> {
    let detail = state
        .db
        .orders()
        .mark_paid(&actor, &id, body.payment_method, body.reference)
        .await?;
    Ok(updated(&state, detail))
}

fn updated(state: &AppState, detail: OrderDetail) -> Json<OrderDetail> {
    state.notifier.publish(OrderEvent::Updated(detail.clone()));
    Json(detail)
}
