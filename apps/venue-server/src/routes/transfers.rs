//! Stock transfer endpoints. The engine enforces admin-only mutation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use venue_core::{NewTransfer, Transfer, TransferFilter};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(filter): Query<TransferFilter>,
) -> ApiResult<Json<Vec<Transfer>>> {
    Ok(Json(state.db.transfers().list(filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Transfer>> {
    Ok(Json(state.db.transfers().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewTransfer>,
) -> ApiResult<(StatusCode, Json<Transfer>)> {
    let transfer = state.db.transfers().create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

pub async fn complete(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Transfer>> {
    Ok(Json(state.db.transfers().complete(&actor, &id).await?))
}

pub async fn cancel(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Transfer>> {
    Ok(Json(state.db.transfers().cancel(&actor, &id).await?))
}
