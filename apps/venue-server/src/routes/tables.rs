//! Table registry endpoints. Any staff member may change a table's status;
//! creating, editing and deleting tables is for admins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use venue_core::policy::require_admin;
use venue_core::{NewTable, OccupiedTable, Table, TableFilter, TableStatus, TableUpdate};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: TableStatus,
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(filter): Query<TableFilter>,
) -> ApiResult<Json<Vec<Table>>> {
    Ok(Json(state.db.tables().list(filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Table>> {
    Ok(Json(state.db.tables().get(&id).await?))
}

pub async fn available(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Table>>> {
    Ok(Json(state.db.tables().available().await?))
}

pub async fn occupied(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<OccupiedTable>>> {
    Ok(Json(state.db.tables().occupied().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewTable>,
) -> ApiResult<(StatusCode, Json<Table>)> {
    require_admin(&actor, "manage tables")?;
    let table = state.db.tables().create(input).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(update): Json<TableUpdate>,
) -> ApiResult<Json<Table>> {
    require_admin(&actor, "manage tables")?;
    Ok(Json(state.db.tables().update(&id, update).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Table>> {
    Ok(Json(state.db.tables().set_status(&id, body.status).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&actor, "manage tables")?;
    state.db.tables().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
