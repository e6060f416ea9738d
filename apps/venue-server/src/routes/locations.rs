//! Location registry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use venue_core::policy::require_admin;
use venue_core::{Location, LocationType, LocationUpdate, NewLocation};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "type")]
    pub location_type: Option<LocationType>,
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.db.locations().list(query.location_type).await?))
}

/// Locations a transfer may start from.
pub async fn sources(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.db.locations().sources().await?))
}

pub async fn destinations(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.db.locations().destinations().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewLocation>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    require_admin(&actor, "manage locations")?;
    let location = state.db.locations().create(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    Ok(Json(state.db.locations().get(&id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(update): Json<LocationUpdate>,
) -> ApiResult<Json<Location>> {
    require_admin(&actor, "manage locations")?;
    Ok(Json(state.db.locations().update(&id, update).await?))
}

/// Rejected while any transfer references the location.
pub async fn remove(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&actor, "manage locations")?;
    state.db.locations().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
