//! Staff directory endpoints. Passwords and login belong to the identity
//! service; this only manages the rows orders and reports point at.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use venue_core::policy::require_admin;
use venue_core::{NewStaff, Staff};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
    pub is_active: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Staff>>> {
    Ok(Json(state.db.staff().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Staff>> {
    Ok(Json(state.db.staff().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewStaff>,
) -> ApiResult<(StatusCode, Json<Staff>)> {
    require_admin(&actor, "manage staff")?;
    let staff = state.db.staff().create(input).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn set_active(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<ActiveBody>,
) -> ApiResult<Json<Staff>> {
    require_admin(&actor, "manage staff")?;
    Ok(Json(state.db.staff().set_active(&id, body.is_active).await?))
}
