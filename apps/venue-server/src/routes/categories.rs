//! Category endpoints. Reads are open to staff, writes are for admins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use venue_core::policy::require_admin;
use venue_core::{Category, CategoryUpdate, NewCategory};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.db.categories().get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    require_admin(&actor, "manage the catalog")?;
    let category = state.db.categories().create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
    Json(update): Json<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    require_admin(&actor, "manage the catalog")?;
    Ok(Json(state.db.categories().update(&id, update).await?))
}

/// Rejected while any item is still filed under the category.
pub async fn remove(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_admin(&actor, "manage the catalog")?;
    state.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
