//! Sales reports and the dashboard summary. Any staff member may read the
//! sales breakdowns; the summary is for admins.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use venue_core::policy::require_admin;
use venue_core::{DashboardSummary, ItemSalesRow, ReportRange, StaffSalesRow};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::AppState;

/// Both bounds optional: the end defaults to now, the start to
/// `VENUE_REPORT_DEFAULT_DAYS` before the end.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl RangeQuery {
    fn resolve(self, default_days: i64) -> ReportRange {
        ReportRange::resolve(self.start_date, self.end_date, default_days, Utc::now())
    }
}

pub async fn item_sales(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<ItemSalesRow>>> {
    let range = query.resolve(state.config.report_default_days);
    Ok(Json(state.db.reports().item_sales(range).await?))
}

pub async fn staff_sales(
    State(state): State<AppState>,
    Authenticated(_actor): Authenticated,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<StaffSalesRow>>> {
    let range = query.resolve(state.config.report_default_days);
    Ok(Json(state.db.reports().staff_sales(range).await?))
}

pub async fn summary(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
) -> ApiResult<Json<DashboardSummary>> {
    require_admin(&actor, "view reports")?;
    Ok(Json(state.db.reports().summary(Utc::now()).await?))
}
