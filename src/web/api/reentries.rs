use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collector::{AdapterStatus, RunReport};
use crate::config::Permission;
use crate::decay::RiskLevel;
use crate::fusion::{Candidate, Summary};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{ApiClient, AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReentriesQuery {
    /// Only entries at this risk level.
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    /// Only entries whose position falls inside the configured region.
    #[serde(default)]
    pub inside_region: Option<bool>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReentriesResponse {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub used_backup: bool,
    pub total: usize,
    pub entries: Vec<Candidate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub available_sources: usize,
    pub used_backup: bool,
}

impl From<&RunReport> for RefreshResponse {
    fn from(report: &RunReport) -> Self {
        RefreshResponse {
            run_id: report.run_id.clone(),
            generated_at: report.generated_at,
            total: report.entries.len(),
            available_sources: report.available_sources(),
            used_backup: report.used_backup,
        }
    }
}

fn matches(entry: &Candidate, query: &ReentriesQuery) -> bool {
    if query.risk.is_some_and(|risk| entry.risk_level() != risk) {
        return false;
    }
    match query.inside_region {
        Some(wanted) => {
            let inside = entry
                .as_estimate()
                .and_then(|e| e.region.as_ref())
                .is_some_and(|r| r.inside);
            inside == wanted
        }
        None => true,
    }
}

async fn latest(state: &AppState) -> ApiResult<RunReport> {
    state.latest.read().await.clone().ok_or(ApiError::NotReady)
}

#[utoipa::path(
    get,
    path = "/api/reentries",
    tag = "reentries",
    params(
        ("risk" = Option<RiskLevel>, Query, description = "Filter by risk level (high, medium, low)"),
        ("inside_region" = Option<bool>, Query, description = "Filter by position inside the region of interest"),
        ("limit" = Option<usize>, Query, description = "Maximum number of entries")
    ),
    responses(
        (status = 200, description = "Reentry candidates, most urgent first", body = ReentriesResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "No data yet", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn list_reentries(
    State(state): State<AppState>,
    client: ApiClient,
    Query(query): Query<ReentriesQuery>,
) -> ApiResult<Json<ReentriesResponse>> {
    client.require(Permission::ViewReentries)?;

    let report = latest(&state).await?;
    let total = report.entries.len();
    let entries: Vec<Candidate> = report
        .entries
        .into_iter()
        .filter(|e| matches(e, &query))
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    Ok(Json(ReentriesResponse {
        run_id: report.run_id,
        generated_at: report.generated_at,
        used_backup: report.used_backup,
        total,
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/api/reentries/summary",
    tag = "reentries",
    responses(
        (status = 200, description = "Distribution of the latest run", body = Summary),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "No data yet", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn summary(
    State(state): State<AppState>,
    client: ApiClient,
) -> ApiResult<Json<Summary>> {
    client.require(Permission::ViewReentries)?;
    Ok(Json(latest(&state).await?.summary))
}

#[utoipa::path(
    get,
    path = "/api/sources",
    tag = "reentries",
    responses(
        (status = 200, description = "Per-source status of the latest run", body = Vec<AdapterStatus>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "No data yet", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn sources(
    State(state): State<AppState>,
    client: ApiClient,
) -> ApiResult<Json<Vec<AdapterStatus>>> {
    client.require(Permission::ViewReentries)?;
    Ok(Json(latest(&state).await?.sources))
}

#[utoipa::path(
    post,
    path = "/api/reentries/refresh",
    tag = "reentries",
    responses(
        (status = 200, description = "Run completed", body = RefreshResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "Refresh already in progress", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn refresh(
    State(state): State<AppState>,
    client: ApiClient,
) -> ApiResult<Json<RefreshResponse>> {
    client.require(Permission::RefreshReentries)?;

    log::info!("refresh requested by {}", client.name);
    let report = state.try_refresh().await.ok_or(ApiError::Busy)?;
    Ok(Json(RefreshResponse::from(&report)))
}
