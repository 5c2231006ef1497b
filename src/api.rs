// 🌐 HTTP API - dashboard queries over a loaded table
//
// GET /api/health
// GET /api/options
// GET /api/dashboard?from=&to=&categories=a,b&sources=x,y
//
// The table is immutable after load, so handlers share it without locking.

use crate::adapter::QueryInput;
use crate::config::FilterConfig;
use crate::dashboard::{self, Dashboard, DashboardSettings};
use crate::error::FilterError;
use crate::store::RecordTable;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RecordTable>,
    pub settings: Arc<DashboardSettings>,
    pub filter: Arc<FilterConfig>,
}

impl AppState {
    pub fn new(table: RecordTable, settings: DashboardSettings, filter: FilterConfig) -> Self {
        Self {
            table: Arc::new(table),
            settings: Arc::new(settings),
            filter: Arc::new(filter),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Selectable values for the query controls
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    article_count: usize,
    categories: Vec<String>,
    sources: Vec<String>,
    first_day: Option<NaiveDate>,
    last_day: Option<NaiveDate>,
}

/// Query string of /api/dashboard; list parameters are comma-separated
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    from: Option<String>,
    to: Option<String>,
    categories: Option<String>,
    sources: Option<String>,
}

impl DashboardParams {
    /// `to` alone is rejected rather than read as a single day
    fn into_query(self, all_sentinel: &str) -> Result<QueryInput, FilterError> {
        let dates = match (self.from, self.to) {
            (None, Some(end)) => return Err(FilterError::EndWithoutStart { end }),
            (from, to) => from.into_iter().chain(to).collect(),
        };

        Ok(QueryInput {
            dates,
            categories: split_list(self.categories, all_sentinel),
            sources: split_list(self.sources, all_sentinel),
        })
    }
}

fn split_list(raw: Option<String>, all_sentinel: &str) -> Vec<String> {
    match raw {
        Some(raw) => raw.split(',').map(|v| v.trim().to_string()).collect(),
        None => vec![all_sentinel.to_string()],
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/options - Categories, sources and date span of the table
async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    let span = state.table.date_span();

    Json(ApiResponse::ok(OptionsResponse {
        article_count: state.table.len(),
        categories: state.table.categories().to_vec(),
        sources: state.table.sources().to_vec(),
        first_day: span.map(|(start, _)| start),
        last_day: span.map(|(_, end)| end),
    }))
}

/// GET /api/dashboard - Every panel for one query
async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> impl IntoResponse {
    let spec = params
        .into_query(&state.filter.all_sentinel)
        .and_then(|input| input.to_filter_spec_for(&state.table, &state.filter.sentinels()));

    match spec {
        Ok(spec) => {
            let dashboard = dashboard::build(&state.table, &spec, &state.settings);
            (StatusCode::OK, Json(ApiResponse::ok(dashboard))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "rejected dashboard query");
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Dashboard>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/options", get(get_options))
        .route("/dashboard", get(get_dashboard))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
