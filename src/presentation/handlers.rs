// HTTP request handlers
use crate::domain::model::{ModelDescriptor, ModelQuery, SortColumn, SortDirection, PAGE_SIZES};
use crate::domain::usage::{Acknowledgement, ModelUsage, UsageEntry, WireModelUsage, WireUsageEntry};
use crate::domain::window::WindowSpec;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub window: Option<String>,
    pub hours: Option<i64>,
}

impl WindowQuery {
    /// Defaults to a one-day window
    pub fn to_spec(&self) -> Result<WindowSpec, ApiError> {
        match self.window.as_deref().unwrap_or("day") {
            "day" => Ok(WindowSpec::Day),
            "week" => Ok(WindowSpec::Week),
            "month" => Ok(WindowSpec::Month),
            "year" => Ok(WindowSpec::Year),
            "custom" => self
                .hours
                .map(|hours| WindowSpec::Custom { hours })
                .ok_or_else(|| ApiError::BadRequest("custom window requires hours".to_string())),
            other => Err(ApiError::BadRequest(format!("unknown window {other:?}"))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListingQuery {
    pub fn to_query(&self) -> Result<ModelQuery, ApiError> {
        Ok(ModelQuery {
            search: self.search.clone().unwrap_or_default(),
            sort_by: self.sort.as_deref().map(SortColumn::parse).transpose()?.unwrap_or_default(),
            direction: self
                .direction
                .as_deref()
                .map(SortDirection::parse)
                .transpose()?
                .unwrap_or_default(),
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(PAGE_SIZES[0]),
        })
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ModelDescriptor>>, ApiError> {
    Ok(Json(state.catalog_service.list_models().await?))
}

pub async fn register_models(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<ModelDescriptor>>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let Json(models) = payload?;
    Ok(Json(state.catalog_service.register_models(models).await?))
}

pub async fn list_usage(State(state): State<Arc<AppState>>) -> Result<Json<Vec<WireModelUsage>>, ApiError> {
    let usage = state.catalog_service.list_model_usage().await?;
    Ok(Json(usage.iter().map(ModelUsage::to_wire).collect()))
}

/// Append usage records; one malformed entry rejects the whole batch
pub async fn append_usage(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<WireUsageEntry>>, JsonRejection>,
) -> Result<Json<Acknowledgement>, ApiError> {
    let Json(entries) = payload?;
    let entries = entries
        .into_iter()
        .map(UsageEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(state.catalog_service.append_usage(entries).await?))
}

pub async fn overview(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let overview = state.dashboard_service.overview().await?;
    json_response(&overview, accepts_brotli(&headers))
        .await
        .map_err(ApiError::Encoding)
}

/// Drill into one model's usage over a named or custom hour window
pub async fn model_analytics(
    Path(model_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let window = query.to_spec()?;
    let analytics = state.dashboard_service.model_analytics(&model_id, window).await?;
    json_response(&analytics, accepts_brotli(&headers))
        .await
        .map_err(ApiError::Encoding)
}

pub async fn list_model_rows(
    query: Result<Query<ListingQuery>, QueryRejection>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let page = state.catalog_service.query_models(&query.to_query()?).await?;
    json_response(&page, accepts_brotli(&headers))
        .await
        .map_err(ApiError::Encoding)
}
