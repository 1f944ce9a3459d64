// HTTP error mapping
use crate::application::dashboard_service::UnknownModel;
use crate::domain::model::CatalogError;
use crate::domain::usage::RecordError;
use crate::domain::window::WindowError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("data source failed: {0:#}")]
    Upstream(anyhow::Error),
    #[error("failed to encode response")]
    Encoding(StatusCode),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Encoding(status) => *status,
        }
    }
}

// Records arriving in a request body are the caller's fault
impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

// Bodies and query strings that fail to deserialize are rejected as 400
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(window) = e.downcast_ref::<WindowError>() {
            return ApiError::BadRequest(window.to_string());
        }
        if let Some(catalog) = e.downcast_ref::<CatalogError>() {
            return ApiError::BadRequest(catalog.to_string());
        }
        if let Some(unknown) = e.downcast_ref::<UnknownModel>() {
            return ApiError::NotFound(unknown.to_string());
        }
        ApiError::Upstream(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
