// Company Catalog - REST API
// Router and handlers; bin/server.rs only wires config, store and listener.

use crate::company::Company;
use crate::error::{ErrorKind, ServiceError};
use crate::report::BatchReport;
use crate::service::CompanyService;
use crate::source::SourceKey;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Multipart form field carrying the client-update CSV
pub const MERGE_FIELD: &str = "csv";

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CompanyService>,
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: String, kind: Option<ErrorKind>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: String,
    pub zip: Option<String>,
}

// ============================================================================
// Error mapping
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    NotFound(String),
    BadRequest(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamReadFailed | ErrorKind::UpstreamWriteFailed | ErrorKind::InternalPattern => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Service(err) => {
                let kind = err.kind();
                let status = status_for(kind);
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", err.detailed());
                }
                (status, ApiResponse::failure(err.to_string(), Some(kind)))
            }
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiResponse::failure(message, Some(ErrorKind::NotFound)),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ApiResponse::failure(message, None)),
        };

        (status, Json(body)).into_response()
    }
}

fn found(company: Option<Company>, what: String) -> Result<Json<ApiResponse<Company>>, ApiError> {
    company
        .map(|c| Json(ApiResponse::ok(c)))
        .ok_or_else(|| ApiError::NotFound(format!("no company matching {}", what)))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /v1/companies - List all companies
async fn list_companies(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Company>>>, ApiError> {
    let companies = state.service.get_companies()?;
    Ok(Json(ApiResponse::ok(companies)))
}

/// POST /v1/companies - Create one company
async fn create_company(
    State(state): State<AppState>,
    Json(mut company): Json<Company>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.create_company(&mut company)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(company))))
}

/// PUT /v1/companies - Update an existing company (matched by name)
async fn update_company(
    State(state): State<AppState>,
    Json(mut company): Json<Company>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    state.service.update_company(&mut company)?;
    Ok(Json(ApiResponse::ok(company)))
}

/// GET /v1/companies/search?name={name}&zip={zip}
async fn search_companies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    match params.zip {
        Some(zip) => {
            let company = state.service.find_by_name_and_zip(&params.name, &zip)?;
            found(company, format!("name '{}' and zip '{}'", params.name, zip))
        }
        None => {
            let company = state.service.find_by_name(&params.name)?;
            found(company, format!("name '{}'", params.name))
        }
    }
}

/// GET /v1/companies/:name - Find one company by exact name
async fn find_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Company>>, ApiError> {
    let company = state.service.find_by_name(&name)?;
    found(company, format!("name '{}'", name))
}

/// POST /v1/companies/merge-all-companies - multipart upload, field "csv"
async fn merge_companies(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(MERGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or(MERGE_FIELD).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed reading upload: {}", e)))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest(format!("missing '{}' file field", MERGE_FIELD)))?;

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("empty file".to_string()));
    }

    let key = SourceKey::Upload {
        filename,
        bytes: bytes.to_vec(),
    };
    let report = state.service.merge_from_feed(&key)?;
    Ok(Json(ApiResponse::ok(report)))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(service: CompanyService) -> Router {
    let state = AppState {
        service: Arc::new(service),
    };

    let api_routes: Router<AppState> = Router::new().route("/health", get(health_check));

    let v1_routes: Router<AppState> = Router::new()
        .route(
            "/companies",
            get(list_companies).post(create_company).put(update_company),
        )
        .route("/companies/search", get(search_companies))
        .route(
            "/companies/merge-all-companies",
            post(merge_companies).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/companies/:name", get(find_by_name));

    Router::new()
        .nest("/api", api_routes)
        .nest("/v1", v1_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::ValidationFailed), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::UpstreamReadFailed), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::UpstreamWriteFailed), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorKind::InternalPattern), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
