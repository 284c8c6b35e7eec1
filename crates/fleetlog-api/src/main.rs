//! fleetlog-api - HTTP API server for fleetlog
//!
//! Thin axum surface over the extraction pipeline and the persistence layer:
//! PDF upload + extraction, operations batch CRUD, and health checks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use fleetlog_core::{
    defaults, media, validate, AircraftRepository, ChatBackend, Error, OperationsRepository,
    SaveOperationsRequest,
};
use fleetlog_db::{Database, PoolMetrics};
use fleetlog_extract::{extract_aircraft_from_pdf, ExtractOptions};
use fleetlog_inference::OpenRouterBackend;

const SERVICE_NAME: &str = "Aircraft Utilization Data Extractor";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Arc<Database>,
    backend: Arc<dyn ChatBackend>,
}

/// Error wrapper mapping domain errors to HTTP responses.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) | Error::Rasterize(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) | Error::RecordNotFound(_) => StatusCode::NOT_FOUND,
            Error::ExtractionFailed { .. } | Error::Inference(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = Json(json!({ "success": false, "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

// =============================================================================
// HEALTH
// =============================================================================

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "online",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = state.db.ping().await.is_ok();
    let pool = PoolMetrics::capture(state.db.pool());
    Json(json!({
        "status": if db_ok { "healthy" } else { "degraded" },
        "timestamp": Utc::now().to_rfc3339(),
        "database": if db_ok { "connected" } else { "disconnected" },
        "pool": pool,
    }))
}

// =============================================================================
// AIRCRAFT EXTRACTION
// =============================================================================

async fn extract_aircraft(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut filename = None;
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidInput(format!("Failed to read upload: {}", e)))?,
            );
        }
    }

    let filename =
        filename.ok_or_else(|| Error::InvalidInput("Missing file upload".to_string()))?;
    let data = data.ok_or_else(|| Error::InvalidInput("Missing file upload".to_string()))?;

    // Rejected before any processing: extension first, then magic bytes.
    if !media::is_pdf(&filename) {
        return Err(Error::InvalidInput("Only PDF files are supported.".to_string()).into());
    }
    media::check_declared_type(&filename, &data)?;

    info!(
        subsystem = "api",
        op = "extract",
        file_name = %filename,
        bytes = data.len(),
        "Received aircraft utilization report"
    );

    let extracted = extract_aircraft_from_pdf(
        state.backend.as_ref(),
        &data,
        defaults::DEFAULT_EXTRACT_DPI,
        ExtractOptions::default(),
    )
    .await?;

    // Advisory validation: attached as metadata, never blocking.
    let report = validate::validate_aircraft_utilization(&extracted);
    if !report.is_valid {
        warn!(
            subsystem = "api",
            op = "extract",
            file_name = %filename,
            warning_count = report.warnings.len(),
            "Extracted record has validation warnings"
        );
    }

    let outcome = state.db.aircraft.store(&extracted).await?;
    if !outcome.is_new {
        info!(
            subsystem = "api",
            op = "extract",
            record_id = %outcome.id,
            "Duplicate report, returning existing record"
        );
    }

    Ok(Json(json!({
        "success": true,
        "message": "Data extracted successfully",
        "filename": filename,
        "extracted_data": extracted,
        "validation": {
            "is_valid": report.is_valid,
            "warnings": report.warnings,
        },
        "record": {
            "id": outcome.id,
            "duplicate": !outcome.is_new,
        },
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

// =============================================================================
// OPERATIONS DATA
// =============================================================================

#[derive(Debug, Serialize)]
struct SaveOperationsResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

async fn save_operations_data(
    State(state): State<AppState>,
    Json(request): Json<SaveOperationsRequest>,
) -> Result<Json<SaveOperationsResponse>, ApiError> {
    info!(
        subsystem = "api",
        op = "save_operations",
        month = %request.month,
        lessee_count = request.lessees.len(),
        "Received operations batch"
    );

    // Whole-batch pre-check: an already-loaded month blocks the save.
    if state.db.operations.month_exists(&request.month).await? {
        warn!(
            subsystem = "api",
            op = "save_operations",
            month = %request.month,
            "Month already loaded, rejecting batch"
        );
        return Ok(Json(SaveOperationsResponse {
            success: false,
            message: format!(
                "Data for month {} already exists. Please delete existing data first or use a different month.",
                request.month
            ),
            data: None,
            errors: None,
        }));
    }

    let outcome = state.db.operations.save(&request).await?;
    let counts = json!({
        "saved_lessees": outcome.saved_lessees,
        "saved_assets": outcome.saved_assets,
        "saved_components": outcome.saved_components,
        "month": request.month,
        "file_name": request.file_name,
        "saved_at": Utc::now().to_rfc3339(),
    });

    if outcome.errors.is_empty() {
        Ok(Json(SaveOperationsResponse {
            success: true,
            message: "Data saved successfully".to_string(),
            data: Some(counts),
            errors: None,
        }))
    } else {
        Ok(Json(SaveOperationsResponse {
            success: false,
            message: "Some errors occurred during save".to_string(),
            data: Some(counts),
            errors: Some(outcome.errors),
        }))
    }
}

async fn get_operations_data(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let data = state.db.operations.list_by_month(&month).await?;
    let count = data.len();
    Ok(Json(json!({
        "success": !data.is_empty(),
        "data": data,
        "month": month,
        "count": count,
    })))
}

async fn get_all_operations_data(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let data = state.db.operations.list_all().await?;
    let count = data.len();
    Ok(Json(json!({
        "success": true,
        "data": data,
        "count": count,
    })))
}

async fn delete_operations_data(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.db.operations.delete_by_month(&month).await?;
    if !deleted {
        return Err(Error::NotFound(format!("No data found for month: {}", month)).into());
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("Data for month {} deleted successfully", month),
        "month": month,
    })))
}

// =============================================================================
// BOOTSTRAP
// =============================================================================

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/extract", post(extract_aircraft))
        .route("/api/save-operations-data", post(save_operations_data))
        .route("/api/operations-data", get(get_all_operations_data))
        .route(
            "/api/operations-data/:month",
            get(get_operations_data).delete(delete_operations_data),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fleetlog_api=debug,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let database_url = std::env::var(defaults::ENV_DATABASE_URL)
        .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    let backend = OpenRouterBackend::from_env()?;
    let state = AppState {
        db: Arc::new(db),
        backend: Arc::new(backend),
    };

    let app = build_router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
