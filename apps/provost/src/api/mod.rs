//! # Provost HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check
//! - `POST /students` - Register a student
//! - `POST /enrollments` - Enroll a student in a course
//! - `POST /grades` - Record marks for an enrollment
//! - `POST /attendance` - Mark attendance for one class date
//! - `POST /requests` - Apply for a retake/resit
//! - `POST /requests/{id}/decide` - Approve or reject a pending request
//! - `GET  /students/{id}/gpa` - Cumulative GPA, or semester GPA with `?year=&semester=`
//! - `GET  /students/{id}/gpa-history` - Per-term GPA, ascending
//! - `GET  /students/{id}/progression` - Degree classification standing
//! - `GET  /students/{id}/attendance` - Attendance standing per enrolled course
//! - `GET  /students/{id}/requests` - Retake/resit requests, newest first
//! - `GET  /departments/{dept}/requests` - Department request queue, newest first
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `PROVOST_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `PROVOST_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `PROVOST_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `provost::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    apply_handler, attendance_list_handler, create_student_handler, decide_handler,
    department_requests_handler, enroll_handler, gpa_handler, gpa_history_handler, health_handler,
    mark_attendance_handler, progression_handler, record_grade_handler, student_requests_handler,
};
pub use types::score_from_marks;
#[allow(unused_imports)]
pub use types::{
    ApplyRequest, AttendanceListResponse, AttendanceMarkRequest, AttendanceResponse,
    CreateStudentRequest, DecideBody, EnrollRequest, EnrollmentResponse, GpaHistoryResponse,
    GpaResponse, HealthResponse, ProgressionResponse, RecordGradeRequest, RequestListResponse,
    RequestResponse, StudentResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use provost_core::{ProvostError, Registrar};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the registrar.
#[derive(Clone)]
pub struct AppState {
    /// The registrar holding the record store and academic policy.
    pub registrar: Arc<RwLock<Registrar>>,
}

impl AppState {
    /// Create new app state with a registrar.
    #[must_use]
    pub fn new(registrar: Registrar) -> Self {
        Self {
            registrar: Arc::new(RwLock::new(registrar)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `PROVOST_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
///
/// # Security Note
///
/// The default is restrictive (localhost only). Set `PROVOST_CORS_ORIGINS=*`
/// explicitly only for development or if you understand the security implications.
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("PROVOST_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            // Explicit wildcard - warn about security implications
            tracing::warn!(
                "CORS: Allowing ALL origins (PROVOST_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            // Parse comma-separated origins
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in PROVOST_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            // No configuration - default to localhost only (restrictive)
            tracing::info!("CORS: No PROVOST_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit - caps request payloads
/// 4. Rate Limiting - protects against DoS (if enabled)
/// 5. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Check if authentication is enabled
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set PROVOST_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/students", post(handlers::create_student_handler))
        .route("/enrollments", post(handlers::enroll_handler))
        .route("/grades", post(handlers::record_grade_handler))
        .route("/attendance", post(handlers::mark_attendance_handler))
        .route("/requests", post(handlers::apply_handler))
        .route("/requests/{id}/decide", post(handlers::decide_handler))
        .route("/students/{id}/gpa", get(handlers::gpa_handler))
        .route(
            "/students/{id}/gpa-history",
            get(handlers::gpa_history_handler),
        )
        .route(
            "/students/{id}/progression",
            get(handlers::progression_handler),
        )
        .route(
            "/students/{id}/attendance",
            get(handlers::attendance_list_handler),
        )
        .route(
            "/students/{id}/requests",
            get(handlers::student_requests_handler),
        )
        .route(
            "/departments/{dept}/requests",
            get(handlers::department_requests_handler),
        );

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply body limit, CORS, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, registrar: Registrar) -> Result<(), ProvostError> {
    let state = AppState::new(registrar);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ProvostError::StoreUnavailable(format!("Bind failed: {}", e)))?;

    tracing::info!("Provost HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ProvostError::StoreUnavailable(format!("Server error: {}", e)))
}
