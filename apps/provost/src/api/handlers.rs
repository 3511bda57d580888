//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Writes take the registrar write lock; reads share the read lock. Every
//! engine error maps to a status code through [`status_for`] so the same
//! failure always produces the same HTTP response.

use super::{
    AppState,
    types::{
        self, ApplyRequest, AttendanceListResponse, AttendanceMarkRequest, AttendanceResponse,
        CourseAttendanceJson, CreateStudentRequest, DecideBody, EnrollRequest, EnrollmentResponse,
        GpaHistoryResponse, GpaQuery, GpaResponse, HealthResponse, ProgressionResponse,
        RecordGradeRequest, RequestListResponse, RequestResponse, StudentResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use provost_core::{EnrollmentId, NewEnrollment, ProvostError, RequestId, StudentId};
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Map an engine error to its HTTP status code.
fn status_for(err: &ProvostError) -> StatusCode {
    match err {
        ProvostError::StudentNotFound(_)
        | ProvostError::EnrollmentNotFound(_)
        | ProvostError::RequestNotFound(_) => StatusCode::NOT_FOUND,
        ProvostError::InvalidTransition(_) => StatusCode::CONFLICT,
        ProvostError::InvalidScore(_)
        | ProvostError::InvalidArgument(_)
        | ProvostError::IneligibleForRemediation => StatusCode::BAD_REQUEST,
        ProvostError::StoreUnavailable(_) | ProvostError::SerializationError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Unix seconds from the system clock. The engine never reads a clock;
/// request timestamps are stamped here at the HTTP boundary.
fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STUDENT HANDLERS
// =============================================================================

/// Register a student.
pub async fn create_student_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentRequest>,
) -> impl IntoResponse {
    let mut registrar = state.registrar.write().await;
    match registrar.add_student(request.full_name, request.reg_no) {
        Ok(student) => (StatusCode::OK, Json(StudentResponse::success(student))),
        Err(e) => (status_for(&e), Json(StudentResponse::error(e.to_string()))),
    }
}

// =============================================================================
// ENROLLMENT HANDLERS
// =============================================================================

/// Enroll a student in a course offering.
pub async fn enroll_handler(
    State(state): State<AppState>,
    Json(request): Json<EnrollRequest>,
) -> impl IntoResponse {
    let new = NewEnrollment {
        student: StudentId(request.student_id),
        course_code: request.course_code,
        course_name: request.course_name,
        credit_hours: request.credit_hours,
        year: request.year,
        semester: request.semester,
        department: request.department,
    };

    let mut registrar = state.registrar.write().await;
    match registrar.enroll(new) {
        Ok(enrollment) => (
            StatusCode::OK,
            Json(EnrollmentResponse::success(enrollment)),
        ),
        Err(e) => (
            status_for(&e),
            Json(EnrollmentResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// GRADE HANDLER
// =============================================================================

/// Record marks for an enrollment. The letter grade is derived by the
/// engine's grade scale, never taken from the caller.
pub async fn record_grade_handler(
    State(state): State<AppState>,
    Json(request): Json<RecordGradeRequest>,
) -> impl IntoResponse {
    let score = match types::score_from_marks(request.marks) {
        Ok(s) => s,
        Err(e) => {
            return (
                status_for(&e),
                Json(EnrollmentResponse::error(e.to_string())),
            );
        }
    };

    let mut registrar = state.registrar.write().await;
    match registrar.record_grade(EnrollmentId(request.enrollment_id), score) {
        Ok(enrollment) => (
            StatusCode::OK,
            Json(EnrollmentResponse::success(enrollment)),
        ),
        Err(e) => (
            status_for(&e),
            Json(EnrollmentResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// ATTENDANCE HANDLERS
// =============================================================================

/// Mark attendance for one class date. Re-marking the same date
/// overwrites the earlier entry; the response carries the updated
/// eligibility standing.
pub async fn mark_attendance_handler(
    State(state): State<AppState>,
    Json(request): Json<AttendanceMarkRequest>,
) -> impl IntoResponse {
    let entry = match request.to_entry() {
        Ok(e) => e,
        Err(e) => {
            return (
                status_for(&e),
                Json(AttendanceResponse::error(e.to_string())),
            );
        }
    };

    let mut registrar = state.registrar.write().await;
    match registrar.mark_attendance(EnrollmentId(request.enrollment_id), entry) {
        Ok(summary) => (StatusCode::OK, Json(AttendanceResponse::success(summary))),
        Err(e) => (
            status_for(&e),
            Json(AttendanceResponse::error(e.to_string())),
        ),
    }
}

/// Attendance standing for every course a student is enrolled in.
pub async fn attendance_list_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;

    let enrollments = match registrar.enrollments(StudentId(id)) {
        Ok(list) => list,
        Err(e) => {
            return (
                status_for(&e),
                Json(AttendanceListResponse::error(e.to_string())),
            );
        }
    };

    let mut courses = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        match registrar.attendance_summary(enrollment.id) {
            Ok(summary) => courses.push(CourseAttendanceJson {
                enrollment_id: enrollment.id.0,
                course_code: enrollment.course_code,
                summary: summary.into(),
            }),
            Err(e) => {
                return (
                    status_for(&e),
                    Json(AttendanceListResponse::error(e.to_string())),
                );
            }
        }
    }

    (StatusCode::OK, Json(AttendanceListResponse::success(courses)))
}

// =============================================================================
// GPA AND PROGRESSION HANDLERS
// =============================================================================

/// GPA for a student. With `?year=&semester=` the scope is that term;
/// without query parameters the scope is cumulative. Supplying only one
/// of the pair is an error.
pub async fn gpa_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<GpaQuery>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;
    let student = StudentId(id);

    match (query.year, query.semester) {
        (Some(year), Some(semester)) => {
            match registrar.semester_gpa(student, year, semester) {
                Ok(gpa) => (StatusCode::OK, Json(GpaResponse::semester(gpa))),
                Err(e) => (status_for(&e), Json(GpaResponse::error(e.to_string()))),
            }
        }
        (None, None) => match registrar.cumulative_gpa(student) {
            Ok((gpa, credits)) => (StatusCode::OK, Json(GpaResponse::cumulative(gpa, credits))),
            Err(e) => (status_for(&e), Json(GpaResponse::error(e.to_string()))),
        },
        _ => (
            StatusCode::BAD_REQUEST,
            Json(GpaResponse::error(
                "year and semester must be supplied together",
            )),
        ),
    }
}

/// Per-term GPA history, ascending by (year, semester).
pub async fn gpa_history_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;
    match registrar.gpa_history(StudentId(id)) {
        Ok(terms) => (StatusCode::OK, Json(GpaHistoryResponse::success(terms))),
        Err(e) => (
            status_for(&e),
            Json(GpaHistoryResponse::error(e.to_string())),
        ),
    }
}

/// Degree progression standing: cumulative GPA, earned credits,
/// classification.
pub async fn progression_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;
    match registrar.degree_progression(StudentId(id)) {
        Ok(progression) => (
            StatusCode::OK,
            Json(ProgressionResponse::success(progression)),
        ),
        Err(e) => (
            status_for(&e),
            Json(ProgressionResponse::error(e.to_string())),
        ),
    }
}

// =============================================================================
// RETAKE/RESIT REQUEST HANDLERS
// =============================================================================

/// Apply for a retake or resit. The failure class is derived from the
/// recorded score; passing or ungraded enrollments are rejected.
pub async fn apply_handler(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> impl IntoResponse {
    let mut registrar = state.registrar.write().await;
    match registrar.apply_for_remediation(
        EnrollmentId(request.enrollment_id),
        &request.reason,
        now_unix(),
    ) {
        Ok(created) => (StatusCode::OK, Json(RequestResponse::success(created))),
        Err(e) => (status_for(&e), Json(RequestResponse::error(e.to_string()))),
    }
}

/// Decide a pending request. Deciding twice returns 409; the first
/// decision stands.
pub async fn decide_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<DecideBody>,
) -> impl IntoResponse {
    let mut registrar = state.registrar.write().await;
    match registrar.decide_request(RequestId(id), body.decision) {
        Ok(decided) => (StatusCode::OK, Json(RequestResponse::success(decided))),
        Err(e) => (status_for(&e), Json(RequestResponse::error(e.to_string()))),
    }
}

/// Requests filed by one student, newest first.
pub async fn student_requests_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;
    match registrar.requests_for_student(StudentId(id)) {
        Ok(views) => (StatusCode::OK, Json(RequestListResponse::success(views))),
        Err(e) => (
            status_for(&e),
            Json(RequestListResponse::error(e.to_string())),
        ),
    }
}

/// Requests against one department's courses, newest first.
pub async fn department_requests_handler(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> impl IntoResponse {
    let registrar = state.registrar.read().await;
    match registrar.requests_for_department(&dept) {
        Ok(views) => (StatusCode::OK, Json(RequestListResponse::success(views))),
        Err(e) => (
            status_for(&e),
            Json(RequestListResponse::error(e.to_string())),
        ),
    }
}
