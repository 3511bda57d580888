//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Scores cross this boundary as decimal marks (for example `34.99`) and
//! are converted to the engine's integer centimarks here; GPA values leave
//! as fixed-point strings (`"3.43"`). This is the only place in the
//! workspace where floating point is touched.

use provost_core::{
    AttendanceEntry, AttendanceStatus, AttendanceSummary, ClassDate, Decision, EnrollmentRecord,
    ProvostError, RequestView, RetakeResitRequest, Score, Student, TermGpa,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SCORE CONVERSION
// =============================================================================

/// Convert decimal marks from JSON into centimarks.
///
/// Rejects non-finite values and anything outside [0, 100]. Rounding to
/// the nearest centimark means `34.99` and `34.990000001` agree, which is
/// as much precision as an exam mark carries.
#[allow(clippy::float_arithmetic, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_from_marks(marks: f64) -> Result<Score, ProvostError> {
    if !marks.is_finite() || !(0.0..=100.0).contains(&marks) {
        return Err(ProvostError::InvalidArgument(format!(
            "marks must be within 0..=100, got {marks}"
        )));
    }
    let centi = (marks * 100.0).round() as u16;
    Score::from_centi(centi)
}

// =============================================================================
// STUDENTS
// =============================================================================

/// Student registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub full_name: String,
    pub reg_no: String,
}

/// Student JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentJson {
    pub id: u64,
    pub full_name: String,
    pub reg_no: String,
}

impl From<Student> for StudentJson {
    fn from(s: Student) -> Self {
        Self {
            id: s.id.0,
            full_name: s.full_name,
            reg_no: s.reg_no,
        }
    }
}

/// Student registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub success: bool,
    pub student: Option<StudentJson>,
    pub error: Option<String>,
}

impl StudentResponse {
    pub fn success(student: Student) -> Self {
        Self {
            success: true,
            student: Some(student.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            student: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ENROLLMENTS
// =============================================================================

/// Enrollment creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub student_id: u64,
    pub course_code: String,
    pub course_name: String,
    pub credit_hours: u32,
    pub year: u16,
    pub semester: u8,
    pub department: String,
}

/// Enrollment JSON representation. Score and grade are absent until a
/// grade is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentJson {
    pub id: u64,
    pub student_id: u64,
    pub course_code: String,
    pub course_name: String,
    pub credit_hours: u32,
    pub year: u16,
    pub semester: u8,
    pub department: String,
    pub score: Option<String>,
    pub grade: Option<String>,
}

impl From<EnrollmentRecord> for EnrollmentJson {
    fn from(e: EnrollmentRecord) -> Self {
        Self {
            id: e.id.0,
            student_id: e.student.0,
            course_code: e.course_code,
            course_name: e.course_name,
            credit_hours: e.credit_hours,
            year: e.year,
            semester: e.semester,
            department: e.department,
            score: e.score.map(|s| s.to_string()),
            grade: e.grade.map(|g| g.letter().to_string()),
        }
    }
}

/// Enrollment response (also returned by grade recording).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub success: bool,
    pub enrollment: Option<EnrollmentJson>,
    pub error: Option<String>,
}

impl EnrollmentResponse {
    pub fn success(enrollment: EnrollmentRecord) -> Self {
        Self {
            success: true,
            enrollment: Some(enrollment.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            enrollment: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// GRADES
// =============================================================================

/// Grade recording request. The letter grade is derived server-side;
/// callers submit marks only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordGradeRequest {
    pub enrollment_id: u64,
    /// Decimal marks, 0..=100.
    pub marks: f64,
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// Attendance mark request. Re-submitting the same date overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceMarkRequest {
    pub enrollment_id: u64,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "present" or "absent"
    pub status: String,
    /// Contact hours covered by this mark.
    pub duration: u32,
}

impl AttendanceMarkRequest {
    /// Convert to an engine attendance entry, validating date and status.
    pub fn to_entry(&self) -> Result<AttendanceEntry, ProvostError> {
        let date: ClassDate = self.date.parse()?;
        let status = match self.status.as_str() {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            other => {
                return Err(ProvostError::InvalidArgument(format!(
                    "status must be 'present' or 'absent', got '{other}'"
                )));
            }
        };
        Ok(AttendanceEntry {
            date,
            status,
            duration: self.duration,
        })
    }
}

/// Attendance summary JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSummaryJson {
    pub attended_hours: u32,
    pub expected_hours: u32,
    pub percent: u32,
    pub eligible: bool,
}

impl From<AttendanceSummary> for AttendanceSummaryJson {
    fn from(s: AttendanceSummary) -> Self {
        Self {
            attended_hours: s.attended_hours,
            expected_hours: s.expected_hours,
            percent: s.percent,
            eligible: s.eligible,
        }
    }
}

/// Response to a single attendance mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceResponse {
    pub success: bool,
    pub summary: Option<AttendanceSummaryJson>,
    pub error: Option<String>,
}

impl AttendanceResponse {
    pub fn success(summary: AttendanceSummary) -> Self {
        Self {
            success: true,
            summary: Some(summary.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(msg.into()),
        }
    }
}

/// Per-course attendance standing within a student listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAttendanceJson {
    pub enrollment_id: u64,
    pub course_code: String,
    pub summary: AttendanceSummaryJson,
}

/// Response listing attendance standing per enrolled course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceListResponse {
    pub success: bool,
    pub courses: Vec<CourseAttendanceJson>,
    pub error: Option<String>,
}

impl AttendanceListResponse {
    pub fn success(courses: Vec<CourseAttendanceJson>) -> Self {
        Self {
            success: true,
            courses,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            courses: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// GPA AND PROGRESSION
// =============================================================================

/// Query parameters for `GET /students/{id}/gpa`. Both or neither must be
/// set: a term scope needs the full (year, semester) pair.
#[derive(Debug, Clone, Deserialize)]
pub struct GpaQuery {
    pub year: Option<u16>,
    pub semester: Option<u8>,
}

/// GPA response. `total_credits` is present for the cumulative scope only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpaResponse {
    pub success: bool,
    /// "semester" or "cumulative".
    pub scope: Option<String>,
    /// Fixed-point string, e.g. "3.43".
    pub gpa: Option<String>,
    pub total_credits: Option<u32>,
    pub error: Option<String>,
}

impl GpaResponse {
    pub fn semester(gpa: provost_core::Gpa) -> Self {
        Self {
            success: true,
            scope: Some("semester".to_string()),
            gpa: Some(gpa.to_string()),
            total_credits: None,
            error: None,
        }
    }

    pub fn cumulative(gpa: provost_core::Gpa, total_credits: u32) -> Self {
        Self {
            success: true,
            scope: Some("cumulative".to_string()),
            gpa: Some(gpa.to_string()),
            total_credits: Some(total_credits),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            scope: None,
            gpa: None,
            total_credits: None,
            error: Some(msg.into()),
        }
    }
}

/// One term in a GPA history response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermGpaJson {
    pub year: u16,
    pub semester: u8,
    pub gpa: String,
}

impl From<TermGpa> for TermGpaJson {
    fn from(t: TermGpa) -> Self {
        Self {
            year: t.year,
            semester: t.semester,
            gpa: t.gpa.to_string(),
        }
    }
}

/// GPA history response, terms ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpaHistoryResponse {
    pub success: bool,
    pub terms: Vec<TermGpaJson>,
    pub error: Option<String>,
}

impl GpaHistoryResponse {
    pub fn success(terms: Vec<TermGpa>) -> Self {
        Self {
            success: true,
            terms: terms.into_iter().map(Into::into).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            terms: vec![],
            error: Some(msg.into()),
        }
    }
}

/// Degree progression response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionResponse {
    pub success: bool,
    pub gpa: Option<String>,
    pub total_credits: Option<u32>,
    /// Transcript name, e.g. "Second Class Upper".
    pub classification: Option<String>,
    pub error: Option<String>,
}

impl ProgressionResponse {
    pub fn success(p: provost_core::DegreeProgression) -> Self {
        Self {
            success: true,
            gpa: Some(p.gpa.to_string()),
            total_credits: Some(p.total_credits),
            classification: Some(p.classification.label().to_string()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            gpa: None,
            total_credits: None,
            classification: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// RETAKE/RESIT REQUESTS
// =============================================================================

/// Remediation application request. The failure class is derived from the
/// recorded score; callers supply only the enrollment and a reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub enrollment_id: u64,
    pub reason: String,
}

/// Decision body for `POST /requests/{id}/decide`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideBody {
    pub decision: Decision,
}

/// Request JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestJson {
    pub id: u64,
    pub enrollment_id: u64,
    pub class: String,
    pub reason: String,
    pub status: String,
    pub requested_at_unix: u64,
}

impl From<RetakeResitRequest> for RequestJson {
    fn from(r: RetakeResitRequest) -> Self {
        Self {
            id: r.id.0,
            enrollment_id: r.enrollment.0,
            class: r.class.to_string(),
            reason: r.reason,
            status: r.status.to_string(),
            requested_at_unix: r.requested_at_unix,
        }
    }
}

/// Response to applying for or deciding a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestResponse {
    pub success: bool,
    pub request: Option<RequestJson>,
    pub error: Option<String>,
}

impl RequestResponse {
    pub fn success(request: RetakeResitRequest) -> Self {
        Self {
            success: true,
            request: Some(request.into()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            request: None,
            error: Some(msg.into()),
        }
    }
}

/// A request joined with display fields, as listed per student or
/// department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestViewJson {
    pub id: u64,
    pub enrollment_id: u64,
    pub class: String,
    pub reason: String,
    pub status: String,
    pub requested_at_unix: u64,
    pub course_code: String,
    pub course_name: String,
    pub full_name: String,
    pub reg_no: String,
}

impl From<RequestView> for RequestViewJson {
    fn from(v: RequestView) -> Self {
        Self {
            id: v.id.0,
            enrollment_id: v.enrollment.0,
            class: v.class.to_string(),
            reason: v.reason,
            status: v.status.to_string(),
            requested_at_unix: v.requested_at_unix,
            course_code: v.course_code,
            course_name: v.course_name,
            full_name: v.full_name,
            reg_no: v.reg_no,
        }
    }
}

/// Request listing response, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestListResponse {
    pub success: bool,
    pub requests: Vec<RequestViewJson>,
    pub error: Option<String>,
}

impl RequestListResponse {
    pub fn success(views: Vec<RequestView>) -> Self {
        Self {
            success: true,
            requests: views.into_iter().map(Into::into).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            requests: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
