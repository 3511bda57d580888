//! # Core Type Definitions
//!
//! This module contains all core types for the Provost academic-records
//! engine:
//! - Identifiers (`StudentId`, `EnrollmentId`, `RequestId`)
//! - Fixed-point measures (`Score`, `Gpa`)
//! - The closed grade enum (`Grade`)
//! - Calendar dates for attendance keys (`ClassDate`)
//! - Record structures (`Student`, `EnrollmentRecord`, `AttendanceEntry`,
//!   `RetakeResitRequest`)
//! - Error types (`ProvostError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Validate their domain at construction, never at use

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub u64);

/// Unique identifier for an enrollment: one student registered in one
/// course offering for one academic term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnrollmentId(pub u64);

/// Unique identifier for a retake/resit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

// =============================================================================
// SCORE (centimarks)
// =============================================================================

/// Maximum valid score: 100.00 marks, stored as centimarks.
pub const MAX_SCORE_CENTI: u16 = 10_000;

/// An exam score in centimarks (hundredths of a mark).
///
/// `Score(3_499)` is 34.99 marks. The valid domain is 0..=10000; anything
/// outside is a caller contract violation and is rejected at construction
/// with [`ProvostError::InvalidScore`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Score(u16);

impl Score {
    /// Create a score from centimarks, validating the 0..=10000 domain.
    pub fn from_centi(centi: u16) -> Result<Self, ProvostError> {
        if centi > MAX_SCORE_CENTI {
            return Err(ProvostError::InvalidScore(centi));
        }
        Ok(Self(centi))
    }

    /// Create a score from whole marks (0..=100).
    pub fn from_marks(marks: u16) -> Result<Self, ProvostError> {
        Self::from_centi(marks.saturating_mul(100))
    }

    /// Get the raw centimark value.
    #[must_use]
    pub const fn centi(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// GPA (hundredths of a grade point)
// =============================================================================

/// A grade-point average in hundredths of a point.
///
/// `Gpa(343)` renders as "3.43". On a 4-point scale the domain is 0..=400,
/// which every aggregation in this crate preserves by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Gpa(pub u32);

impl Gpa {
    /// Zero GPA: the defined result for an empty or zero-credit record set.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the raw value in hundredths of a grade point.
    #[must_use]
    pub const fn hundredths(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Gpa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// =============================================================================
// GRADE
// =============================================================================

/// Letter grade derived from a score.
///
/// This is a closed enum: every stored grade is one of these five values,
/// and the point lookup is total. There is no fallthrough that silently
/// maps an unknown value to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Grade points per credit hour on the 4-point scale.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        }
    }

    /// Whether the grade is a pass (anything above F).
    #[must_use]
    pub const fn is_passing(self) -> bool {
        !matches!(self, Grade::F)
    }

    /// The letter as a string slice.
    #[must_use]
    pub const fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

// =============================================================================
// CLASS DATE
// =============================================================================

/// A calendar date used as half of the attendance composite key
/// `(EnrollmentId, ClassDate)`.
///
/// Ordering is chronological. `packed()` produces a `u32` that preserves
/// that ordering for use as a range-scannable store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl ClassDate {
    /// Create a date, validating month and day ranges.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ProvostError> {
        if month == 0 || month > 12 || day == 0 || day > 31 {
            return Err(ProvostError::InvalidArgument(format!(
                "invalid date {year:04}-{month:02}-{day:02}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Pack into a u32 key that sorts chronologically.
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.year as u32) << 9) | ((self.month as u32) << 5) | (self.day as u32)
    }

    /// Reverse of [`ClassDate::packed`].
    #[must_use]
    pub const fn unpack(key: u32) -> Self {
        Self {
            year: (key >> 9) as u16,
            month: ((key >> 5) & 0x0F) as u8,
            day: (key & 0x1F) as u8,
        }
    }
}

impl FromStr for ClassDate {
    type Err = ProvostError;

    /// Parse "YYYY-MM-DD".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => {
                return Err(ProvostError::InvalidArgument(format!(
                    "expected YYYY-MM-DD, got '{s}'"
                )));
            }
        };
        let year = y
            .parse::<u16>()
            .map_err(|_| ProvostError::InvalidArgument(format!("invalid year in '{s}'")))?;
        let month = m
            .parse::<u8>()
            .map_err(|_| ProvostError::InvalidArgument(format!("invalid month in '{s}'")))?;
        let day = d
            .parse::<u8>()
            .map_err(|_| ProvostError::InvalidArgument(format!("invalid day in '{s}'")))?;
        Self::new(year, month, day)
    }
}

impl std::fmt::Display for ClassDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

// =============================================================================
// STUDENT
// =============================================================================

/// Minimal student registry entry.
///
/// The engine is not a student-records CRUD system; this exists so that
/// lookups against an unknown student can fail with `StudentNotFound`
/// instead of silently returning an empty record set, and so department
/// listings can show a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub full_name: String,
    pub reg_no: String,
}

// =============================================================================
// ENROLLMENT
// =============================================================================

/// A student's registration in one course offering for one academic term.
///
/// Created when the student enrolls, mutated when a grade is recorded,
/// never deleted. `department` is the owning lecturer's department,
/// denormalized onto the enrollment so request listings can be scoped
/// without a join chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub student: StudentId,
    pub course_code: String,
    pub course_name: String,
    /// Credit hours for the course; positive.
    pub credit_hours: u32,
    /// Academic year of the offering.
    pub year: u16,
    /// Semester within the year.
    pub semester: u8,
    pub department: String,
    /// Raw score, absent until graded.
    pub score: Option<Score>,
    /// Letter grade derived from the score at recording time.
    pub grade: Option<Grade>,
}

/// Input for creating an enrollment. The store assigns the id and the
/// record starts ungraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnrollment {
    pub student: StudentId,
    pub course_code: String,
    pub course_name: String,
    pub credit_hours: u32,
    pub year: u16,
    pub semester: u8,
    pub department: String,
}

// =============================================================================
// ATTENDANCE
// =============================================================================

/// Status of one attendance mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One attendance mark: a (date, status, duration) tuple under an
/// enrollment. At most one entry exists per (enrollment, date); a later
/// mark for the same date overwrites this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub date: ClassDate,
    pub status: AttendanceStatus,
    /// Contact hours covered by this mark.
    pub duration: u32,
}

// =============================================================================
// RETAKE / RESIT REQUESTS
// =============================================================================

/// Remediation path for a failing score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    /// Narrow near-pass band: score in [35.00, 39.00].
    Retake,
    /// Score below 35.00.
    Resit,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::Retake => f.write_str("retake"),
            FailureClass::Resit => f.write_str("resit"),
        }
    }
}

/// Lifecycle state of a retake/resit request.
///
/// `Pending` is the only non-terminal state; both decisions are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether a decision may still be taken from this state.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => f.write_str("pending"),
            RequestStatus::Approved => f.write_str("approved"),
            RequestStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// Terminal outcome of deciding a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// The status a request ends in after this decision.
    #[must_use]
    pub const fn into_status(self) -> RequestStatus {
        match self {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// A retake/resit application tied to one enrollment.
///
/// One enrollment may accumulate several requests over time (reapplication
/// after rejection); there is no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetakeResitRequest {
    pub id: RequestId,
    pub enrollment: EnrollmentId,
    pub class: FailureClass,
    pub reason: String,
    pub status: RequestStatus,
    /// Unix seconds at creation, supplied by the caller; the core keeps no
    /// clock of its own.
    pub requested_at_unix: u64,
}

/// A request joined with its student/course display fields, as returned by
/// the per-student and per-department listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestView {
    pub id: RequestId,
    pub enrollment: EnrollmentId,
    pub class: FailureClass,
    pub reason: String,
    pub status: RequestStatus,
    pub requested_at_unix: u64,
    pub course_code: String,
    pub course_name: String,
    pub full_name: String,
    pub reg_no: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Provost engine.
///
/// - No silent failures
/// - Use `Result<T, ProvostError>` for fallible operations
/// - The engine never panics; all errors are reported to the caller
#[derive(Debug, Error)]
pub enum ProvostError {
    /// A score outside the 0..=100.00 domain (value in centimarks).
    #[error("Invalid score: {0} centimarks (valid range 0..=10000)")]
    InvalidScore(u16),

    /// A required field is missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The score has no retake/resit path (passing, or not yet graded).
    #[error("Not eligible for remediation")]
    IneligibleForRemediation,

    /// The requested student does not exist.
    #[error("Student not found: {0:?}")]
    StudentNotFound(StudentId),

    /// The requested enrollment does not exist.
    #[error("Enrollment not found: {0:?}")]
    EnrollmentNotFound(EnrollmentId),

    /// The requested retake/resit request does not exist.
    #[error("Request not found: {0:?}")]
    RequestNotFound(RequestId),

    /// An attempt to decide a request that is no longer pending.
    #[error("Invalid transition: request {0:?} is not pending")]
    InvalidTransition(RequestId),

    /// The backing store failed; surfaced as-is, never retried here.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// TESTS
// =============================================================================
