//! # provost-core
//!
//! The deterministic academic-records engine for Provost - THE LOGIC.
//!
//! This crate implements the degree-progression core: grade scale, GPA
//! aggregation, honours classification, attendance eligibility, and the
//! retake/resit request lifecycle, over an in-memory or redb-backed
//! record store.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the ONLY place where academic rules exist; callers never
//!   reimplement a threshold
//! - Uses integer arithmetic exclusively: scores are centimarks, GPA is
//!   hundredths of a grade point, percentages are whole integers
//! - Keeps no clock; timestamps are supplied by the caller
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod attendance;
pub mod gpa;
pub mod lifecycle;
pub mod policy;
pub mod progression;
pub mod registrar;
pub mod scale;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AttendanceEntry, AttendanceStatus, ClassDate, Decision, EnrollmentId, EnrollmentRecord,
    FailureClass, Gpa, Grade, NewEnrollment, ProvostError, RequestId, RequestStatus, RequestView,
    RetakeResitRequest, Score, Student, StudentId,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use attendance::{AttendanceRule, AttendanceSummary};
pub use gpa::{TermGpa, cumulative_gpa, gpa_history, semester_gpa};
pub use policy::AcademicPolicy;
pub use progression::{Classification, DegreeClassifier, DegreeProgression};
pub use registrar::{Registrar, StoreBackend};
pub use scale::GradeScale;
pub use store::{MemoryStore, RecordStore, redb::RedbStore};
