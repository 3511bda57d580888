//! # Academic Policy
//!
//! Every institutional threshold the engine applies, gathered into one
//! named configuration value instead of scattered literals: grade band
//! floors, the retake/resit bands, teaching weeks per semester, the
//! attendance eligibility cutoff, and the degree classification floors.
//!
//! `AcademicPolicy::default()` carries the reference constants; a deployment
//! may override any of them (the binary loads a TOML policy file) without a
//! code change.

use serde::{Deserialize, Serialize};

// =============================================================================
// REFERENCE CONSTANTS
// =============================================================================

/// Grade band floors in centimarks: A, B, C, D. Below D is F.
pub const GRADE_FLOOR_A: u16 = 7_000;
pub const GRADE_FLOOR_B: u16 = 6_000;
pub const GRADE_FLOOR_C: u16 = 5_000;
pub const GRADE_FLOOR_D: u16 = 4_000;

/// Retake band bounds in centimarks: [35.00, 39.00] inclusive.
pub const RETAKE_FLOOR: u16 = 3_500;
pub const RETAKE_CEIL: u16 = 3_900;

/// Fixed number of teaching weeks per semester.
pub const TEACHING_WEEKS: u32 = 14;

/// Minimum attendance percentage to sit an exam.
pub const ATTENDANCE_ELIGIBILITY_PERCENT: u32 = 67;

/// Classification floors in GPA hundredths: First, Upper, Lower, Pass.
pub const CLASS_FLOOR_FIRST: u32 = 370;
pub const CLASS_FLOOR_UPPER: u32 = 300;
pub const CLASS_FLOOR_LOWER: u32 = 200;
pub const CLASS_FLOOR_PASS: u32 = 100;

// =============================================================================
// POLICY
// =============================================================================

/// Institutional thresholds applied by the engine.
///
/// All fields are integers in the engine's fixed-point units: centimarks
/// for score thresholds, GPA hundredths for classification floors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPolicy {
    /// Minimum centimarks for an A.
    pub grade_floor_a: u16,
    /// Minimum centimarks for a B.
    pub grade_floor_b: u16,
    /// Minimum centimarks for a C.
    pub grade_floor_c: u16,
    /// Minimum centimarks for a D; below this is F.
    pub grade_floor_d: u16,
    /// Lower bound of the retake band (inclusive), centimarks.
    pub retake_floor: u16,
    /// Upper bound of the retake band (inclusive), centimarks.
    pub retake_ceil: u16,
    /// Teaching weeks per semester; expected contact hours are
    /// `credit_hours * teaching_weeks`.
    pub teaching_weeks: u32,
    /// Attendance percentage at or above which a student is eligible.
    pub attendance_eligibility_percent: u32,
    /// Minimum cumulative GPA (hundredths) for First Class.
    pub class_floor_first: u32,
    /// Minimum cumulative GPA (hundredths) for Second Class Upper.
    pub class_floor_upper: u32,
    /// Minimum cumulative GPA (hundredths) for Second Class Lower.
    pub class_floor_lower: u32,
    /// Minimum cumulative GPA (hundredths) for a Pass.
    pub class_floor_pass: u32,
}

impl Default for AcademicPolicy {
    fn default() -> Self {
        Self {
            grade_floor_a: GRADE_FLOOR_A,
            grade_floor_b: GRADE_FLOOR_B,
            grade_floor_c: GRADE_FLOOR_C,
            grade_floor_d: GRADE_FLOOR_D,
            retake_floor: RETAKE_FLOOR,
            retake_ceil: RETAKE_CEIL,
            teaching_weeks: TEACHING_WEEKS,
            attendance_eligibility_percent: ATTENDANCE_ELIGIBILITY_PERCENT,
            class_floor_first: CLASS_FLOOR_FIRST,
            class_floor_upper: CLASS_FLOOR_UPPER,
            class_floor_lower: CLASS_FLOOR_LOWER,
            class_floor_pass: CLASS_FLOOR_PASS,
        }
    }
}

impl AcademicPolicy {
    /// Policy with custom attendance rules, other thresholds unchanged.
    #[must_use]
    pub fn with_attendance(teaching_weeks: u32, eligibility_percent: u32) -> Self {
        Self {
            teaching_weeks,
            attendance_eligibility_percent: eligibility_percent,
            ..Self::default()
        }
    }

    /// Policy with custom classification floors, other thresholds unchanged.
    #[must_use]
    pub fn with_classification_floors(first: u32, upper: u32, lower: u32, pass: u32) -> Self {
        Self {
            class_floor_first: first,
            class_floor_upper: upper,
            class_floor_lower: lower,
            class_floor_pass: pass,
            ..Self::default()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
