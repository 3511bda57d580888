//! # Grade Scale
//!
//! Pure mappings from score to letter grade and to retake/resit
//! classification, plus the total point lookup. No state beyond the
//! policy thresholds.
//!
//! Band floors are inclusive on the lower bound. The retake band is the
//! narrow near-pass range [35.00, 39.00]; a fractional score strictly
//! between 39.00 and 40.00 has no remediation path, which mirrors the
//! exact comparisons the institution has always applied.

use crate::policy::AcademicPolicy;
use crate::types::{FailureClass, Grade, Score};

/// Score-to-grade and score-to-remediation mapping.
///
/// Constructed from an [`AcademicPolicy`]; all methods are pure.
#[derive(Debug, Clone, Default)]
pub struct GradeScale {
    policy: AcademicPolicy,
}

impl GradeScale {
    /// Scale with the default institutional policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scale with custom thresholds.
    #[must_use]
    pub fn with_policy(policy: AcademicPolicy) -> Self {
        Self { policy }
    }

    /// Map a score to its letter grade. Total over the score domain.
    #[must_use]
    pub fn grade_of(&self, score: Score) -> Grade {
        let c = score.centi();
        if c >= self.policy.grade_floor_a {
            Grade::A
        } else if c >= self.policy.grade_floor_b {
            Grade::B
        } else if c >= self.policy.grade_floor_c {
            Grade::C
        } else if c >= self.policy.grade_floor_d {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Grade points per credit hour for a letter grade.
    ///
    /// Delegates to the closed enum's total lookup; absent grades
    /// contribute nothing and are handled by the aggregators, never by a
    /// silent default here.
    #[must_use]
    pub fn point_of(&self, grade: Grade) -> u32 {
        grade.points()
    }

    /// Classify a failing score into its remediation path.
    ///
    /// - [35.00, 39.00] inclusive: `Retake`
    /// - below 35.00: `Resit`
    /// - everything else (passing scores, the (39.00, 40.00) gap, or no
    ///   score recorded yet): `None`
    #[must_use]
    pub fn failure_class_of(&self, score: Option<Score>) -> Option<FailureClass> {
        let c = score?.centi();
        if c >= self.policy.retake_floor && c <= self.policy.retake_ceil {
            Some(FailureClass::Retake)
        } else if c < self.policy.retake_floor {
            Some(FailureClass::Resit)
        } else {
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(m: u16) -> Score {
        Score::from_marks(m).expect("score")
    }

    fn centi(c: u16) -> Score {
        Score::from_centi(c).expect("score")
    }

    #[test]
    fn grade_band_boundaries() {
        let scale = GradeScale::new();
        assert_eq!(scale.grade_of(marks(70)), Grade::A);
        assert_eq!(scale.grade_of(marks(69)), Grade::B);
        assert_eq!(scale.grade_of(marks(60)), Grade::B);
        assert_eq!(scale.grade_of(marks(59)), Grade::C);
        assert_eq!(scale.grade_of(marks(50)), Grade::C);
        assert_eq!(scale.grade_of(marks(49)), Grade::D);
        assert_eq!(scale.grade_of(marks(40)), Grade::D);
        assert_eq!(scale.grade_of(marks(39)), Grade::F);
        assert_eq!(scale.grade_of(marks(0)), Grade::F);
        assert_eq!(scale.grade_of(marks(100)), Grade::A);
    }

    #[test]
    fn failure_class_boundaries() {
        let scale = GradeScale::new();
        assert_eq!(
            scale.failure_class_of(Some(marks(35))),
            Some(FailureClass::Retake)
        );
        assert_eq!(
            scale.failure_class_of(Some(marks(39))),
            Some(FailureClass::Retake)
        );
        assert_eq!(
            scale.failure_class_of(Some(centi(3_499))),
            Some(FailureClass::Resit)
        );
        assert_eq!(
            scale.failure_class_of(Some(marks(0))),
            Some(FailureClass::Resit)
        );
        assert_eq!(scale.failure_class_of(Some(marks(40))), None);
        assert_eq!(scale.failure_class_of(Some(marks(45))), None);
        assert_eq!(scale.failure_class_of(None), None);
    }

    #[test]
    fn gap_between_retake_ceiling_and_pass_floor() {
        // 39.50 is above the retake ceiling but below a passing D:
        // no remediation path, same as the historical behavior.
        let scale = GradeScale::new();
        assert_eq!(scale.failure_class_of(Some(centi(3_950))), None);
        assert_eq!(scale.grade_of(centi(3_950)), Grade::F);
    }

    #[test]
    fn failing_grade_still_classified_by_score() {
        let scale = GradeScale::new();
        // 39 is an F letter grade but falls in the retake band.
        assert_eq!(scale.grade_of(marks(39)), Grade::F);
        assert_eq!(
            scale.failure_class_of(Some(marks(39))),
            Some(FailureClass::Retake)
        );
        // 34 is an F classified as resit.
        assert_eq!(scale.grade_of(marks(34)), Grade::F);
        assert_eq!(
            scale.failure_class_of(Some(marks(34))),
            Some(FailureClass::Resit)
        );
    }

    #[test]
    fn custom_policy_shifts_bands() {
        let policy = AcademicPolicy {
            grade_floor_a: 8_000,
            ..AcademicPolicy::default()
        };
        let scale = GradeScale::with_policy(policy);
        assert_eq!(scale.grade_of(marks(75)), Grade::B);
        assert_eq!(scale.grade_of(marks(80)), Grade::A);
    }
}
