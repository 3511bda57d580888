//! # Degree Progression
//!
//! Maps a student's cumulative GPA onto the institution's honours
//! classification ladder. Classification is a pure threshold walk over
//! the policy floors, evaluated top-down; ties go to the higher class
//! because floors are inclusive.

use crate::gpa;
use crate::policy::AcademicPolicy;
use crate::scale::GradeScale;
use crate::types::{EnrollmentRecord, Gpa};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Honours classification bands, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Fail,
    Pass,
    SecondClassLower,
    SecondClassUpper,
    FirstClass,
}

impl Classification {
    /// Human-readable name as printed on transcripts.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstClass => "First Class",
            Self::SecondClassUpper => "Second Class Upper",
            Self::SecondClassLower => "Second Class Lower",
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A student's progression standing: cumulative GPA, accumulated
/// credits, and the classification band the GPA falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeProgression {
    pub gpa: Gpa,
    pub total_credits: u32,
    pub classification: Classification,
}

/// Classifies cumulative GPA against the policy floors.
#[derive(Debug, Clone, Default)]
pub struct DegreeClassifier {
    policy: AcademicPolicy,
}

impl DegreeClassifier {
    /// Classifier with the default institutional floors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifier with custom floors.
    #[must_use]
    pub fn with_policy(policy: AcademicPolicy) -> Self {
        Self { policy }
    }

    /// Band for a cumulative GPA. Total over the GPA domain.
    #[must_use]
    pub fn classify(&self, gpa: Gpa) -> Classification {
        let h = gpa.hundredths();
        if h >= self.policy.class_floor_first {
            Classification::FirstClass
        } else if h >= self.policy.class_floor_upper {
            Classification::SecondClassUpper
        } else if h >= self.policy.class_floor_lower {
            Classification::SecondClassLower
        } else if h >= self.policy.class_floor_pass {
            Classification::Pass
        } else {
            Classification::Fail
        }
    }

    /// Full progression standing from a student's enrollment records.
    ///
    /// Uses the cumulative GPA path: failed courses contribute neither
    /// points nor credits. An empty record classifies as `Fail` with
    /// zero credits, the defined floor of the ladder.
    #[must_use]
    pub fn progression(
        &self,
        records: &[EnrollmentRecord],
        scale: &GradeScale,
    ) -> DegreeProgression {
        let (gpa, total_credits) = gpa::cumulative_gpa(records, scale);
        DegreeProgression {
            gpa,
            total_credits,
            classification: self.classify(gpa),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnrollmentId, Grade, Score, StudentId};

    fn record(id: u64, grade: Grade, credits: u32) -> EnrollmentRecord {
        EnrollmentRecord {
            id: EnrollmentId(id),
            student: StudentId(1),
            course_code: format!("CS{id:03}"),
            course_name: "Course".to_string(),
            credit_hours: credits,
            year: 1,
            semester: 1,
            department: "Computing".to_string(),
            score: Some(Score::from_marks(50).expect("score")),
            grade: Some(grade),
        }
    }

    #[test]
    fn classification_floors_inclusive() {
        let c = DegreeClassifier::new();
        assert_eq!(c.classify(Gpa(400)), Classification::FirstClass);
        assert_eq!(c.classify(Gpa(370)), Classification::FirstClass);
        assert_eq!(c.classify(Gpa(369)), Classification::SecondClassUpper);
        assert_eq!(c.classify(Gpa(300)), Classification::SecondClassUpper);
        assert_eq!(c.classify(Gpa(299)), Classification::SecondClassLower);
        assert_eq!(c.classify(Gpa(200)), Classification::SecondClassLower);
        assert_eq!(c.classify(Gpa(199)), Classification::Pass);
        assert_eq!(c.classify(Gpa(100)), Classification::Pass);
        assert_eq!(c.classify(Gpa(99)), Classification::Fail);
        assert_eq!(c.classify(Gpa::zero()), Classification::Fail);
    }

    #[test]
    fn classification_ordering_matches_gpa_ordering() {
        assert!(Classification::FirstClass > Classification::SecondClassUpper);
        assert!(Classification::SecondClassUpper > Classification::SecondClassLower);
        assert!(Classification::SecondClassLower > Classification::Pass);
        assert!(Classification::Pass > Classification::Fail);
    }

    #[test]
    fn progression_from_records() {
        let classifier = DegreeClassifier::new();
        let scale = GradeScale::new();
        let records = vec![record(1, Grade::A, 3), record(2, Grade::B, 4)];
        let p = classifier.progression(&records, &scale);
        assert_eq!(p.gpa, Gpa(343));
        assert_eq!(p.total_credits, 7);
        assert_eq!(p.classification, Classification::SecondClassUpper);
    }

    #[test]
    fn failed_courses_do_not_drag_classification() {
        let classifier = DegreeClassifier::new();
        let scale = GradeScale::new();
        let records = vec![record(1, Grade::A, 3), record(2, Grade::F, 3)];
        let p = classifier.progression(&records, &scale);
        // F excluded from the cumulative path entirely.
        assert_eq!(p.gpa, Gpa(400));
        assert_eq!(p.total_credits, 3);
        assert_eq!(p.classification, Classification::FirstClass);
    }

    #[test]
    fn empty_record_is_fail_with_zero_credits() {
        let classifier = DegreeClassifier::new();
        let scale = GradeScale::new();
        let p = classifier.progression(&[], &scale);
        assert_eq!(p.gpa, Gpa::zero());
        assert_eq!(p.total_credits, 0);
        assert_eq!(p.classification, Classification::Fail);
    }

    #[test]
    fn custom_floors_shift_bands() {
        let policy = AcademicPolicy::with_classification_floors(390, 350, 250, 150);
        let c = DegreeClassifier::with_policy(policy);
        assert_eq!(c.classify(Gpa(370)), Classification::SecondClassUpper);
        assert_eq!(c.classify(Gpa(390)), Classification::FirstClass);
    }

    #[test]
    fn labels_are_transcript_names() {
        assert_eq!(Classification::FirstClass.to_string(), "First Class");
        assert_eq!(
            Classification::SecondClassLower.to_string(),
            "Second Class Lower"
        );
    }
}
