//! # Retake/Resit Lifecycle
//!
//! Validation rules for the remediation request lifecycle. Application
//! eligibility and the pending-to-decided transition are defined here;
//! the atomicity of a decision (compare-and-set against `Pending`) is
//! enforced by the store, which calls [`transition`] inside its write
//! path.
//!
//! The lifecycle is a one-way street: `Pending -> Approved` or
//! `Pending -> Rejected`, nothing else. A second decision on the same
//! request is an `InvalidTransition`, never a silent overwrite.

use crate::scale::GradeScale;
use crate::types::{
    Decision, EnrollmentRecord, FailureClass, ProvostError, RequestId, RequestStatus,
};

/// Validate a remediation application against an enrollment record.
///
/// Returns the derived failure class and the trimmed reason on success.
/// The caller never chooses the class; it is always derived from the
/// recorded score.
///
/// # Errors
///
/// - [`ProvostError::InvalidArgument`] when the reason trims to empty.
/// - [`ProvostError::IneligibleForRemediation`] when the score carries
///   no remediation path (passing, ungraded, or in the gap above the
///   retake ceiling).
pub fn classify_application(
    scale: &GradeScale,
    record: &EnrollmentRecord,
    reason: &str,
) -> Result<(FailureClass, String), ProvostError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(ProvostError::InvalidArgument(
            "request reason must not be empty".to_string(),
        ));
    }

    let class = scale
        .failure_class_of(record.score)
        .ok_or(ProvostError::IneligibleForRemediation)?;

    Ok((class, trimmed.to_string()))
}

/// Apply a decision to a request's current status.
///
/// # Errors
///
/// [`ProvostError::InvalidTransition`] unless the current status is
/// `Pending`.
pub fn transition(
    id: RequestId,
    current: RequestStatus,
    decision: Decision,
) -> Result<RequestStatus, ProvostError> {
    if !current.is_pending() {
        return Err(ProvostError::InvalidTransition(id));
    }
    Ok(decision.into_status())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnrollmentId, Grade, Score, StudentId};

    fn record_with_score(score: Option<u16>) -> EnrollmentRecord {
        EnrollmentRecord {
            id: EnrollmentId(7),
            student: StudentId(1),
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            credit_hours: 3,
            year: 1,
            semester: 1,
            department: "Computing".to_string(),
            score: score.map(|c| Score::from_centi(c).expect("score")),
            grade: score.map(|_| Grade::F),
        }
    }

    #[test]
    fn retake_band_application_accepted() {
        let scale = GradeScale::new();
        let record = record_with_score(Some(3_700));
        let (class, reason) =
            classify_application(&scale, &record, "  missed the final  ").expect("eligible");
        assert_eq!(class, FailureClass::Retake);
        assert_eq!(reason, "missed the final");
    }

    #[test]
    fn resit_band_application_accepted() {
        let scale = GradeScale::new();
        let record = record_with_score(Some(2_000));
        let (class, _) = classify_application(&scale, &record, "illness").expect("eligible");
        assert_eq!(class, FailureClass::Resit);
    }

    #[test]
    fn passing_score_is_ineligible() {
        let scale = GradeScale::new();
        let record = record_with_score(Some(4_500));
        assert!(matches!(
            classify_application(&scale, &record, "reason"),
            Err(ProvostError::IneligibleForRemediation)
        ));
    }

    #[test]
    fn ungraded_enrollment_is_ineligible() {
        let scale = GradeScale::new();
        let record = record_with_score(None);
        assert!(matches!(
            classify_application(&scale, &record, "reason"),
            Err(ProvostError::IneligibleForRemediation)
        ));
    }

    #[test]
    fn blank_reason_rejected_before_eligibility() {
        let scale = GradeScale::new();
        let record = record_with_score(Some(3_700));
        assert!(matches!(
            classify_application(&scale, &record, "   "),
            Err(ProvostError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pending_transitions_to_either_outcome() {
        let id = RequestId(1);
        assert_eq!(
            transition(id, RequestStatus::Pending, Decision::Approved).expect("ok"),
            RequestStatus::Approved
        );
        assert_eq!(
            transition(id, RequestStatus::Pending, Decision::Rejected).expect("ok"),
            RequestStatus::Rejected
        );
    }

    #[test]
    fn decided_requests_are_final() {
        let id = RequestId(1);
        for current in [RequestStatus::Approved, RequestStatus::Rejected] {
            for decision in [Decision::Approved, Decision::Rejected] {
                assert!(matches!(
                    transition(id, current, decision),
                    Err(ProvostError::InvalidTransition(_))
                ));
            }
        }
    }
}
