//! # Attendance Eligibility
//!
//! Summarizes attendance entries for an enrollment and decides exam
//! eligibility. Expected contact hours are `credit_hours * teaching_weeks`;
//! the attended percentage is rounded half-up and compared against the
//! policy cutoff. Attendance above the expected total is reported as-is
//! (percentages over 100 are possible and deliberate).

use crate::gpa::round_div;
use crate::policy::AcademicPolicy;
use crate::types::{AttendanceEntry, AttendanceStatus};
use serde::{Deserialize, Serialize};

/// Attendance standing for one enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// Hours actually attended (sum of `Present` entry durations).
    pub attended_hours: u32,
    /// Expected contact hours for the course.
    pub expected_hours: u32,
    /// Whole percentage attended, rounded half-up. 0 when nothing is
    /// expected.
    pub percent: u32,
    /// Whether the student may sit the exam.
    pub eligible: bool,
}

/// Computes attendance summaries under a policy.
#[derive(Debug, Clone, Default)]
pub struct AttendanceRule {
    policy: AcademicPolicy,
}

impl AttendanceRule {
    /// Rule with the default policy (14 teaching weeks, 67% cutoff).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule with custom thresholds.
    #[must_use]
    pub fn with_policy(policy: AcademicPolicy) -> Self {
        Self { policy }
    }

    /// Expected contact hours for a course of the given credit weight.
    #[must_use]
    pub fn expected_hours(&self, credit_hours: u32) -> u32 {
        credit_hours.saturating_mul(self.policy.teaching_weeks)
    }

    /// Summarize the entries for one enrollment.
    ///
    /// Only `Present` entries count toward attended hours; `Absent`
    /// entries exist for the record but contribute nothing. A
    /// zero-credit course expects zero hours and reports 0% ineligible.
    #[must_use]
    pub fn summarize(&self, credit_hours: u32, entries: &[AttendanceEntry]) -> AttendanceSummary {
        let attended: u32 = entries
            .iter()
            .filter(|e| e.status == AttendanceStatus::Present)
            .fold(0u32, |sum, e| sum.saturating_add(e.duration));

        let expected = self.expected_hours(credit_hours);
        let percent = round_div(
            u64::from(attended).saturating_mul(100),
            u64::from(expected),
        ) as u32;

        AttendanceSummary {
            attended_hours: attended,
            expected_hours: expected,
            percent,
            eligible: percent >= self.policy.attendance_eligibility_percent,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassDate;

    fn entry(day: u8, status: AttendanceStatus, duration: u32) -> AttendanceEntry {
        AttendanceEntry {
            date: ClassDate::new(2026, 3, day).expect("date"),
            status,
            duration,
        }
    }

    #[test]
    fn percent_rounds_half_up() {
        // 30 of 42 hours = 71.43% -> 71
        let rule = AttendanceRule::new();
        let entries = vec![
            entry(2, AttendanceStatus::Present, 20),
            entry(9, AttendanceStatus::Present, 10),
        ];
        let s = rule.summarize(3, &entries);
        assert_eq!(s.attended_hours, 30);
        assert_eq!(s.expected_hours, 42);
        assert_eq!(s.percent, 71);
        assert!(s.eligible);
    }

    #[test]
    fn absences_recorded_but_not_counted() {
        let rule = AttendanceRule::new();
        let entries = vec![
            entry(2, AttendanceStatus::Present, 14),
            entry(9, AttendanceStatus::Absent, 14),
        ];
        let s = rule.summarize(1, &entries);
        assert_eq!(s.attended_hours, 14);
        assert_eq!(s.expected_hours, 14);
        assert_eq!(s.percent, 100);
    }

    #[test]
    fn cutoff_is_inclusive() {
        // 67% exactly is eligible; 66% is not. 2-credit course expects 28.
        let rule = AttendanceRule::new();
        // 18.76/28 would be fractional; use a 25-credit course: 350 expected.
        // 234/350 = 66.857 -> 67 eligible; 232/350 = 66.29 -> 66 not.
        let eligible = rule.summarize(25, &[entry(2, AttendanceStatus::Present, 234)]);
        assert_eq!(eligible.percent, 67);
        assert!(eligible.eligible);

        let short = rule.summarize(25, &[entry(2, AttendanceStatus::Present, 232)]);
        assert_eq!(short.percent, 66);
        assert!(!short.eligible);
    }

    #[test]
    fn zero_credit_course_is_zero_percent() {
        let rule = AttendanceRule::new();
        let s = rule.summarize(0, &[entry(2, AttendanceStatus::Present, 10)]);
        assert_eq!(s.expected_hours, 0);
        assert_eq!(s.percent, 0);
        assert!(!s.eligible);
    }

    #[test]
    fn no_entries_means_zero_and_ineligible() {
        let rule = AttendanceRule::new();
        let s = rule.summarize(3, &[]);
        assert_eq!(s.attended_hours, 0);
        assert_eq!(s.percent, 0);
        assert!(!s.eligible);
    }

    #[test]
    fn over_attendance_not_clamped() {
        let rule = AttendanceRule::new();
        let s = rule.summarize(1, &[entry(2, AttendanceStatus::Present, 21)]);
        assert_eq!(s.expected_hours, 14);
        assert_eq!(s.percent, 150);
        assert!(s.eligible);
    }

    #[test]
    fn custom_policy_changes_expected_hours_and_cutoff() {
        let rule = AttendanceRule::with_policy(AcademicPolicy::with_attendance(12, 75));
        let s = rule.summarize(3, &[entry(2, AttendanceStatus::Present, 26)]);
        assert_eq!(s.expected_hours, 36);
        assert_eq!(s.percent, 72);
        assert!(!s.eligible);
    }
}
