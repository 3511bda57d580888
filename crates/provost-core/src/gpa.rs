//! # GPA Aggregation
//!
//! Credit-weighted grade-point averages over enrollment records.
//!
//! There are deliberately TWO aggregation algorithms here and they are NOT
//! required to agree:
//!
//! - [`semester_gpa`] (the semester-history path) counts an F at zero
//!   points but keeps its credit hours in the denominator.
//! - [`cumulative_gpa`] (the degree-progression path) excludes F grades
//!   from both numerator and denominator, so a failed course's credit
//!   weight is not counted against the student twice.
//!
//! Both exclude records that have no grade yet. Zero total credits is a
//! defined result (GPA 0.00), not an error. Keep the two functions
//! separate; unifying them changes published progression results.
//!
//! All arithmetic is integer: grade points are whole numbers per credit
//! hour and results are rounded half-up to hundredths of a point.

use crate::scale::GradeScale;
use crate::types::{EnrollmentRecord, Gpa};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GPA for one (year, semester) term, as produced by [`gpa_history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermGpa {
    pub year: u16,
    pub semester: u8,
    pub gpa: Gpa,
}

/// Integer division rounded half-up. Returns 0 when the divisor is 0.
#[must_use]
pub(crate) fn round_div(numerator: u64, divisor: u64) -> u64 {
    if divisor == 0 {
        return 0;
    }
    (numerator
        .saturating_mul(2)
        .saturating_add(divisor))
        / divisor.saturating_mul(2)
}

/// Credit-weighted GPA over the given records, counting failed courses.
///
/// Intended for the records of a single (year, semester). Ungraded records
/// are excluded from both sums; an F contributes zero points but its
/// credit hours stay in the denominator. Empty or zero-credit input yields
/// GPA 0.00 by definition.
#[must_use]
pub fn semester_gpa(records: &[EnrollmentRecord], scale: &GradeScale) -> Gpa {
    let mut total_points: u64 = 0;
    let mut total_credits: u64 = 0;

    for record in records {
        let Some(grade) = record.grade else {
            continue;
        };
        let credits = u64::from(record.credit_hours);
        total_points =
            total_points.saturating_add(u64::from(scale.point_of(grade)).saturating_mul(credits));
        total_credits = total_credits.saturating_add(credits);
    }

    Gpa(round_div(total_points.saturating_mul(100), total_credits) as u32)
}

/// Cumulative GPA and accumulated credits over a student's whole record.
///
/// Unlike [`semester_gpa`], F grades are skipped entirely: their credit
/// hours are excluded from the accumulated total as well as the points
/// sum. Returns `(Gpa::zero(), 0)` for an empty or fully-failed record.
#[must_use]
pub fn cumulative_gpa(records: &[EnrollmentRecord], scale: &GradeScale) -> (Gpa, u32) {
    let mut total_points: u64 = 0;
    let mut total_credits: u64 = 0;

    for record in records {
        let Some(grade) = record.grade else {
            continue;
        };
        if !grade.is_passing() {
            continue;
        }
        let credits = u64::from(record.credit_hours);
        total_points =
            total_points.saturating_add(u64::from(scale.point_of(grade)).saturating_mul(credits));
        total_credits = total_credits.saturating_add(credits);
    }

    let gpa = Gpa(round_div(total_points.saturating_mul(100), total_credits) as u32);
    (gpa, total_credits as u32)
}

/// Per-term GPA history, ascending by (year, semester).
///
/// Recomputed fresh from the records on every call; nothing is cached.
/// Terms with no graded records report GPA 0.00.
#[must_use]
pub fn gpa_history(records: &[EnrollmentRecord], scale: &GradeScale) -> Vec<TermGpa> {
    let mut terms: BTreeMap<(u16, u8), Vec<&EnrollmentRecord>> = BTreeMap::new();
    for record in records {
        terms
            .entry((record.year, record.semester))
            .or_default()
            .push(record);
    }

    terms
        .into_iter()
        .map(|((year, semester), term_records)| {
            let owned: Vec<EnrollmentRecord> =
                term_records.into_iter().cloned().collect();
            TermGpa {
                year,
                semester,
                gpa: semester_gpa(&owned, scale),
            }
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
