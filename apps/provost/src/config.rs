//! # Policy Configuration
//!
//! Loads an [`AcademicPolicy`] from a TOML file. Every field is optional;
//! anything unspecified falls back to the institutional default, so a
//! deployment only writes down the thresholds it actually changes.
//!
//! The file path comes from `--policy` on the command line, the
//! `PROVOST_POLICY` environment variable, or a `provost.toml` in the
//! working directory (in that order).
//!
//! ```toml
//! # provost.toml
//! teaching_weeks = 12
//! attendance_eligibility_percent = 75
//! ```

use provost_core::{AcademicPolicy, ProvostError};
use serde::Deserialize;
use std::path::Path;

/// Partial policy as written in a TOML file. All units are the engine's
/// fixed-point integers: centimarks for score thresholds, GPA hundredths
/// for classification floors.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    grade_floor_a: Option<u16>,
    grade_floor_b: Option<u16>,
    grade_floor_c: Option<u16>,
    grade_floor_d: Option<u16>,
    retake_floor: Option<u16>,
    retake_ceil: Option<u16>,
    teaching_weeks: Option<u32>,
    attendance_eligibility_percent: Option<u32>,
    class_floor_first: Option<u32>,
    class_floor_upper: Option<u32>,
    class_floor_lower: Option<u32>,
    class_floor_pass: Option<u32>,
}

impl PolicyFile {
    fn merge_over(self, base: AcademicPolicy) -> AcademicPolicy {
        AcademicPolicy {
            grade_floor_a: self.grade_floor_a.unwrap_or(base.grade_floor_a),
            grade_floor_b: self.grade_floor_b.unwrap_or(base.grade_floor_b),
            grade_floor_c: self.grade_floor_c.unwrap_or(base.grade_floor_c),
            grade_floor_d: self.grade_floor_d.unwrap_or(base.grade_floor_d),
            retake_floor: self.retake_floor.unwrap_or(base.retake_floor),
            retake_ceil: self.retake_ceil.unwrap_or(base.retake_ceil),
            teaching_weeks: self.teaching_weeks.unwrap_or(base.teaching_weeks),
            attendance_eligibility_percent: self
                .attendance_eligibility_percent
                .unwrap_or(base.attendance_eligibility_percent),
            class_floor_first: self.class_floor_first.unwrap_or(base.class_floor_first),
            class_floor_upper: self.class_floor_upper.unwrap_or(base.class_floor_upper),
            class_floor_lower: self.class_floor_lower.unwrap_or(base.class_floor_lower),
            class_floor_pass: self.class_floor_pass.unwrap_or(base.class_floor_pass),
        }
    }
}

/// Conventional policy file, picked up from the working directory when
/// neither `--policy` nor `PROVOST_POLICY` is set.
const DEFAULT_POLICY_FILE: &str = "provost.toml";

/// Load the effective policy.
///
/// Precedence: explicit path argument, then `PROVOST_POLICY`, then
/// `provost.toml` in the working directory if present, then the built-in
/// defaults. A path that is explicitly set but unreadable or malformed
/// is an error, never a silent fallback.
pub fn load_policy(path: Option<&Path>) -> Result<AcademicPolicy, ProvostError> {
    let env_path = std::env::var("PROVOST_POLICY").ok();
    let effective: Option<&Path> = path.or(env_path.as_deref().map(Path::new));

    let Some(file_path) = effective else {
        let conventional = Path::new(DEFAULT_POLICY_FILE);
        if conventional.is_file() {
            return load_policy(Some(conventional));
        }
        return Ok(AcademicPolicy::default());
    };

    let contents = std::fs::read_to_string(file_path).map_err(|e| {
        ProvostError::InvalidArgument(format!(
            "cannot read policy file '{}': {}",
            file_path.display(),
            e
        ))
    })?;
    let file: PolicyFile = toml::from_str(&contents).map_err(|e| {
        ProvostError::InvalidArgument(format!(
            "malformed policy file '{}': {}",
            file_path.display(),
            e
        ))
    })?;

    Ok(file.merge_over(AcademicPolicy::default()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn missing_path_gives_defaults() {
        let policy = load_policy(None);
        // May pick up PROVOST_POLICY from the environment; only assert
        // the default case when it is unset.
        if std::env::var("PROVOST_POLICY").is_err() {
            assert_eq!(policy.unwrap(), AcademicPolicy::default());
        }
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "teaching_weeks = 12").unwrap();
        writeln!(f, "attendance_eligibility_percent = 75").unwrap();

        let policy = load_policy(Some(&path)).unwrap();
        assert_eq!(policy.teaching_weeks, 12);
        assert_eq!(policy.attendance_eligibility_percent, 75);
        assert_eq!(policy.grade_floor_a, AcademicPolicy::default().grade_floor_a);
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "grade_flor_a = 7000\n").unwrap();
        assert!(load_policy(Some(&path)).is_err());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let path = Path::new("/definitely/not/a/real/policy.toml");
        assert!(load_policy(Some(path)).is_err());
    }
}
