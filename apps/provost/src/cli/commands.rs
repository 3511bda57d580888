//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command loads the registrar fresh from the database path, runs,
//! and exits; the redb backend persists across invocations, the memory
//! backend does not.

use crate::api::AttendanceMarkRequest;
use crate::config;
use provost_core::{
    Decision, EnrollmentId, MemoryStore, NewEnrollment, ProvostError, RedbStore, Registrar,
    RequestId, StoreBackend, StudentId,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for seeding (10 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_SEED_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ProvostError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ProvostError::StoreUnavailable(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ProvostError::InvalidArgument(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate file path for security.
///
/// This function:
/// 1. Canonicalizes the path to resolve symlinks and ".."
/// 2. Ensures the path exists
/// 3. Ensures the path is a file (not a directory)
fn validate_file_path(path: &Path) -> Result<PathBuf, ProvostError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| {
        ProvostError::InvalidArgument(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    // Ensure it's a file, not a directory
    if !canonical.is_file() {
        return Err(ProvostError::InvalidArgument(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// REGISTRAR LOADING
// =============================================================================

/// Load a registrar from a database path with the specified backend and
/// policy overrides.
pub fn load_registrar(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
) -> Result<Registrar, ProvostError> {
    let policy = config::load_policy(policy_path)?;

    match backend {
        "memory" => {
            tracing::warn!("Memory backend: records will not survive this process");
            Ok(Registrar::with_backend(
                StoreBackend::InMemory(MemoryStore::new()),
                policy,
            ))
        }
        "redb" => Ok(Registrar::with_backend(
            StoreBackend::Persistent(RedbStore::open(db_path)?),
            policy,
        )),
        other => Err(ProvostError::InvalidArgument(format!(
            "Unknown backend: {}. Use: redb, memory",
            other
        ))),
    }
}

/// Unix seconds from the system clock, stamped at the CLI boundary.
fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    host: &str,
    port: u16,
) -> Result<(), ProvostError> {
    let registrar = load_registrar(db_path, backend, policy_path)?;

    println!("Provost Academic Records Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  POST /students                      - Register a student");
    println!("  POST /enrollments                   - Enroll in a course");
    println!("  POST /grades                        - Record marks");
    println!("  POST /attendance                    - Mark attendance");
    println!("  POST /requests                      - Apply for retake/resit");
    println!("  POST /requests/{{id}}/decide          - Decide a request");
    println!("  GET  /students/{{id}}/gpa             - GPA (cumulative or per-term)");
    println!("  GET  /students/{{id}}/progression     - Degree classification");
    println!("  GET  /health                        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    crate::api::run_server(&addr, registrar).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show database and policy status.
pub fn cmd_status(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
) -> Result<(), ProvostError> {
    let policy = config::load_policy(policy_path)?;
    let registrar = load_registrar(db_path, backend, policy_path)?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "persistent": registrar.is_persistent(),
            "policy": {
                "teaching_weeks": policy.teaching_weeks,
                "attendance_eligibility_percent": policy.attendance_eligibility_percent,
                "retake_band_centimarks": [policy.retake_floor, policy.retake_ceil],
                "grade_floors_centimarks": [
                    policy.grade_floor_a,
                    policy.grade_floor_b,
                    policy.grade_floor_c,
                    policy.grade_floor_d
                ],
                "classification_floors_hundredths": [
                    policy.class_floor_first,
                    policy.class_floor_upper,
                    policy.class_floor_lower,
                    policy.class_floor_pass
                ]
            }
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Provost Status");
    println!("==============");
    println!("Database:   {:?}", db_path);
    println!("Backend:    {}", backend);
    println!("Persistent: {}", registrar.is_persistent());
    println!();
    println!("Policy:");
    println!("  Teaching weeks:         {}", policy.teaching_weeks);
    println!(
        "  Attendance eligibility: {}%",
        policy.attendance_eligibility_percent
    );
    println!(
        "  Retake band:            [{}, {}] centimarks",
        policy.retake_floor, policy.retake_ceil
    );
    println!(
        "  Grade floors (A/B/C/D): {}/{}/{}/{} centimarks",
        policy.grade_floor_a, policy.grade_floor_b, policy.grade_floor_c, policy.grade_floor_d
    );
    println!(
        "  Class floors:           {}/{}/{}/{} hundredths",
        policy.class_floor_first,
        policy.class_floor_upper,
        policy.class_floor_lower,
        policy.class_floor_pass
    );

    Ok(())
}

// =============================================================================
// PROGRESSION COMMAND
// =============================================================================

/// Show a student's degree progression.
pub fn cmd_progression(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    student: u64,
) -> Result<(), ProvostError> {
    let registrar = load_registrar(db_path, backend, policy_path)?;
    let id = StudentId(student);

    let record = registrar.student(id)?;
    let progression = registrar.degree_progression(id)?;

    if json_mode {
        let output = serde_json::json!({
            "student_id": student,
            "full_name": record.full_name,
            "reg_no": record.reg_no,
            "cumulative_gpa": progression.gpa.to_string(),
            "total_credits": progression.total_credits,
            "classification": progression.classification.label()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Degree Progression");
    println!("==================");
    println!("Student:        {} ({})", record.full_name, record.reg_no);
    println!("Cumulative GPA: {}", progression.gpa);
    println!("Earned Credits: {}", progression.total_credits);
    println!("Classification: {}", progression.classification.label());

    Ok(())
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// Show a student's per-term GPA history.
pub fn cmd_history(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    student: u64,
) -> Result<(), ProvostError> {
    let registrar = load_registrar(db_path, backend, policy_path)?;
    let id = StudentId(student);

    let record = registrar.student(id)?;
    let terms = registrar.gpa_history(id)?;

    if json_mode {
        let output = serde_json::json!({
            "student_id": student,
            "full_name": record.full_name,
            "terms": terms.iter().map(|t| serde_json::json!({
                "year": t.year,
                "semester": t.semester,
                "gpa": t.gpa.to_string()
            })).collect::<Vec<_>>()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("GPA History");
    println!("===========");
    println!("Student: {} ({})", record.full_name, record.reg_no);
    println!();

    if terms.is_empty() {
        println!("No graded terms yet");
    } else {
        for term in &terms {
            println!(
                "  {} semester {}: {}",
                term.year, term.semester, term.gpa
            );
        }
    }

    Ok(())
}

// =============================================================================
// ATTENDANCE COMMAND
// =============================================================================

/// Show attendance standing for an enrollment.
pub fn cmd_attendance(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    enrollment: u64,
) -> Result<(), ProvostError> {
    let registrar = load_registrar(db_path, backend, policy_path)?;
    let id = EnrollmentId(enrollment);

    let record = registrar.enrollment(id)?;
    let summary = registrar.attendance_summary(id)?;
    let entries = registrar.attendance_entries(id)?;

    if json_mode {
        let output = serde_json::json!({
            "enrollment_id": enrollment,
            "course_code": record.course_code,
            "course_name": record.course_name,
            "attended_hours": summary.attended_hours,
            "expected_hours": summary.expected_hours,
            "percent": summary.percent,
            "eligible": summary.eligible,
            "marks": entries.iter().map(|e| serde_json::json!({
                "date": e.date.to_string(),
                "status": e.status,
                "duration": e.duration
            })).collect::<Vec<_>>()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Attendance Standing");
    println!("===================");
    println!("Course:   {} - {}", record.course_code, record.course_name);
    println!(
        "Attended: {} / {} hours ({}%)",
        summary.attended_hours, summary.expected_hours, summary.percent
    );
    println!(
        "Exam eligibility: {}",
        if summary.eligible { "ELIGIBLE" } else { "NOT ELIGIBLE" }
    );
    println!();
    println!("Marks: {}", entries.len());

    Ok(())
}

// =============================================================================
// SEED COMMAND
// =============================================================================

/// Seed file format: any section may be omitted.
#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    students: Vec<SeedStudent>,
    #[serde(default)]
    enrollments: Vec<SeedEnrollment>,
    #[serde(default)]
    grades: Vec<SeedGrade>,
    #[serde(default)]
    attendance: Vec<AttendanceMarkRequest>,
}

#[derive(Debug, Deserialize)]
struct SeedStudent {
    full_name: String,
    reg_no: String,
}

#[derive(Debug, Deserialize)]
struct SeedEnrollment {
    student_id: u64,
    course_code: String,
    course_name: String,
    credit_hours: u32,
    year: u16,
    semester: u8,
    department: String,
}

#[derive(Debug, Deserialize)]
struct SeedGrade {
    enrollment_id: u64,
    marks: f64,
}

/// Load students, enrollments, grades and attendance from a JSON file.
///
/// Sections apply in dependency order (students, enrollments, grades,
/// attendance), so a single file can build a full scenario. Seeding stops
/// at the first bad record; earlier records stay applied.
pub fn cmd_seed(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    file: &Path,
) -> Result<(), ProvostError> {
    let mut registrar = load_registrar(db_path, backend, policy_path)?;

    // Validate file path for security (prevents path traversal)
    let validated_path = validate_file_path(file)?;

    // Validate file size before reading to prevent DoS
    validate_file_size(&validated_path, MAX_SEED_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| ProvostError::StoreUnavailable(format!("Read file: {}", e)))?;
    let seed: SeedFile = serde_json::from_slice(&contents)
        .map_err(|e| ProvostError::SerializationError(format!("Malformed seed file: {}", e)))?;

    let mut student_count = 0usize;
    for s in seed.students {
        let created = registrar.add_student(s.full_name, s.reg_no)?;
        tracing::debug!("Seeded student {} as {:?}", created.full_name, created.id);
        student_count += 1;
    }

    let mut enrollment_count = 0usize;
    for e in seed.enrollments {
        registrar.enroll(NewEnrollment {
            student: StudentId(e.student_id),
            course_code: e.course_code,
            course_name: e.course_name,
            credit_hours: e.credit_hours,
            year: e.year,
            semester: e.semester,
            department: e.department,
        })?;
        enrollment_count += 1;
    }

    let mut grade_count = 0usize;
    for g in seed.grades {
        let score = crate::api::score_from_marks(g.marks)?;
        registrar.record_grade(EnrollmentId(g.enrollment_id), score)?;
        grade_count += 1;
    }

    let mut attendance_count = 0usize;
    for mark in seed.attendance {
        let entry = mark.to_entry()?;
        registrar.mark_attendance(EnrollmentId(mark.enrollment_id), entry)?;
        attendance_count += 1;
    }

    if json_mode {
        let output = serde_json::json!({
            "students": student_count,
            "enrollments": enrollment_count,
            "grades": grade_count,
            "attendance_marks": attendance_count
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Seeded {} students, {} enrollments, {} grades, {} attendance marks",
        student_count, enrollment_count, grade_count, attendance_count
    );

    Ok(())
}

// =============================================================================
// APPLY COMMAND
// =============================================================================

/// File a retake/resit request for a failed enrollment.
pub fn cmd_apply(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    enrollment: u64,
    reason: &str,
) -> Result<(), ProvostError> {
    let mut registrar = load_registrar(db_path, backend, policy_path)?;

    let request =
        registrar.apply_for_remediation(EnrollmentId(enrollment), reason, now_unix())?;

    if json_mode {
        let output = serde_json::json!({
            "request_id": request.id.0,
            "enrollment_id": request.enrollment.0,
            "class": request.class.to_string(),
            "status": request.status.to_string()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Filed {} request {} for enrollment {} (status: {})",
        request.class, request.id.0, request.enrollment.0, request.status
    );

    Ok(())
}

// =============================================================================
// DECIDE COMMAND
// =============================================================================

/// Approve or reject a pending request.
pub fn cmd_decide(
    db_path: &Path,
    backend: &str,
    policy_path: Option<&Path>,
    json_mode: bool,
    request: u64,
    outcome: &str,
) -> Result<(), ProvostError> {
    let decision = match outcome {
        "approved" => Decision::Approved,
        "rejected" => Decision::Rejected,
        other => {
            return Err(ProvostError::InvalidArgument(format!(
                "Unknown outcome: {}. Use: approved, rejected",
                other
            )));
        }
    };

    let mut registrar = load_registrar(db_path, backend, policy_path)?;
    let decided = registrar.decide_request(RequestId(request), decision)?;

    if json_mode {
        let output = serde_json::json!({
            "request_id": decided.id.0,
            "status": decided.status.to_string()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Request {} is now {}", decided.id.0, decided.status);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), ProvostError> {
    if db_path.exists() && !force {
        return Err(ProvostError::InvalidArgument(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    match backend {
        "redb" => {
            if force && db_path.exists() {
                std::fs::remove_file(db_path).map_err(|e| {
                    ProvostError::StoreUnavailable(format!("Remove old database: {}", e))
                })?;
            }
            let _store = RedbStore::open(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
            Ok(())
        }
        other => Err(ProvostError::InvalidArgument(format!(
            "Backend '{}' needs no database file; only redb can be initialized",
            other
        ))),
    }
}
