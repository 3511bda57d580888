//! # Registrar
//!
//! The engine facade: one value that owns a store backend and the
//! policy-configured scale, classifier, and attendance rule, and exposes
//! every operation a caller needs. The HTTP API and the CLI both talk to
//! the engine exclusively through this type.
//!
//! The registrar holds no clock. Operations that timestamp anything take
//! `requested_at_unix` from the caller, so the core stays deterministic
//! and replayable.

use crate::attendance::{AttendanceRule, AttendanceSummary};
use crate::gpa::{self, TermGpa};
use crate::policy::AcademicPolicy;
use crate::progression::{DegreeClassifier, DegreeProgression};
use crate::scale::GradeScale;
use crate::store::redb::RedbStore;
use crate::store::{MemoryStore, RecordStore};
use crate::types::{
    AttendanceEntry, Decision, EnrollmentId, EnrollmentRecord, FailureClass, Gpa, NewEnrollment,
    ProvostError, RequestId, RequestView, RetakeResitRequest, Score, Student, StudentId,
};
use std::path::Path;

/// Storage backend selection.
///
/// Either variant satisfies [`RecordStore`]; the enum exists so callers
/// pick a backend at construction without the registrar being generic.
#[derive(Debug)]
pub enum StoreBackend {
    /// Volatile, deterministic. The default for tests and ephemeral runs.
    InMemory(MemoryStore),
    /// redb-backed, survives restarts.
    Persistent(RedbStore),
}

impl StoreBackend {
    fn as_store(&self) -> &dyn RecordStore {
        match self {
            StoreBackend::InMemory(s) => s,
            StoreBackend::Persistent(s) => s,
        }
    }

    fn as_store_mut(&mut self) -> &mut dyn RecordStore {
        match self {
            StoreBackend::InMemory(s) => s,
            StoreBackend::Persistent(s) => s,
        }
    }
}

/// The academic-records engine.
#[derive(Debug)]
pub struct Registrar {
    backend: StoreBackend,
    scale: GradeScale,
    classifier: DegreeClassifier,
    attendance: AttendanceRule,
}

impl Registrar {
    /// In-memory registrar with the default policy.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(StoreBackend::InMemory(MemoryStore::new()), AcademicPolicy::default())
    }

    /// Persistent registrar at the given database path, default policy.
    pub fn persistent(path: impl AsRef<Path>) -> Result<Self, ProvostError> {
        Ok(Self::with_backend(
            StoreBackend::Persistent(RedbStore::open(path)?),
            AcademicPolicy::default(),
        ))
    }

    /// Registrar over an explicit backend and policy.
    #[must_use]
    pub fn with_backend(backend: StoreBackend, policy: AcademicPolicy) -> Self {
        Self {
            backend,
            scale: GradeScale::with_policy(policy.clone()),
            classifier: DegreeClassifier::with_policy(policy.clone()),
            attendance: AttendanceRule::with_policy(policy),
        }
    }

    // -------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------

    /// Register a student.
    pub fn add_student(
        &mut self,
        full_name: String,
        reg_no: String,
    ) -> Result<Student, ProvostError> {
        let trimmed_name = full_name.trim();
        let trimmed_reg = reg_no.trim();
        if trimmed_name.is_empty() || trimmed_reg.is_empty() {
            return Err(ProvostError::InvalidArgument(
                "student name and registration number must not be empty".to_string(),
            ));
        }
        self.backend
            .as_store_mut()
            .add_student(trimmed_name.to_string(), trimmed_reg.to_string())
    }

    /// Look up a student, failing on an unknown id.
    pub fn student(&self, id: StudentId) -> Result<Student, ProvostError> {
        self.backend
            .as_store()
            .student(id)?
            .ok_or(ProvostError::StudentNotFound(id))
    }

    /// Enroll a student in a course offering.
    pub fn enroll(&mut self, new: NewEnrollment) -> Result<EnrollmentRecord, ProvostError> {
        if new.credit_hours == 0 {
            return Err(ProvostError::InvalidArgument(
                "credit hours must be positive".to_string(),
            ));
        }
        if new.semester == 0 {
            return Err(ProvostError::InvalidArgument(
                "semester must be positive".to_string(),
            ));
        }
        self.backend.as_store_mut().insert_enrollment(new)
    }

    /// Look up an enrollment, failing on an unknown id.
    pub fn enrollment(&self, id: EnrollmentId) -> Result<EnrollmentRecord, ProvostError> {
        self.backend
            .as_store()
            .enrollment(id)?
            .ok_or(ProvostError::EnrollmentNotFound(id))
    }

    /// All enrollments for a student.
    pub fn enrollments(&self, id: StudentId) -> Result<Vec<EnrollmentRecord>, ProvostError> {
        self.backend.as_store().enrollments_for_student(id)
    }

    // -------------------------------------------------------------------------
    // Grading
    // -------------------------------------------------------------------------

    /// Record a score on an enrollment. The letter grade is derived from
    /// the score by the scale; callers never supply a grade directly.
    pub fn record_grade(
        &mut self,
        id: EnrollmentId,
        score: Score,
    ) -> Result<EnrollmentRecord, ProvostError> {
        let grade = self.scale.grade_of(score);
        self.backend.as_store_mut().record_grade(id, score, grade)
    }

    /// The remediation path for an enrollment's recorded score, if any.
    pub fn classify_failure(&self, id: EnrollmentId) -> Result<Option<FailureClass>, ProvostError> {
        let record = self.enrollment(id)?;
        Ok(self.scale.failure_class_of(record.score))
    }

    // -------------------------------------------------------------------------
    // GPA and progression
    // -------------------------------------------------------------------------

    /// GPA for one (year, semester) term. F credits count at zero points.
    pub fn semester_gpa(
        &self,
        student: StudentId,
        year: u16,
        semester: u8,
    ) -> Result<Gpa, ProvostError> {
        let records: Vec<EnrollmentRecord> = self
            .enrollments(student)?
            .into_iter()
            .filter(|r| r.year == year && r.semester == semester)
            .collect();
        Ok(gpa::semester_gpa(&records, &self.scale))
    }

    /// Cumulative GPA and accumulated credits. F grades excluded entirely.
    pub fn cumulative_gpa(&self, student: StudentId) -> Result<(Gpa, u32), ProvostError> {
        let records = self.enrollments(student)?;
        Ok(gpa::cumulative_gpa(&records, &self.scale))
    }

    /// Per-term GPA history, ascending by (year, semester).
    pub fn gpa_history(&self, student: StudentId) -> Result<Vec<TermGpa>, ProvostError> {
        let records = self.enrollments(student)?;
        Ok(gpa::gpa_history(&records, &self.scale))
    }

    /// Degree progression standing: cumulative GPA, credits, classification.
    pub fn degree_progression(
        &self,
        student: StudentId,
    ) -> Result<DegreeProgression, ProvostError> {
        let records = self.enrollments(student)?;
        Ok(self.classifier.progression(&records, &self.scale))
    }

    // -------------------------------------------------------------------------
    // Attendance
    // -------------------------------------------------------------------------

    /// Record one attendance mark. Re-marking the same date overwrites.
    pub fn mark_attendance(
        &mut self,
        enrollment: EnrollmentId,
        entry: AttendanceEntry,
    ) -> Result<AttendanceSummary, ProvostError> {
        self.backend
            .as_store_mut()
            .upsert_attendance(enrollment, entry)?;
        self.attendance_summary(enrollment)
    }

    /// Attendance standing for an enrollment.
    pub fn attendance_summary(
        &self,
        enrollment: EnrollmentId,
    ) -> Result<AttendanceSummary, ProvostError> {
        let record = self.enrollment(enrollment)?;
        let entries = self.backend.as_store().attendance_for(enrollment)?;
        Ok(self.attendance.summarize(record.credit_hours, &entries))
    }

    /// Raw attendance entries for an enrollment, ascending by date.
    pub fn attendance_entries(
        &self,
        enrollment: EnrollmentId,
    ) -> Result<Vec<AttendanceEntry>, ProvostError> {
        self.backend.as_store().attendance_for(enrollment)
    }

    // -------------------------------------------------------------------------
    // Retake/resit lifecycle
    // -------------------------------------------------------------------------

    /// Apply for remediation on a failed enrollment.
    ///
    /// The failure class is derived from the recorded score, never chosen
    /// by the caller. `requested_at_unix` is supplied by the caller; the
    /// engine keeps no clock.
    pub fn apply_for_remediation(
        &mut self,
        enrollment: EnrollmentId,
        reason: &str,
        requested_at_unix: u64,
    ) -> Result<RetakeResitRequest, ProvostError> {
        let record = self.enrollment(enrollment)?;
        let (class, trimmed) = crate::lifecycle::classify_application(&self.scale, &record, reason)?;
        self.backend
            .as_store_mut()
            .insert_request(enrollment, class, trimmed, requested_at_unix)
    }

    /// Decide a pending request. Single-shot; see the store's CAS contract.
    pub fn decide_request(
        &mut self,
        id: RequestId,
        decision: Decision,
    ) -> Result<RetakeResitRequest, ProvostError> {
        self.backend.as_store_mut().decide_request(id, decision)
    }

    /// A student's requests joined with display fields, newest first.
    pub fn requests_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<RequestView>, ProvostError> {
        let requests = self.backend.as_store().requests_for_student(student)?;
        self.join_requests(requests)
    }

    /// A department's requests joined with display fields, newest first.
    pub fn requests_for_department(
        &self,
        department: &str,
    ) -> Result<Vec<RequestView>, ProvostError> {
        let requests = self
            .backend
            .as_store()
            .requests_for_department(department)?;
        self.join_requests(requests)
    }

    fn join_requests(
        &self,
        requests: Vec<RetakeResitRequest>,
    ) -> Result<Vec<RequestView>, ProvostError> {
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            let record = self.enrollment(request.enrollment)?;
            let student = self.student(record.student)?;
            views.push(RequestView {
                id: request.id,
                enrollment: request.enrollment,
                class: request.class,
                reason: request.reason,
                status: request.status,
                requested_at_unix: request.requested_at_unix,
                course_code: record.course_code,
                course_name: record.course_name,
                full_name: student.full_name,
                reg_no: student.reg_no,
            });
        }
        Ok(views)
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Whether the backend persists across restarts.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StoreBackend::Persistent(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Classification;
    use crate::types::{AttendanceStatus, ClassDate, Grade, RequestStatus};

    fn seed(registrar: &mut Registrar) -> (Student, EnrollmentRecord) {
        let student = registrar
            .add_student("Ada Obi".to_string(), "CSC/2023/001".to_string())
            .expect("student");
        let enrollment = registrar
            .enroll(NewEnrollment {
                student: student.id,
                course_code: "CS101".to_string(),
                course_name: "Intro to Computing".to_string(),
                credit_hours: 3,
                year: 1,
                semester: 1,
                department: "Computing".to_string(),
            })
            .expect("enrollment");
        (student, enrollment)
    }

    #[test]
    fn grade_is_derived_from_score() {
        let mut registrar = Registrar::in_memory();
        let (_, enrollment) = seed(&mut registrar);

        let graded = registrar
            .record_grade(enrollment.id, Score::from_marks(69).expect("score"))
            .expect("grade");
        assert_eq!(graded.grade, Some(Grade::B));

        let regraded = registrar
            .record_grade(enrollment.id, Score::from_marks(70).expect("score"))
            .expect("grade");
        assert_eq!(regraded.grade, Some(Grade::A));
    }

    #[test]
    fn validation_happens_before_the_store() {
        let mut registrar = Registrar::in_memory();
        let (student, _) = seed(&mut registrar);

        assert!(matches!(
            registrar.add_student("  ".to_string(), "REG".to_string()),
            Err(ProvostError::InvalidArgument(_))
        ));
        assert!(matches!(
            registrar.enroll(NewEnrollment {
                student: student.id,
                course_code: "CS102".to_string(),
                course_name: "Data Structures".to_string(),
                credit_hours: 0,
                year: 1,
                semester: 1,
                department: "Computing".to_string(),
            }),
            Err(ProvostError::InvalidArgument(_))
        ));
    }

    #[test]
    fn semester_and_cumulative_scopes() {
        let mut registrar = Registrar::in_memory();
        let (student, first) = seed(&mut registrar);
        let second = registrar
            .enroll(NewEnrollment {
                student: student.id,
                course_code: "CS201".to_string(),
                course_name: "Algorithms".to_string(),
                credit_hours: 4,
                year: 1,
                semester: 2,
                department: "Computing".to_string(),
            })
            .expect("enrollment");

        registrar
            .record_grade(first.id, Score::from_marks(75).expect("score"))
            .expect("grade");
        registrar
            .record_grade(second.id, Score::from_marks(62).expect("score"))
            .expect("grade");

        assert_eq!(
            registrar.semester_gpa(student.id, 1, 1).expect("gpa"),
            Gpa(400)
        );
        assert_eq!(
            registrar.semester_gpa(student.id, 1, 2).expect("gpa"),
            Gpa(300)
        );
        // Cumulative: (4*3 + 3*4) / 7 = 3.43
        assert_eq!(
            registrar.cumulative_gpa(student.id).expect("gpa"),
            (Gpa(343), 7)
        );

        let history = registrar.gpa_history(student.id).expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].gpa, Gpa(400));

        let progression = registrar.degree_progression(student.id).expect("progression");
        assert_eq!(progression.classification, Classification::SecondClassUpper);
    }

    #[test]
    fn attendance_flow() {
        let mut registrar = Registrar::in_memory();
        let (_, enrollment) = seed(&mut registrar);

        let summary = registrar
            .mark_attendance(
                enrollment.id,
                AttendanceEntry {
                    date: "2026-03-02".parse::<ClassDate>().expect("date"),
                    status: AttendanceStatus::Present,
                    duration: 30,
                },
            )
            .expect("mark");
        // 30 of 42 expected hours
        assert_eq!(summary.expected_hours, 42);
        assert_eq!(summary.percent, 71);
        assert!(summary.eligible);
    }

    #[test]
    fn remediation_lifecycle_end_to_end() {
        let mut registrar = Registrar::in_memory();
        let (student, enrollment) = seed(&mut registrar);

        registrar
            .record_grade(enrollment.id, Score::from_marks(37).expect("score"))
            .expect("grade");
        assert_eq!(
            registrar.classify_failure(enrollment.id).expect("classify"),
            Some(FailureClass::Retake)
        );

        let request = registrar
            .apply_for_remediation(enrollment.id, "missed the final", 1_760_000_000)
            .expect("apply");
        assert_eq!(request.class, FailureClass::Retake);
        assert_eq!(request.status, RequestStatus::Pending);

        let views = registrar.requests_for_student(student.id).expect("views");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].course_code, "CS101");
        assert_eq!(views[0].full_name, "Ada Obi");

        let decided = registrar
            .decide_request(request.id, Decision::Approved)
            .expect("decide");
        assert_eq!(decided.status, RequestStatus::Approved);
        assert!(matches!(
            registrar.decide_request(request.id, Decision::Approved),
            Err(ProvostError::InvalidTransition(_))
        ));
    }

    #[test]
    fn passing_score_cannot_apply() {
        let mut registrar = Registrar::in_memory();
        let (_, enrollment) = seed(&mut registrar);
        registrar
            .record_grade(enrollment.id, Score::from_marks(55).expect("score"))
            .expect("grade");
        assert!(matches!(
            registrar.apply_for_remediation(enrollment.id, "please", 1),
            Err(ProvostError::IneligibleForRemediation)
        ));
    }

    #[test]
    fn department_views_joined() {
        let mut registrar = Registrar::in_memory();
        let (_, enrollment) = seed(&mut registrar);
        registrar
            .record_grade(enrollment.id, Score::from_marks(20).expect("score"))
            .expect("grade");
        registrar
            .apply_for_remediation(enrollment.id, "hospitalized", 5)
            .expect("apply");

        let views = registrar
            .requests_for_department("Computing")
            .expect("views");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].class, FailureClass::Resit);
        assert_eq!(views[0].reg_no, "CSC/2023/001");
    }
}
