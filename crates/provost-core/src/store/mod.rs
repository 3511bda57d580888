//! # Record Store
//!
//! Storage abstraction for the academic record: students, enrollments,
//! attendance marks, and retake/resit requests.
//!
//! [`RecordStore`] is the seam between the pure engine and whatever holds
//! the data. [`MemoryStore`] is the deterministic in-memory backend
//! (BTreeMap only, no hashing); the redb-backed [`RedbStore`] in the
//! sibling module persists the same shape to disk.
//!
//! The one operation with concurrency semantics is `decide_request`: it
//! must be a compare-and-set against `Pending`, so two racing decisions
//! on the same request yield exactly one success.
//!
//! [`RedbStore`]: crate::store::redb::RedbStore

pub mod redb;

use crate::lifecycle;
use crate::types::{
    AttendanceEntry, ClassDate, Decision, EnrollmentId, EnrollmentRecord, FailureClass, Grade,
    NewEnrollment, ProvostError, RequestId, RetakeResitRequest, Score, Student, StudentId,
};
use std::collections::BTreeMap;

/// Storage backend for academic records.
///
/// All operations are fallible so persistent backends can surface I/O
/// failures as [`ProvostError::StoreUnavailable`]; the in-memory backend
/// never produces that variant.
pub trait RecordStore {
    /// Register a student, assigning the next id.
    fn add_student(&mut self, full_name: String, reg_no: String) -> Result<Student, ProvostError>;

    /// Look up a student by id.
    fn student(&self, id: StudentId) -> Result<Option<Student>, ProvostError>;

    /// Create an enrollment for an existing student, assigning the next id.
    /// The record starts ungraded.
    ///
    /// # Errors
    ///
    /// [`ProvostError::StudentNotFound`] if the student is unknown.
    fn insert_enrollment(&mut self, new: NewEnrollment) -> Result<EnrollmentRecord, ProvostError>;

    /// Look up an enrollment by id.
    fn enrollment(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, ProvostError>;

    /// All enrollments for a student, ascending by enrollment id.
    ///
    /// # Errors
    ///
    /// [`ProvostError::StudentNotFound`] if the student is unknown; an
    /// unknown student is an error, never an empty record set.
    fn enrollments_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<EnrollmentRecord>, ProvostError>;

    /// Record or overwrite the score and grade on an enrollment.
    fn record_grade(
        &mut self,
        id: EnrollmentId,
        score: Score,
        grade: Grade,
    ) -> Result<EnrollmentRecord, ProvostError>;

    /// All attendance entries for an enrollment, ascending by date.
    fn attendance_for(&self, id: EnrollmentId) -> Result<Vec<AttendanceEntry>, ProvostError>;

    /// Insert or overwrite the attendance mark for `(enrollment, date)`.
    /// Last write wins.
    fn upsert_attendance(
        &mut self,
        id: EnrollmentId,
        entry: AttendanceEntry,
    ) -> Result<(), ProvostError>;

    /// Create a pending retake/resit request, assigning the next id.
    fn insert_request(
        &mut self,
        enrollment: EnrollmentId,
        class: FailureClass,
        reason: String,
        requested_at_unix: u64,
    ) -> Result<RetakeResitRequest, ProvostError>;

    /// Look up a request by id.
    fn request(&self, id: RequestId) -> Result<Option<RetakeResitRequest>, ProvostError>;

    /// Requests across a student's enrollments, most recent first.
    fn requests_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError>;

    /// Requests across a department's enrollments, most recent first.
    fn requests_for_department(
        &self,
        department: &str,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError>;

    /// Decide a pending request. Compare-and-set: the transition is applied
    /// only if the stored status is still `Pending` at write time.
    ///
    /// # Errors
    ///
    /// - [`ProvostError::RequestNotFound`] for an unknown id.
    /// - [`ProvostError::InvalidTransition`] if the request was already
    ///   decided, including by a racing caller.
    fn decide_request(
        &mut self,
        id: RequestId,
        decision: Decision,
    ) -> Result<RetakeResitRequest, ProvostError>;
}

/// Most recent `requested_at` first; ties broken by id, newest first.
pub(crate) fn sort_requests_newest_first(requests: &mut [RetakeResitRequest]) {
    requests.sort_by(|a, b| {
        b.requested_at_unix
            .cmp(&a.requested_at_unix)
            .then(b.id.cmp(&a.id))
    });
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Deterministic in-memory backend.
///
/// BTreeMap throughout so iteration order is stable; ids are dense
/// counters starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    students: BTreeMap<StudentId, Student>,
    enrollments: BTreeMap<EnrollmentId, EnrollmentRecord>,
    /// Student -> enrollment index, maintained on insert.
    by_student: BTreeMap<StudentId, Vec<EnrollmentId>>,
    /// Composite key gives per-enrollment range scans in date order and
    /// makes the per-date upsert a plain map insert.
    attendance: BTreeMap<(EnrollmentId, ClassDate), AttendanceEntry>,
    requests: BTreeMap<RequestId, RetakeResitRequest>,
    next_student_id: u64,
    next_enrollment_id: u64,
    next_request_id: u64,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered students.
    #[must_use]
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// Number of enrollments.
    #[must_use]
    pub fn enrollment_count(&self) -> usize {
        self.enrollments.len()
    }

    /// Number of retake/resit requests, in any state.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }
}

impl RecordStore for MemoryStore {
    fn add_student(&mut self, full_name: String, reg_no: String) -> Result<Student, ProvostError> {
        self.next_student_id = self.next_student_id.saturating_add(1);
        let student = Student {
            id: StudentId(self.next_student_id),
            full_name,
            reg_no,
        };
        self.students.insert(student.id, student.clone());
        Ok(student)
    }

    fn student(&self, id: StudentId) -> Result<Option<Student>, ProvostError> {
        Ok(self.students.get(&id).cloned())
    }

    fn insert_enrollment(&mut self, new: NewEnrollment) -> Result<EnrollmentRecord, ProvostError> {
        if !self.students.contains_key(&new.student) {
            return Err(ProvostError::StudentNotFound(new.student));
        }

        self.next_enrollment_id = self.next_enrollment_id.saturating_add(1);
        let record = EnrollmentRecord {
            id: EnrollmentId(self.next_enrollment_id),
            student: new.student,
            course_code: new.course_code,
            course_name: new.course_name,
            credit_hours: new.credit_hours,
            year: new.year,
            semester: new.semester,
            department: new.department,
            score: None,
            grade: None,
        };
        self.by_student
            .entry(record.student)
            .or_default()
            .push(record.id);
        self.enrollments.insert(record.id, record.clone());
        Ok(record)
    }

    fn enrollment(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, ProvostError> {
        Ok(self.enrollments.get(&id).cloned())
    }

    fn enrollments_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<EnrollmentRecord>, ProvostError> {
        if !self.students.contains_key(&id) {
            return Err(ProvostError::StudentNotFound(id));
        }
        let ids = self.by_student.get(&id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(ids
            .iter()
            .filter_map(|eid| self.enrollments.get(eid).cloned())
            .collect())
    }

    fn record_grade(
        &mut self,
        id: EnrollmentId,
        score: Score,
        grade: Grade,
    ) -> Result<EnrollmentRecord, ProvostError> {
        let record = self
            .enrollments
            .get_mut(&id)
            .ok_or(ProvostError::EnrollmentNotFound(id))?;
        record.score = Some(score);
        record.grade = Some(grade);
        Ok(record.clone())
    }

    fn attendance_for(&self, id: EnrollmentId) -> Result<Vec<AttendanceEntry>, ProvostError> {
        if !self.enrollments.contains_key(&id) {
            return Err(ProvostError::EnrollmentNotFound(id));
        }
        let min = ClassDate {
            year: 0,
            month: 1,
            day: 1,
        };
        let max = ClassDate {
            year: u16::MAX,
            month: 12,
            day: 31,
        };
        Ok(self
            .attendance
            .range((id, min)..=(id, max))
            .map(|(_, entry)| *entry)
            .collect())
    }

    fn upsert_attendance(
        &mut self,
        id: EnrollmentId,
        entry: AttendanceEntry,
    ) -> Result<(), ProvostError> {
        if !self.enrollments.contains_key(&id) {
            return Err(ProvostError::EnrollmentNotFound(id));
        }
        self.attendance.insert((id, entry.date), entry);
        Ok(())
    }

    fn insert_request(
        &mut self,
        enrollment: EnrollmentId,
        class: FailureClass,
        reason: String,
        requested_at_unix: u64,
    ) -> Result<RetakeResitRequest, ProvostError> {
        if !self.enrollments.contains_key(&enrollment) {
            return Err(ProvostError::EnrollmentNotFound(enrollment));
        }

        self.next_request_id = self.next_request_id.saturating_add(1);
        let request = RetakeResitRequest {
            id: RequestId(self.next_request_id),
            enrollment,
            class,
            reason,
            status: crate::types::RequestStatus::Pending,
            requested_at_unix,
        };
        self.requests.insert(request.id, request.clone());
        Ok(request)
    }

    fn request(&self, id: RequestId) -> Result<Option<RetakeResitRequest>, ProvostError> {
        Ok(self.requests.get(&id).cloned())
    }

    fn requests_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError> {
        if !self.students.contains_key(&id) {
            return Err(ProvostError::StudentNotFound(id));
        }
        let mut out: Vec<RetakeResitRequest> = self
            .requests
            .values()
            .filter(|r| {
                self.enrollments
                    .get(&r.enrollment)
                    .is_some_and(|e| e.student == id)
            })
            .cloned()
            .collect();
        sort_requests_newest_first(&mut out);
        Ok(out)
    }

    fn requests_for_department(
        &self,
        department: &str,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError> {
        let mut out: Vec<RetakeResitRequest> = self
            .requests
            .values()
            .filter(|r| {
                self.enrollments
                    .get(&r.enrollment)
                    .is_some_and(|e| e.department == department)
            })
            .cloned()
            .collect();
        sort_requests_newest_first(&mut out);
        Ok(out)
    }

    fn decide_request(
        &mut self,
        id: RequestId,
        decision: Decision,
    ) -> Result<RetakeResitRequest, ProvostError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(ProvostError::RequestNotFound(id))?;
        request.status = lifecycle::transition(id, request.status, decision)?;
        Ok(request.clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttendanceStatus, RequestStatus};

    fn enrollment_for(store: &mut MemoryStore, student: StudentId) -> EnrollmentRecord {
        store
            .insert_enrollment(NewEnrollment {
                student,
                course_code: "CS101".to_string(),
                course_name: "Intro to Computing".to_string(),
                credit_hours: 3,
                year: 1,
                semester: 1,
                department: "Computing".to_string(),
            })
            .expect("enrollment")
    }

    #[test]
    fn students_get_sequential_ids() {
        let mut store = MemoryStore::new();
        let a = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let b = store
            .add_student("Ben".to_string(), "REG002".to_string())
            .expect("add");
        assert_eq!(a.id, StudentId(1));
        assert_eq!(b.id, StudentId(2));
        assert_eq!(store.student_count(), 2);
    }

    #[test]
    fn enrollment_requires_known_student() {
        let mut store = MemoryStore::new();
        let err = store.insert_enrollment(NewEnrollment {
            student: StudentId(99),
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            credit_hours: 3,
            year: 1,
            semester: 1,
            department: "Computing".to_string(),
        });
        assert!(matches!(err, Err(ProvostError::StudentNotFound(_))));
    }

    #[test]
    fn unknown_student_listing_is_an_error_not_empty() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.enrollments_for_student(StudentId(1)),
            Err(ProvostError::StudentNotFound(_))
        ));
        assert!(matches!(
            store.requests_for_student(StudentId(1)),
            Err(ProvostError::StudentNotFound(_))
        ));
    }

    #[test]
    fn grade_recording_overwrites() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let e = enrollment_for(&mut store, s.id);
        assert!(e.score.is_none());

        let graded = store
            .record_grade(e.id, Score::from_marks(62).expect("score"), Grade::B)
            .expect("grade");
        assert_eq!(graded.grade, Some(Grade::B));

        let regraded = store
            .record_grade(e.id, Score::from_marks(71).expect("score"), Grade::A)
            .expect("regrade");
        assert_eq!(regraded.grade, Some(Grade::A));
    }

    #[test]
    fn attendance_upsert_by_date_last_write_wins() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let e = enrollment_for(&mut store, s.id);
        let date: ClassDate = "2026-03-02".parse().expect("date");

        store
            .upsert_attendance(
                e.id,
                AttendanceEntry {
                    date,
                    status: AttendanceStatus::Absent,
                    duration: 2,
                },
            )
            .expect("upsert");
        store
            .upsert_attendance(
                e.id,
                AttendanceEntry {
                    date,
                    status: AttendanceStatus::Present,
                    duration: 3,
                },
            )
            .expect("upsert");

        let entries = store.attendance_for(e.id).expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AttendanceStatus::Present);
        assert_eq!(entries[0].duration, 3);
    }

    #[test]
    fn attendance_listed_in_date_order() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let e = enrollment_for(&mut store, s.id);

        for day in ["2026-03-09", "2026-03-02", "2026-03-16"] {
            store
                .upsert_attendance(
                    e.id,
                    AttendanceEntry {
                        date: day.parse().expect("date"),
                        status: AttendanceStatus::Present,
                        duration: 2,
                    },
                )
                .expect("upsert");
        }

        let dates: Vec<String> = store
            .attendance_for(e.id)
            .expect("entries")
            .iter()
            .map(|a| a.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-09", "2026-03-16"]);
    }

    #[test]
    fn requests_sorted_newest_first() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let e = enrollment_for(&mut store, s.id);

        store
            .insert_request(e.id, FailureClass::Resit, "first".to_string(), 100)
            .expect("request");
        store
            .insert_request(e.id, FailureClass::Resit, "second".to_string(), 300)
            .expect("request");
        store
            .insert_request(e.id, FailureClass::Resit, "third".to_string(), 200)
            .expect("request");

        let reasons: Vec<String> = store
            .requests_for_student(s.id)
            .expect("requests")
            .into_iter()
            .map(|r| r.reason)
            .collect();
        assert_eq!(reasons, vec!["second", "third", "first"]);
    }

    #[test]
    fn department_listing_scoped() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let computing = enrollment_for(&mut store, s.id);
        let physics = store
            .insert_enrollment(NewEnrollment {
                student: s.id,
                course_code: "PH101".to_string(),
                course_name: "Mechanics".to_string(),
                credit_hours: 3,
                year: 1,
                semester: 1,
                department: "Physics".to_string(),
            })
            .expect("enrollment");

        store
            .insert_request(computing.id, FailureClass::Resit, "a".to_string(), 1)
            .expect("request");
        store
            .insert_request(physics.id, FailureClass::Retake, "b".to_string(), 2)
            .expect("request");

        let physics_reqs = store.requests_for_department("Physics").expect("requests");
        assert_eq!(physics_reqs.len(), 1);
        assert_eq!(physics_reqs[0].class, FailureClass::Retake);

        assert!(store
            .requests_for_department("History")
            .expect("requests")
            .is_empty());
    }

    #[test]
    fn decide_is_single_shot() {
        let mut store = MemoryStore::new();
        let s = store
            .add_student("Ada".to_string(), "REG001".to_string())
            .expect("add");
        let e = enrollment_for(&mut store, s.id);
        let r = store
            .insert_request(e.id, FailureClass::Retake, "reason".to_string(), 1)
            .expect("request");
        assert_eq!(r.status, RequestStatus::Pending);

        let decided = store
            .decide_request(r.id, Decision::Approved)
            .expect("decide");
        assert_eq!(decided.status, RequestStatus::Approved);

        assert!(matches!(
            store.decide_request(r.id, Decision::Rejected),
            Err(ProvostError::InvalidTransition(_))
        ));
        // The first decision stands.
        let stored = store.request(r.id).expect("lookup").expect("present");
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[test]
    fn decide_unknown_request() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.decide_request(RequestId(404), Decision::Approved),
            Err(ProvostError::RequestNotFound(_))
        ));
    }
}
