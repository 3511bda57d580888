//! # redb-backed Record Storage
//!
//! A disk-backed [`RecordStore`] using the redb embedded database:
//! ACID transactions, crash safety (copy-on-write B-trees), MVCC, zero
//! configuration.
//!
//! Values are postcard-encoded. Id counters live in the metadata table
//! and are committed in the same transaction as the row they number, so
//! a crash can never reuse an id. The student-to-enrollments index is
//! kept in memory and rebuilt from the enrollments table on open.
//!
//! `decide_request` reads and rewrites the request inside a single write
//! transaction; redb's single-writer model makes that the compare-and-set
//! the lifecycle requires.

use crate::lifecycle;
use crate::store::{sort_requests_newest_first, RecordStore};
use crate::types::{
    AttendanceEntry, Decision, EnrollmentId, EnrollmentRecord, FailureClass, Grade,
    NewEnrollment, ProvostError, RequestId, RequestStatus, RetakeResitRequest, Score, Student,
    StudentId,
};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

/// Table for students: StudentId(u64) -> serialized Student bytes
const STUDENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("students");

/// Table for enrollments: EnrollmentId(u64) -> serialized EnrollmentRecord bytes
const ENROLLMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("enrollments");

/// Table for attendance: (enrollment_id, packed date) -> serialized AttendanceEntry.
/// The packed date sorts chronologically, so per-enrollment range scans
/// come back in date order.
const ATTENDANCE: TableDefinition<(u64, u32), &[u8]> = TableDefinition::new("attendance");

/// Table for requests: RequestId(u64) -> serialized RetakeResitRequest bytes
const REQUESTS: TableDefinition<u64, &[u8]> = TableDefinition::new("requests");

/// Table for metadata: key string -> value u64 (id counters)
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

fn io_err(e: impl std::fmt::Display) -> ProvostError {
    ProvostError::StoreUnavailable(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ProvostError> {
    postcard::to_allocvec(value).map_err(|e| ProvostError::SerializationError(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ProvostError> {
    postcard::from_bytes(bytes).map_err(|e| ProvostError::SerializationError(e.to_string()))
}

/// A disk-backed record store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// In-memory student -> enrollments index, rebuilt on open.
    by_student: BTreeMap<StudentId, Vec<EnrollmentId>>,
    next_student_id: u64,
    next_enrollment_id: u64,
    next_request_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("indexed_students", &self.by_student.len())
            .field("next_student_id", &self.next_student_id)
            .field("next_enrollment_id", &self.next_enrollment_id)
            .field("next_request_id", &self.next_request_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a record database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProvostError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(STUDENTS).map_err(io_err)?;
            let _ = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let _ = write_txn.open_table(ATTENDANCE).map_err(io_err)?;
            let _ = write_txn.open_table(REQUESTS).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let read_txn = db.begin_read().map_err(io_err)?;

        let (next_student_id, next_enrollment_id, next_request_id) = {
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            let fetch = |key: &str| -> Result<u64, ProvostError> {
                Ok(table.get(key).map_err(io_err)?.map(|v| v.value()).unwrap_or(0))
            };
            (
                fetch("next_student_id")?,
                fetch("next_enrollment_id")?,
                fetch("next_request_id")?,
            )
        };

        // Rebuild the student index from the enrollments table.
        let by_student = {
            let table = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut index: BTreeMap<StudentId, Vec<EnrollmentId>> = BTreeMap::new();
            for entry in table.iter().map_err(io_err)? {
                let (_, value) = entry.map_err(io_err)?;
                let record: EnrollmentRecord = decode(value.value())?;
                index.entry(record.student).or_default().push(record.id);
            }
            index
        };

        Ok(Self {
            db,
            by_student,
            next_student_id,
            next_enrollment_id,
            next_request_id,
        })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), ProvostError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    fn read_student(&self, id: StudentId) -> Result<Option<Student>, ProvostError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(STUDENTS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn read_enrollment(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, ProvostError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// Scan all requests, filter, and sort newest first. Request volumes
    /// are decisions made by humans; a full scan is fine at this scale.
    fn filtered_requests<F>(&self, keep: F) -> Result<Vec<RetakeResitRequest>, ProvostError>
    where
        F: Fn(&RetakeResitRequest) -> bool,
    {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(REQUESTS).map_err(io_err)?;

        let mut out = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            let request: RetakeResitRequest = decode(value.value())?;
            if keep(&request) {
                out.push(request);
            }
        }
        sort_requests_newest_first(&mut out);
        Ok(out)
    }
}

// =============================================================================
// RECORDSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl RecordStore for RedbStore {
    fn add_student(&mut self, full_name: String, reg_no: String) -> Result<Student, ProvostError> {
        let next_id = self.next_student_id.saturating_add(1);
        let student = Student {
            id: StudentId(next_id),
            full_name,
            reg_no,
        };
        let bytes = encode(&student)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(STUDENTS).map_err(io_err)?;
            table.insert(student.id.0, bytes.as_slice()).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert("next_student_id", next_id).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_student_id = next_id;
        Ok(student)
    }

    fn student(&self, id: StudentId) -> Result<Option<Student>, ProvostError> {
        self.read_student(id)
    }

    fn insert_enrollment(&mut self, new: NewEnrollment) -> Result<EnrollmentRecord, ProvostError> {
        if self.read_student(new.student)?.is_none() {
            return Err(ProvostError::StudentNotFound(new.student));
        }

        let next_id = self.next_enrollment_id.saturating_add(1);
        let record = EnrollmentRecord {
            id: EnrollmentId(next_id),
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
        let bytes = encode(&record)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            table.insert(record.id.0, bytes.as_slice()).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert("next_enrollment_id", next_id).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        // Update in-memory state only after successful commit.
        self.next_enrollment_id = next_id;
        self.by_student
            .entry(record.student)
            .or_default()
            .push(record.id);
        Ok(record)
    }

    fn enrollment(&self, id: EnrollmentId) -> Result<Option<EnrollmentRecord>, ProvostError> {
        self.read_enrollment(id)
    }

    fn enrollments_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<EnrollmentRecord>, ProvostError> {
        if self.read_student(id)?.is_none() {
            return Err(ProvostError::StudentNotFound(id));
        }
        let ids = self.by_student.get(&id).map(Vec::as_slice).unwrap_or(&[]);

        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;
        let mut records = Vec::with_capacity(ids.len());
        for eid in ids {
            if let Some(data) = table.get(eid.0).map_err(io_err)? {
                records.push(decode(data.value())?);
            }
        }
        Ok(records)
    }

    fn record_grade(
        &mut self,
        id: EnrollmentId,
        score: Score,
        grade: Grade,
    ) -> Result<EnrollmentRecord, ProvostError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let record = {
            let mut table = write_txn.open_table(ENROLLMENTS).map_err(io_err)?;
            let mut record: EnrollmentRecord = match table.get(id.0).map_err(io_err)? {
                Some(data) => decode(data.value())?,
                None => return Err(ProvostError::EnrollmentNotFound(id)),
            };
            record.score = Some(score);
            record.grade = Some(grade);
            let bytes = encode(&record)?;
            table.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            record
        };
        write_txn.commit().map_err(io_err)?;
        Ok(record)
    }

    fn attendance_for(&self, id: EnrollmentId) -> Result<Vec<AttendanceEntry>, ProvostError> {
        if self.read_enrollment(id)?.is_none() {
            return Err(ProvostError::EnrollmentNotFound(id));
        }

        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(ATTENDANCE).map_err(io_err)?;

        let mut entries = Vec::new();
        for entry in table
            .range((id.0, 0u32)..=(id.0, u32::MAX))
            .map_err(io_err)?
        {
            let (_, value) = entry.map_err(io_err)?;
            entries.push(decode(value.value())?);
        }
        Ok(entries)
    }

    fn upsert_attendance(
        &mut self,
        id: EnrollmentId,
        entry: AttendanceEntry,
    ) -> Result<(), ProvostError> {
        if self.read_enrollment(id)?.is_none() {
            return Err(ProvostError::EnrollmentNotFound(id));
        }
        let bytes = encode(&entry)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(ATTENDANCE).map_err(io_err)?;
            table
                .insert((id.0, entry.date.packed()), bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn insert_request(
        &mut self,
        enrollment: EnrollmentId,
        class: FailureClass,
        reason: String,
        requested_at_unix: u64,
    ) -> Result<RetakeResitRequest, ProvostError> {
        if self.read_enrollment(enrollment)?.is_none() {
            return Err(ProvostError::EnrollmentNotFound(enrollment));
        }

        let next_id = self.next_request_id.saturating_add(1);
        let request = RetakeResitRequest {
            id: RequestId(next_id),
            enrollment,
            class,
            reason,
            status: RequestStatus::Pending,
            requested_at_unix,
        };
        let bytes = encode(&request)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(REQUESTS).map_err(io_err)?;
            table.insert(request.id.0, bytes.as_slice()).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert("next_request_id", next_id).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_request_id = next_id;
        Ok(request)
    }

    fn request(&self, id: RequestId) -> Result<Option<RetakeResitRequest>, ProvostError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(REQUESTS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn requests_for_student(
        &self,
        id: StudentId,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError> {
        if self.read_student(id)?.is_none() {
            return Err(ProvostError::StudentNotFound(id));
        }
        let enrollment_ids: Vec<EnrollmentId> =
            self.by_student.get(&id).cloned().unwrap_or_default();
        self.filtered_requests(|r| enrollment_ids.contains(&r.enrollment))
    }

    fn requests_for_department(
        &self,
        department: &str,
    ) -> Result<Vec<RetakeResitRequest>, ProvostError> {
        // Resolve the department per request via its enrollment.
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let enrollments = read_txn.open_table(ENROLLMENTS).map_err(io_err)?;
        let requests = read_txn.open_table(REQUESTS).map_err(io_err)?;

        let mut out = Vec::new();
        for entry in requests.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            let request: RetakeResitRequest = decode(value.value())?;
            let Some(data) = enrollments.get(request.enrollment.0).map_err(io_err)? else {
                continue;
            };
            let record: EnrollmentRecord = decode(data.value())?;
            if record.department == department {
                out.push(request);
            }
        }
        sort_requests_newest_first(&mut out);
        Ok(out)
    }

    fn decide_request(
        &mut self,
        id: RequestId,
        decision: Decision,
    ) -> Result<RetakeResitRequest, ProvostError> {
        // Read-check-write inside one write transaction: redb allows a
        // single writer, so the status observed here cannot change before
        // the commit. Two racing decisions serialize; the loser sees a
        // non-pending status and gets InvalidTransition.
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let request = {
            let mut table = write_txn.open_table(REQUESTS).map_err(io_err)?;
            let mut request: RetakeResitRequest = match table.get(id.0).map_err(io_err)? {
                Some(data) => decode(data.value())?,
                None => return Err(ProvostError::RequestNotFound(id)),
            };
            request.status = lifecycle::transition(id, request.status, decision)?;
            let bytes = encode(&request)?;
            table.insert(id.0, bytes.as_slice()).map_err(io_err)?;
            request
        };
        write_txn.commit().map_err(io_err)?;
        Ok(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{AttendanceStatus, ClassDate};
    use tempfile::tempdir;

    fn seed_enrollment(store: &mut RedbStore) -> (Student, EnrollmentRecord) {
        let student = store
            .add_student("Ada Obi".to_string(), "REG001".to_string())
            .expect("student");
        let enrollment = store
            .insert_enrollment(NewEnrollment {
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
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");

        let (student, enrollment) = seed_enrollment(&mut store);
        assert_eq!(student.id, StudentId(1));
        assert_eq!(enrollment.id, EnrollmentId(1));

        let found = store.enrollment(enrollment.id).expect("lookup");
        assert_eq!(found.map(|e| e.course_code), Some("CS101".to_string()));
    }

    #[test]
    fn persistence_across_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        let (student_id, enrollment_id);
        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            let (student, enrollment) = seed_enrollment(&mut store);
            student_id = student.id;
            enrollment_id = enrollment.id;
            store
                .record_grade(enrollment.id, Score::from_marks(62).expect("score"), Grade::B)
                .expect("grade");
        }
        // Store dropped here, simulating process exit

        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            let records = store
                .enrollments_for_student(student_id)
                .expect("enrollments");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].id, enrollment_id);
            assert_eq!(records[0].grade, Some(Grade::B));
        }
    }

    #[test]
    fn id_counters_survive_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            seed_enrollment(&mut store);
        }
        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            let second = store
                .add_student("Ben".to_string(), "REG002".to_string())
                .expect("student");
            assert_eq!(second.id, StudentId(2));
        }
    }

    #[test]
    fn attendance_range_scan_in_date_order() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let (_, enrollment) = seed_enrollment(&mut store);

        for day in ["2026-03-16", "2026-03-02", "2026-03-09"] {
            store
                .upsert_attendance(
                    enrollment.id,
                    AttendanceEntry {
                        date: day.parse().expect("date"),
                        status: AttendanceStatus::Present,
                        duration: 2,
                    },
                )
                .expect("upsert");
        }

        let dates: Vec<String> = store
            .attendance_for(enrollment.id)
            .expect("entries")
            .iter()
            .map(|a| a.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2026-03-02", "2026-03-09", "2026-03-16"]);
    }

    #[test]
    fn attendance_upsert_overwrites_same_date() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let (_, enrollment) = seed_enrollment(&mut store);
        let date: ClassDate = "2026-03-02".parse().expect("date");

        store
            .upsert_attendance(
                enrollment.id,
                AttendanceEntry {
                    date,
                    status: AttendanceStatus::Absent,
                    duration: 2,
                },
            )
            .expect("upsert");
        store
            .upsert_attendance(
                enrollment.id,
                AttendanceEntry {
                    date,
                    status: AttendanceStatus::Present,
                    duration: 3,
                },
            )
            .expect("upsert");

        let entries = store.attendance_for(enrollment.id).expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn decide_cas_rejects_second_decision() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let (_, enrollment) = seed_enrollment(&mut store);

        let request = store
            .insert_request(enrollment.id, FailureClass::Retake, "illness".to_string(), 100)
            .expect("request");

        let decided = store
            .decide_request(request.id, Decision::Rejected)
            .expect("decide");
        assert_eq!(decided.status, RequestStatus::Rejected);

        assert!(matches!(
            store.decide_request(request.id, Decision::Approved),
            Err(ProvostError::InvalidTransition(_))
        ));

        // Decision persists across reopen.
        drop(store);
        let store = RedbStore::open(&db_path).expect("reopen db");
        let stored = store.request(request.id).expect("lookup").expect("present");
        assert_eq!(stored.status, RequestStatus::Rejected);
    }

    #[test]
    fn department_listing_joins_via_enrollment() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");
        let (student, computing) = seed_enrollment(&mut store);
        let physics = store
            .insert_enrollment(NewEnrollment {
                student: student.id,
                course_code: "PH101".to_string(),
                course_name: "Mechanics".to_string(),
                credit_hours: 4,
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
        assert_eq!(physics_reqs[0].enrollment, physics.id);
    }

    #[test]
    fn unknown_lookups_fail_cleanly() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");
        let mut store = RedbStore::open(&db_path).expect("open db");

        assert!(store.student(StudentId(9)).expect("lookup").is_none());
        assert!(matches!(
            store.enrollments_for_student(StudentId(9)),
            Err(ProvostError::StudentNotFound(_))
        ));
        assert!(matches!(
            store.record_grade(EnrollmentId(9), Score::from_marks(50).expect("s"), Grade::C),
            Err(ProvostError::EnrollmentNotFound(_))
        ));
        assert!(matches!(
            store.decide_request(RequestId(9), Decision::Approved),
            Err(ProvostError::RequestNotFound(_))
        ));
    }
}
