// Typed data access over the shared record store

use crate::error::{Result, StudentDbError};
use crate::model::{
    Attendance, AttendanceStatus, Mark, NewAttendance, NewStudent, RecordId, Student,
};
use crate::schema::{ATTENDANCE, MARKS, STUDENTS, STUDENT_ID_INDEX};
use crate::seed;
use crate::store::SharedStore;
use chrono::NaiveDate;

/// Async operations on students, marks and attendance.
///
/// Every call runs its storage work on the blocking pool and suspends the
/// caller until it completes. Errors from the store are returned unchanged.
#[derive(Clone)]
pub struct Records {
    store: SharedStore,
}

impl Records {
    pub fn new(store: SharedStore) -> Self {
        Records { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Insert the sample data on first run. Returns whether anything was inserted.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        self.store.run(seed::seed_if_empty).await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        self.store.run(|store| store.list_records(STUDENTS)).await
    }

    pub async fn student(&self, id: RecordId) -> Result<Student> {
        self.store
            .run(move |store| {
                store
                    .get_record(STUDENTS, id)?
                    .ok_or_else(|| StudentDbError::not_found(STUDENTS, id))
            })
            .await
    }

    /// Fails with `ConstraintViolation` when the roll number is taken.
    pub async fn add_student(&self, student: NewStudent) -> Result<Student> {
        self.store
            .run(move |store| {
                let id = store.insert_record(STUDENTS, &student)?;
                log::debug!("Added student {id} ({})", student.roll_number);
                Ok(Student {
                    id,
                    name: student.name,
                    roll_number: student.roll_number,
                    email: student.email,
                    class: student.class,
                })
            })
            .await
    }

    pub async fn marks_for_student(&self, student_id: RecordId) -> Result<Vec<Mark>> {
        self.store
            .run(move |store| store.query_records(MARKS, STUDENT_ID_INDEX, &student_id))
            .await
    }

    pub async fn attendance_for_student(&self, student_id: RecordId) -> Result<Vec<Attendance>> {
        self.store
            .run(move |store| store.query_records(ATTENDANCE, STUDENT_ID_INDEX, &student_id))
            .await
    }

    /// Replace a mark's score and return the stored mark. The score is not
    /// checked against `total_marks`.
    pub async fn set_mark_score(&self, mark_id: RecordId, score: i64) -> Result<Mark> {
        self.store
            .run(move |store| {
                store.atomically(|store| {
                    let mut mark: Mark = store
                        .get_record(MARKS, mark_id)?
                        .ok_or_else(|| StudentDbError::not_found(MARKS, mark_id))?;
                    mark.score = score;
                    store.update_record(MARKS, &mark)?;
                    Ok(mark)
                })
            })
            .await
    }

    /// Replace an attendance record's status and return the stored record.
    /// Any status label is accepted.
    pub async fn set_attendance_status(
        &self,
        attendance_id: RecordId,
        status: AttendanceStatus,
    ) -> Result<Attendance> {
        self.store
            .run(move |store| {
                store.atomically(|store| {
                    let mut record: Attendance = store
                        .get_record(ATTENDANCE, attendance_id)?
                        .ok_or_else(|| StudentDbError::not_found(ATTENDANCE, attendance_id))?;
                    record.status = status;
                    store.update_record(ATTENDANCE, &record)?;
                    Ok(record)
                })
            })
            .await
    }

    /// Add an attendance record. Several records for the same date are allowed.
    pub async fn append_attendance(
        &self,
        student_id: RecordId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<Attendance> {
        self.store
            .run(move |store| {
                let new = NewAttendance {
                    student_id,
                    date,
                    status,
                };
                let id = store.insert_record(ATTENDANCE, &new)?;
                Ok(Attendance {
                    id,
                    student_id: new.student_id,
                    date: new.date,
                    status: new.status,
                })
            })
            .await
    }
}
