mod derived;

pub use derived::{
    attendance_percentage, mark_cards, present_count, representative_mark, MarkCard, CARD_KINDS,
    PLACEHOLDER_TOTAL_MARKS,
};

use crate::access::Records;
use crate::error::{Result, StudentDbError};
use crate::model::{Attendance, AttendanceStatus, Mark, RecordId, Student};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::watch;

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub students: Vec<Student>,
    pub selected_student: Option<Student>,
    pub marks: Vec<Mark>,
    pub attendance: Vec<Attendance>,
    /// Message of the last failed command, cleared by the next successful one.
    pub last_error: Option<String>,
    /// Bumped on every selection change. Fetch results carry the value they
    /// were issued under and are dropped when it no longer matches.
    #[serde(skip)]
    selection_epoch: u64,
}

impl ViewSnapshot {
    pub fn attendance_percentage(&self) -> u32 {
        attendance_percentage(&self.attendance)
    }

    pub fn mark_cards(&self) -> Vec<MarkCard> {
        mark_cards(&self.marks)
    }

    fn selection(&self) -> Option<(RecordId, u64)> {
        self.selected_student
            .as_ref()
            .map(|s| (s.id, self.selection_epoch))
    }
}

/// Holds the selected student and their marks and attendance, and turns
/// presentation commands into data access calls.
///
/// Every state change is published on a watch channel. Edits are never
/// applied optimistically: the snapshot changes only after the write
/// succeeds and the affected records are fetched again.
pub struct ViewController {
    records: Records,
    state: watch::Sender<ViewSnapshot>,
}

impl ViewController {
    /// Seed the store if it is empty and load the student list.
    /// Seeding failures are returned and no controller is built.
    pub async fn start(records: Records) -> Result<Self> {
        records.seed_if_empty().await?;
        let students = records.list_students().await?;
        log::info!("View controller started with {} student(s)", students.len());

        let (state, _) = watch::channel(ViewSnapshot {
            students,
            ..ViewSnapshot::default()
        });
        Ok(ViewController { records, state })
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.state.subscribe()
    }

    pub async fn refresh_students(&self) -> Result<()> {
        let students = self.report(self.records.list_students().await)?;
        self.state.send_modify(|state| {
            state.students = students;
            state.last_error = None;
        });
        Ok(())
    }

    /// Select a student and load their marks and attendance.
    ///
    /// Selecting the current student again fetches again. Returns `false`
    /// when another selection happened while the fetch was in flight; its
    /// result is then discarded.
    pub async fn select_student(&self, id: RecordId) -> Result<bool> {
        let listed = self
            .state
            .borrow()
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned();
        let student = match listed {
            Some(student) => student,
            None => self.report(self.records.student(id).await)?,
        };

        let mut epoch = 0;
        self.state.send_modify(|state| {
            state.selection_epoch += 1;
            epoch = state.selection_epoch;
            if state.selected_student.as_ref().map(|s| s.id) != Some(id) {
                state.marks.clear();
                state.attendance.clear();
            }
            state.selected_student = Some(student);
        });
        log::debug!("Selected student {id} (epoch {epoch})");

        let fetched = tokio::try_join!(
            self.records.marks_for_student(id),
            self.records.attendance_for_student(id),
        );
        let (marks, attendance) = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                if self.is_current(id, epoch) {
                    self.set_error(&e);
                }
                return Err(e);
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if state.selection() != Some((id, epoch)) {
                return false;
            }
            state.marks = marks;
            state.attendance = attendance;
            state.last_error = None;
            true
        });
        if !applied {
            log::warn!("Discarding stale records fetched for student {id}");
        }
        Ok(applied)
    }

    pub fn clear_selection(&self) {
        self.state.send_modify(|state| {
            state.selection_epoch += 1;
            state.selected_student = None;
            state.marks.clear();
            state.attendance.clear();
        });
    }

    /// Write a new score, then reload the selected student's marks.
    ///
    /// If the write succeeds but the reload fails, the score stays saved;
    /// the error is returned and `last_error` says the reload failed.
    pub async fn commit_mark_edit(&self, mark_id: RecordId, score: i64) -> Result<Mark> {
        let mark = self.report(self.records.set_mark_score(mark_id, score).await)?;
        log::debug!("Committed score {score} for mark {mark_id}");

        let selection = self.state.borrow().selection();
        if let Some((student_id, epoch)) = selection {
            let marks = self.report_reload(self.records.marks_for_student(student_id).await)?;
            self.apply_if_current(student_id, epoch, |state| state.marks = marks);
        }
        self.clear_error();
        Ok(mark)
    }

    /// Write a new status, then reload the selected student's attendance.
    /// A failed reload is reported the same way as in `commit_mark_edit`.
    pub async fn commit_attendance_edit(
        &self,
        attendance_id: RecordId,
        status: AttendanceStatus,
    ) -> Result<Attendance> {
        let record = self.report(
            self.records
                .set_attendance_status(attendance_id, status)
                .await,
        )?;
        log::debug!("Committed status {} for attendance {attendance_id}", record.status);

        self.reload_attendance().await?;
        self.clear_error();
        Ok(record)
    }

    /// Append an attendance record for the selected student, then reload
    /// their attendance. Fails without writing when nobody is selected.
    pub async fn record_attendance(
        &self,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<Attendance> {
        let selection = self.state.borrow().selection();
        let Some((student_id, _)) = selection else {
            return self.report(Err(StudentDbError::Other("no student selected".into())));
        };

        let record = self.report(
            self.records
                .append_attendance(student_id, date, status)
                .await,
        )?;
        log::debug!(
            "Recorded {} on {} for student {student_id}",
            record.status,
            record.date
        );

        self.reload_attendance().await?;
        self.clear_error();
        Ok(record)
    }

    async fn reload_attendance(&self) -> Result<()> {
        let selection = self.state.borrow().selection();
        if let Some((student_id, epoch)) = selection {
            let attendance =
                self.report_reload(self.records.attendance_for_student(student_id).await)?;
            self.apply_if_current(student_id, epoch, |state| state.attendance = attendance);
        }
        Ok(())
    }

    fn apply_if_current(&self, student_id: RecordId, epoch: u64, f: impl FnOnce(&mut ViewSnapshot)) {
        let applied = self.state.send_if_modified(|state| {
            if state.selection() != Some((student_id, epoch)) {
                return false;
            }
            f(state);
            true
        });
        if !applied {
            log::warn!("Discarding stale records fetched for student {student_id}");
        }
    }

    fn is_current(&self, student_id: RecordId, epoch: u64) -> bool {
        self.state.borrow().selection() == Some((student_id, epoch))
    }

    /// Record a failure in the snapshot and hand it back unchanged.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.set_error(e);
        }
        result
    }

    /// Like `report`, for a fetch that follows a committed write.
    fn report_reload<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("Saved, but reloading failed: {e}");
            self.set_message(format!("Saved, but reloading failed: {e}"));
        }
        result
    }

    fn set_error(&self, e: &StudentDbError) {
        log::warn!("Command failed: {e}");
        self.set_message(e.to_string());
    }

    fn set_message(&self, message: String) {
        self.state.send_modify(|state| state.last_error = Some(message));
    }

    fn clear_error(&self) {
        self.state.send_if_modified(|state| state.last_error.take().is_some());
    }
}
