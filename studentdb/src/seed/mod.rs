// First-run sample data

use crate::error::Result;
use crate::model::{AttendanceStatus, MarkKind, NewAttendance, NewMark, NewStudent};
use crate::schema::{ATTENDANCE, MARKS, STUDENTS};
use crate::store::Store;
use chrono::NaiveDate;

/// A student plus the marks and attendance rows that belong to them.
/// `student_id` on the dependent rows is filled in with the id assigned at insert.
#[derive(Debug, Clone)]
pub struct SeedStudent {
    pub student: NewStudent,
    pub marks: Vec<SeedMark>,
    pub attendance: Vec<SeedAttendance>,
}

#[derive(Debug, Clone)]
pub struct SeedMark {
    pub kind: MarkKind,
    pub score: i64,
    pub total_marks: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SeedAttendance {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct SeedData {
    pub students: Vec<SeedStudent>,
}

impl SeedData {
    /// The built-in sample: one student, four marks, three attendance rows.
    pub fn sample() -> Self {
        let mark = |kind: MarkKind, score: i64, (y, m, d): (i32, u32, u32)| SeedMark {
            kind,
            score,
            total_marks: 100,
            date: ymd(y, m, d),
        };
        let day = |(y, m, d): (i32, u32, u32), status: AttendanceStatus| SeedAttendance {
            date: ymd(y, m, d),
            status,
        };

        SeedData {
            students: vec![SeedStudent {
                student: NewStudent {
                    name: "John Doe".into(),
                    roll_number: "CS001".into(),
                    email: "john.doe@example.com".into(),
                    class: "CS-A".into(),
                },
                marks: vec![
                    mark(MarkKind::Midterm, 85, (2024, 3, 1)),
                    mark(MarkKind::Endsem, 90, (2024, 3, 15)),
                    mark(MarkKind::Fat1, 88, (2024, 2, 15)),
                    mark(MarkKind::Fat2, 92, (2024, 3, 1)),
                ],
                attendance: vec![
                    day((2024, 3, 15), AttendanceStatus::Present),
                    day((2024, 3, 14), AttendanceStatus::Present),
                    day((2024, 3, 13), AttendanceStatus::Absent),
                ],
            }],
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Insert the built-in sample if the store has no students yet.
/// Returns whether anything was inserted.
pub fn seed_if_empty(store: &Store) -> Result<bool> {
    seed_with(store, &SeedData::sample())
}

/// Insert `data` if the store has no students yet, as one unit of work:
/// either every record commits or none does.
pub fn seed_with(store: &Store, data: &SeedData) -> Result<bool> {
    let seeded = store.atomically(|store| {
        if store.count(STUDENTS)? > 0 {
            return Ok(false);
        }

        for entry in &data.students {
            let student_id = store.insert_record(STUDENTS, &entry.student)?;
            for mark in &entry.marks {
                store.insert_record(
                    MARKS,
                    &NewMark {
                        student_id,
                        kind: mark.kind.clone(),
                        score: mark.score,
                        total_marks: mark.total_marks,
                        date: mark.date,
                    },
                )?;
            }
            for day in &entry.attendance {
                store.insert_record(
                    ATTENDANCE,
                    &NewAttendance {
                        student_id,
                        date: day.date,
                        status: day.status.clone(),
                    },
                )?;
            }
        }
        Ok(true)
    })?;

    if seeded {
        log::info!("Seeded {} sample student(s)", data.students.len());
    } else {
        log::debug!("Store already holds students, skipping seed");
    }
    Ok(seeded)
}
