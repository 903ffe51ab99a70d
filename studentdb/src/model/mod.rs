// Typed records for the three collections

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned record identifier.
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: RecordId,
    pub student_id: RecordId,
    #[serde(rename = "type")]
    pub kind: MarkKind,
    /// Not checked against `total_marks`.
    pub score: i64,
    pub total_marks: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMark {
    pub student_id: RecordId,
    #[serde(rename = "type")]
    pub kind: MarkKind,
    pub score: i64,
    pub total_marks: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: RecordId,
    pub student_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub student_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Assessment label of a mark. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Midterm,
    Endsem,
    Fat1,
    Fat2,
    #[serde(untagged)]
    Other(String),
}

impl MarkKind {
    pub fn as_str(&self) -> &str {
        match self {
            MarkKind::Midterm => "midterm",
            MarkKind::Endsem => "endsem",
            MarkKind::Fat1 => "fat1",
            MarkKind::Fat2 => "fat2",
            MarkKind::Other(label) => label,
        }
    }

    /// Parse a label, mapping the known ones onto their variants.
    pub fn from_label(label: &str) -> Self {
        match label {
            "midterm" => MarkKind::Midterm,
            "endsem" => MarkKind::Endsem,
            "fat1" => MarkKind::Fat1,
            "fat2" => MarkKind::Fat2,
            other => MarkKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attendance status. `Late` is never produced by the current flows; unknown
/// statuses are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[serde(untagged)]
    Other(String),
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            "late" => AttendanceStatus::Late,
            other => AttendanceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mark_uses_stored_field_names() {
        let mark = NewMark {
            student_id: 1,
            kind: MarkKind::Midterm,
            score: 85,
            total_marks: 100,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "studentId": 1,
                "type": "midterm",
                "score": 85,
                "totalMarks": 100,
                "date": "2024-03-01",
            })
        );
    }

    #[test]
    fn test_unknown_labels_survive() {
        let kind: MarkKind = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(kind, MarkKind::Other("quiz".into()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"quiz\"");

        let status: AttendanceStatus = serde_json::from_str("\"excused\"").unwrap();
        assert_eq!(status.as_str(), "excused");
        let known: AttendanceStatus = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(known, AttendanceStatus::Absent);
    }

    #[test]
    fn test_from_label_matches_serde() {
        for label in ["midterm", "endsem", "fat1", "fat2", "lab"] {
            let parsed: MarkKind = serde_json::from_value(serde_json::json!(label)).unwrap();
            assert_eq!(MarkKind::from_label(label), parsed);
        }
        for label in ["present", "absent", "late", "sick"] {
            let parsed: AttendanceStatus =
                serde_json::from_value(serde_json::json!(label)).unwrap();
            assert_eq!(AttendanceStatus::from_label(label), parsed);
        }
    }

    #[test]
    fn test_student_class_field() {
        let student: Student = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "John Doe",
            "rollNumber": "CS001",
            "email": "john.doe@example.com",
            "class": "CS-A",
        }))
        .unwrap();
        assert_eq!(student.roll_number, "CS001");
        assert_eq!(student.class, "CS-A");
    }
}
