use crate::model::{Attendance, AttendanceStatus, Mark, MarkKind, RecordId};
use chrono::NaiveDate;
use serde::Serialize;

/// Total used by the placeholder card when a student has no mark of a kind.
pub const PLACEHOLDER_TOTAL_MARKS: i64 = 100;

/// Kinds shown as cards, with their display labels, in display order.
pub const CARD_KINDS: [(MarkKind, &str); 4] = [
    (MarkKind::Midterm, "Mid Semester"),
    (MarkKind::Endsem, "End Semester"),
    (MarkKind::Fat1, "FAT 1 Assignment"),
    (MarkKind::Fat2, "FAT 2 Assignment"),
];

/// One mark as shown to the user. `mark_id` is `None` for a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCard {
    pub label: String,
    pub kind: MarkKind,
    pub mark_id: Option<RecordId>,
    pub score: i64,
    pub total_marks: i64,
    pub date: Option<NaiveDate>,
}

pub fn present_count(attendance: &[Attendance]) -> usize {
    attendance
        .iter()
        .filter(|a| a.status == AttendanceStatus::Present)
        .count()
}

/// Percentage of `present` records, rounded half up. 0 when there are none.
pub fn attendance_percentage(attendance: &[Attendance]) -> u32 {
    let total = attendance.len() as u64;
    if total == 0 {
        return 0;
    }
    let present = present_count(attendance) as u64;
    ((present * 200 + total) / (total * 2)) as u32
}

/// First mark of `kind` in sequence order, or a zero-score placeholder.
pub fn representative_mark(marks: &[Mark], kind: &MarkKind) -> MarkCard {
    let label = CARD_KINDS
        .iter()
        .find(|(k, _)| k == kind)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| kind.to_string());

    match marks.iter().find(|m| &m.kind == kind) {
        Some(mark) => MarkCard {
            label,
            kind: kind.clone(),
            mark_id: Some(mark.id),
            score: mark.score,
            total_marks: mark.total_marks,
            date: Some(mark.date),
        },
        None => MarkCard {
            label,
            kind: kind.clone(),
            mark_id: None,
            score: 0,
            total_marks: PLACEHOLDER_TOTAL_MARKS,
            date: None,
        },
    }
}

pub fn mark_cards(marks: &[Mark]) -> Vec<MarkCard> {
    CARD_KINDS
        .iter()
        .map(|(kind, _)| representative_mark(marks, kind))
        .collect()
}
