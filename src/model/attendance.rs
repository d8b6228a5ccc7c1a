use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::engine::{AttendanceRecord, ClockTime, ShiftWindow, format_time};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    pub shift_id: Option<u64>,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub note: Option<String>,
}

pub const SELECT_ATTENDANCE_WITH_SHIFT: &str = r#"
    SELECT a.id, a.employee_id, a.shift_id, a.date, a.check_in, a.check_out, a.note,
           s.start_time AS shift_start, s.end_time AS shift_end
    FROM attendance a
    LEFT JOIN shifts s ON s.id = a.shift_id
"#;

/// Attendance row joined with its shift's schedule.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceWithShift {
    pub id: u64,
    pub employee_id: u64,
    pub shift_id: Option<u64>,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub note: Option<String>,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
}

fn hhmm(t: Option<NaiveTime>) -> Option<String> {
    t.map(|t| format_time(ClockTime::from(t)))
}

impl From<AttendanceWithShift> for AttendanceRecord {
    fn from(row: AttendanceWithShift) -> Self {
        let shift = row.shift_id.map(|_| ShiftWindow {
            start_time: hhmm(row.shift_start),
            end_time: hhmm(row.shift_end),
        });

        AttendanceRecord {
            id: Some(row.id),
            employee_id: Some(row.employee_id),
            date: Some(row.date),
            check_in_time: hhmm(row.check_in),
            check_out_time: hhmm(row.check_out),
            shift,
            note: row.note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_engine_record() {
        let row = AttendanceWithShift {
            id: 1,
            employee_id: 9,
            shift_id: Some(2),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            check_in: NaiveTime::from_hms_opt(8, 10, 42),
            check_out: None,
            note: None,
            shift_start: NaiveTime::from_hms_opt(8, 0, 0),
            shift_end: NaiveTime::from_hms_opt(17, 0, 0),
        };

        let record = AttendanceRecord::from(row);
        assert_eq!(record.check_in_time.as_deref(), Some("08:10"));
        assert_eq!(record.shift, Some(ShiftWindow::new("08:00", "17:00")));
        assert!(!record.has_check_out());
    }

    #[test]
    fn test_row_without_shift() {
        let row = AttendanceWithShift {
            id: 1,
            employee_id: 9,
            shift_id: None,
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            check_in: NaiveTime::from_hms_opt(8, 0, 0),
            check_out: NaiveTime::from_hms_opt(17, 0, 0),
            note: Some("manual".to_string()),
            shift_start: None,
            shift_end: None,
        };

        assert_eq!(AttendanceRecord::from(row).shift, None);
    }
}
