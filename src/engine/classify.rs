use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::record::AttendanceRecord;
use super::rules::AttendanceRules;
use super::time::{ClockTime, TimeError, parse_optional};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Unknown,
    OutOfShift,
    Late,
    Early,
    LateEarly,
    OnTime,
}

impl AttendanceStatus {
    pub fn message(self) -> &'static str {
        match self {
            AttendanceStatus::Unknown => "Unknown",
            AttendanceStatus::OutOfShift => "Checked in outside shift hours",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Early => "Left early",
            AttendanceStatus::LateEarly => "Late and left early",
            AttendanceStatus::OnTime => "On time",
        }
    }

    pub fn is_late(self) -> bool {
        matches!(self, AttendanceStatus::Late | AttendanceStatus::LateEarly)
    }

    pub fn is_early_leave(self) -> bool {
        matches!(self, AttendanceStatus::Early | AttendanceStatus::LateEarly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "status": "late", "message": "Late" }))]
pub struct Classification {
    pub status: AttendanceStatus,
    pub message: String,
}

impl From<AttendanceStatus> for Classification {
    fn from(status: AttendanceStatus) -> Self {
        Self {
            status,
            message: status.message().to_string(),
        }
    }
}

/// Classify already-parsed times. Pure; never consults the current time.
pub fn classify_times(
    check_in: Option<ClockTime>,
    check_out: Option<ClockTime>,
    shift_start: Option<ClockTime>,
    shift_end: Option<ClockTime>,
    rules: &AttendanceRules,
) -> AttendanceStatus {
    let (Some(ci), Some(ss)) = (check_in, shift_start) else {
        return AttendanceStatus::Unknown;
    };

    let ci = ci.minutes();
    let ss = ss.minutes();
    let co = check_out.map(ClockTime::minutes);
    let se = shift_end.map(ClockTime::minutes);

    let after_shift_end = matches!((co, se), (Some(_), Some(se)) if ci >= se);
    let before_window = ci < ss - rules.out_of_shift_early_window_minutes;
    if after_shift_end || before_window {
        return AttendanceStatus::OutOfShift;
    }

    let is_late = ci > ss + rules.late_threshold_minutes;
    let is_early = matches!((co, se), (Some(co), Some(se)) if co < se - rules.early_leave_threshold_minutes);

    match (is_late, is_early) {
        (true, true) => AttendanceStatus::LateEarly,
        (true, false) => AttendanceStatus::Late,
        (false, true) => AttendanceStatus::Early,
        (false, false) => AttendanceStatus::OnTime,
    }
}

fn try_classify(
    record: &AttendanceRecord,
    rules: &AttendanceRules,
) -> Result<AttendanceStatus, TimeError> {
    let check_in = parse_optional(record.check_in_time.as_deref())?;
    let (shift_start, shift_end) = match &record.shift {
        Some(shift) => (
            parse_optional(shift.start_time.as_deref())?,
            parse_optional(shift.end_time.as_deref())?,
        ),
        None => (None, None),
    };

    // Missing reference data wins over a bad check-out string.
    if check_in.is_none() || shift_start.is_none() {
        return Ok(AttendanceStatus::Unknown);
    }

    let check_out = parse_optional(record.check_out_time.as_deref())?;

    Ok(classify_times(check_in, check_out, shift_start, shift_end, rules))
}

/// Status of a single record. Malformed times degrade to `unknown`.
pub fn classify_status(record: &AttendanceRecord, rules: &AttendanceRules) -> AttendanceStatus {
    try_classify(record, rules).unwrap_or_else(|e| {
        tracing::debug!(error = %e, record_id = ?record.id, "Unclassifiable attendance record");
        AttendanceStatus::Unknown
    })
}

pub fn classify(record: &AttendanceRecord, rules: &AttendanceRules) -> Classification {
    classify_status(record, rules).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::ShiftWindow;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn record(check_in: Option<&str>, check_out: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: Some(7),
            check_in_time: check_in.map(str::to_string),
            check_out_time: check_out.map(str::to_string),
            shift: Some(ShiftWindow::new("08:00", "17:00")),
            ..Default::default()
        }
    }

    fn status(check_in: Option<&str>, check_out: Option<&str>) -> AttendanceStatus {
        classify_status(&record(check_in, check_out), &AttendanceRules::default())
    }

    #[test]
    fn test_late_without_early_leave() {
        assert_eq!(status(Some("08:10"), Some("17:00")), AttendanceStatus::Late);
    }

    #[test]
    fn test_early_leave_within_late_threshold() {
        assert_eq!(status(Some("08:02"), Some("16:50")), AttendanceStatus::Early);
    }

    #[test]
    fn test_late_and_early() {
        assert_eq!(status(Some("08:10"), Some("16:50")), AttendanceStatus::LateEarly);
    }

    #[test]
    fn test_threshold_boundaries_are_on_time() {
        assert_eq!(status(Some("08:05"), Some("16:55")), AttendanceStatus::OnTime);
        assert_eq!(status(Some("08:06"), Some("16:55")), AttendanceStatus::Late);
        assert_eq!(status(Some("08:05"), Some("16:54")), AttendanceStatus::Early);
    }

    #[test]
    fn test_open_record_is_on_time_when_not_late() {
        assert_eq!(status(Some("07:55"), None), AttendanceStatus::OnTime);
        assert_eq!(status(Some("08:30"), None), AttendanceStatus::Late);
    }

    #[test]
    fn test_out_of_shift_before_early_window() {
        assert_eq!(status(Some("06:30"), Some("17:00")), AttendanceStatus::OutOfShift);
        assert_eq!(status(Some("06:30"), None), AttendanceStatus::OutOfShift);
        // exactly at the window edge still belongs to the shift
        assert_eq!(status(Some("07:00"), None), AttendanceStatus::OnTime);
    }

    #[test]
    fn test_out_of_shift_after_end_requires_check_out() {
        assert_eq!(status(Some("17:00"), Some("18:00")), AttendanceStatus::OutOfShift);
        assert_eq!(status(Some("17:30"), None), AttendanceStatus::Late);
    }

    #[test]
    fn test_missing_check_in_is_unknown() {
        for check_out in [None, Some("17:00"), Some("garbage")] {
            assert_eq!(status(None, check_out), AttendanceStatus::Unknown);
        }
        assert_eq!(status(Some(""), Some("17:00")), AttendanceStatus::Unknown);
    }

    #[test]
    fn test_missing_shift_is_unknown() {
        let mut r = record(Some("08:00"), Some("17:00"));
        r.shift = None;
        assert_eq!(classify_status(&r, &AttendanceRules::default()), AttendanceStatus::Unknown);

        r.shift = Some(ShiftWindow {
            start_time: None,
            end_time: Some("17:00".into()),
        });
        assert_eq!(classify_status(&r, &AttendanceRules::default()), AttendanceStatus::Unknown);
    }

    #[test]
    fn test_missing_shift_end_skips_early_leave() {
        let mut r = record(Some("08:00"), Some("12:00"));
        r.shift = Some(ShiftWindow {
            start_time: Some("08:00".into()),
            end_time: None,
        });
        assert_eq!(classify_status(&r, &AttendanceRules::default()), AttendanceStatus::OnTime);
    }

    #[test]
    fn test_malformed_time_is_unknown() {
        assert_eq!(status(Some("8h10"), Some("17:00")), AttendanceStatus::Unknown);
        assert_eq!(status(Some("08:10"), Some("25:00")), AttendanceStatus::Unknown);

        let mut r = record(Some("08:00"), Some("17:00"));
        r.shift = Some(ShiftWindow::new("08:00", "5pm"));
        assert_eq!(classify_status(&r, &AttendanceRules::default()), AttendanceStatus::Unknown);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let rules = AttendanceRules::default();
        let r = record(Some("08:10"), Some("16:50"));
        let first = classify(&r, &rules);
        let second = classify(&r, &rules);
        assert_eq!(first, second);
        assert_eq!(first.message, "Late and left early");
    }

    #[test]
    fn test_custom_thresholds() {
        let rules = AttendanceRules {
            late_threshold_minutes: 15,
            early_leave_threshold_minutes: 15,
            out_of_shift_early_window_minutes: 120,
        };
        let r = record(Some("08:10"), Some("16:50"));
        assert_eq!(classify_status(&r, &rules), AttendanceStatus::OnTime);

        let r = record(Some("06:30"), Some("17:00"));
        assert_eq!(classify_status(&r, &rules), AttendanceStatus::OnTime);
    }

    #[test]
    fn test_status_wire_names() {
        let names: Vec<String> = AttendanceStatus::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            ["unknown", "out-of-shift", "late", "early", "late-early", "on-time"]
        );
        for s in AttendanceStatus::iter() {
            assert_eq!(AttendanceStatus::from_str(s.as_ref()), Ok(s));
            assert_eq!(
                serde_json::to_value(s).unwrap(),
                serde_json::Value::String(s.to_string())
            );
        }
    }
}
