use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scheduled window of the shift a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShiftWindow {
    #[schema(example = "08:00", nullable = true)]
    pub start_time: Option<String>,

    #[schema(example = "17:00", nullable = true)]
    pub end_time: Option<String>,
}

impl ShiftWindow {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
        }
    }
}

/// One employee's attendance for one shift instance, as fed to the rules
/// engine. Times are raw `HH:mm` strings; a malformed value never fails the
/// caller, it only makes the record classify as `unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[serde(default)]
    #[schema(example = 1, nullable = true)]
    pub id: Option<u64>,

    #[serde(default)]
    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,

    #[serde(default)]
    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    #[serde(default)]
    #[schema(example = "08:10", nullable = true)]
    pub check_in_time: Option<String>,

    #[serde(default)]
    #[schema(example = "17:00", nullable = true)]
    pub check_out_time: Option<String>,

    #[serde(default)]
    pub shift: Option<ShiftWindow>,

    #[serde(default)]
    pub note: Option<String>,
}

impl AttendanceRecord {
    pub fn has_check_out(&self) -> bool {
        self.check_out_time
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}
