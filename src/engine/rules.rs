use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LATE_THRESHOLD_MINUTES: i32 = 5;
pub const DEFAULT_EARLY_LEAVE_THRESHOLD_MINUTES: i32 = 5;
pub const DEFAULT_OUT_OF_SHIFT_EARLY_WINDOW_MINUTES: i32 = 60;
/// Upper bound for any threshold: one day.
pub const MAX_THRESHOLD_MINUTES: i32 = 24 * 60;

/// Tolerances used when classifying a check-in/out against its shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRules {
    /// Minutes after shift start a check-in still counts as on time.
    #[schema(example = 5)]
    pub late_threshold_minutes: i32,

    /// Minutes before shift end a check-out still counts as on time.
    #[schema(example = 5)]
    pub early_leave_threshold_minutes: i32,

    /// Check-ins earlier than this many minutes before shift start do not
    /// belong to the shift.
    #[schema(example = 60)]
    pub out_of_shift_early_window_minutes: i32,
}

impl Default for AttendanceRules {
    fn default() -> Self {
        Self {
            late_threshold_minutes: DEFAULT_LATE_THRESHOLD_MINUTES,
            early_leave_threshold_minutes: DEFAULT_EARLY_LEAVE_THRESHOLD_MINUTES,
            out_of_shift_early_window_minutes: DEFAULT_OUT_OF_SHIFT_EARLY_WINDOW_MINUTES,
        }
    }
}
