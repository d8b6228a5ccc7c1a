use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::classify::classify_status;
use super::record::AttendanceRecord;
use super::rules::AttendanceRules;

/// Per-record inputs to the monthly fold, derived from classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceFlags {
    pub is_late: bool,
    pub is_early_leave: bool,
    pub has_check_out: bool,
}

impl AttendanceFlags {
    pub fn of(record: &AttendanceRecord, rules: &AttendanceRules) -> Self {
        let status = classify_status(record, rules);
        Self {
            is_late: status.is_late(),
            is_early_leave: status.is_early_leave(),
            has_check_out: record.has_check_out(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": 1001,
    "total_work_days": 21,
    "late_days": 2,
    "early_leave_days": 1,
    "missing_checkout_days": 0
}))]
pub struct MonthlySummary {
    pub employee_id: u64,
    pub total_work_days: u32,
    pub late_days: u32,
    pub early_leave_days: u32,
    pub missing_checkout_days: u32,
}

impl MonthlySummary {
    pub fn new(employee_id: u64) -> Self {
        Self {
            employee_id,
            ..Default::default()
        }
    }

    /// Count one worked shift instance.
    pub fn record(&mut self, flags: AttendanceFlags) {
        self.total_work_days += 1;
        if flags.is_late {
            self.late_days += 1;
        }
        if flags.is_early_leave {
            self.early_leave_days += 1;
        }
        if !flags.has_check_out {
            self.missing_checkout_days += 1;
        }
    }
}

/// Fold records into one summary per employee, ordered by employee id.
/// Records without an employee are skipped.
pub fn summarize<'a, I>(records: I, rules: &AttendanceRules) -> Vec<MonthlySummary>
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut by_employee: BTreeMap<u64, MonthlySummary> = BTreeMap::new();

    for record in records {
        let Some(employee_id) = record.employee_id else {
            continue;
        };

        by_employee
            .entry(employee_id)
            .or_insert_with(|| MonthlySummary::new(employee_id))
            .record(AttendanceFlags::of(record, rules));
    }

    by_employee.into_values().collect()
}

/// Summary for a single employee; an employee with no records worked zero days.
pub fn summarize_employee<'a, I>(
    employee_id: u64,
    records: I,
    rules: &AttendanceRules,
) -> MonthlySummary
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    records
        .into_iter()
        .filter(|r| r.employee_id == Some(employee_id))
        .fold(MonthlySummary::new(employee_id), |mut acc, r| {
            acc.record(AttendanceFlags::of(r, rules));
            acc
        })
}
