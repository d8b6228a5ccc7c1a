use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub month: NaiveDate,

    pub base_salary: f64,
    pub total_working_days: u32,
    pub working_days: u32,
    pub overtime_hours: f64,
    pub overtime_rate: f64,
    pub overtime_salary: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub net_salary: f64,
    #[schema(nullable = true)]
    pub note: Option<String>,
}
