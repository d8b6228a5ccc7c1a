use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::report::{RecordFilter, load_records},
    auth::auth::AuthUser,
    config::Config,
    engine::{
        AttendanceRecord, MonthlySummary,
        calendar::{month_bounds, working_days_in_month},
        payroll::{DEFAULT_OVERTIME_RATE, PayrollInput, PayrollLine, calculate_payroll as compute_line},
        summarize_employee,
    },
    error::ApiError,
    model::payroll::Payroll,
};

const SELECT_PAYROLL: &str = r#"
    SELECT id, employee_id, month, base_salary, total_working_days, working_days,
           overtime_hours, overtime_rate, overtime_salary, bonus, deductions,
           net_salary, note
    FROM payroll
"#;

#[derive(Deserialize, ToSchema)]
pub struct CalculatePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 1)]
    pub month: u32,

    #[schema(example = 50000.0)]
    pub base_salary: f64,

    #[schema(example = 4.0, nullable = true)]
    pub overtime_hours: Option<f64>,

    /// Multiplier on the hourly rate; defaults to 1.5
    #[schema(example = 1.5, nullable = true)]
    pub overtime_rate: Option<f64>,

    #[schema(example = 5000.0, nullable = true)]
    pub bonus: Option<f64>,

    #[schema(example = 2000.0, nullable = true)]
    pub deductions: Option<f64>,

    /// Public holidays excluded from the month's business days
    #[serde(default)]
    #[schema(value_type = Vec<String>, format = "date")]
    pub holidays: Vec<NaiveDate>,

    #[schema(nullable = true)]
    pub note: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollCalculation {
    pub payroll: Payroll,
    pub line: PayrollLine,
    pub summary: MonthlySummary,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    #[param(example = 1)]
    pub page: Option<u32>,

    #[param(example = 10)]
    pub per_page: Option<u32>,

    #[param(example = 1001)]
    pub employee_id: Option<u64>,

    /// Any date in the wanted month
    #[param(value_type = Option<String>, format = "date")]
    pub month: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Page and page size as requested (1-based page, at most 100 rows), plus
/// the row offset. The offset is computed in u64 so huge pages cannot overflow.
fn page_window(page: Option<u32>, per_page: Option<u32>) -> (u32, u32, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let offset = (u64::from(page) - 1) * u64::from(per_page);
    (page, per_page, offset)
}

/// Assemble the engine input from the request and the month's summary.
fn payroll_input(
    payload: &CalculatePayroll,
    summary: &MonthlySummary,
    total_working_days: u32,
) -> PayrollInput {
    PayrollInput {
        base_salary: payload.base_salary,
        total_working_days,
        working_days: summary.total_work_days,
        overtime_hours: payload.overtime_hours.unwrap_or(0.0),
        overtime_rate: payload.overtime_rate.unwrap_or(DEFAULT_OVERTIME_RATE),
        bonus: payload.bonus.unwrap_or(0.0),
        deductions: payload.deductions.unwrap_or(0.0),
    }
}

/// Compute an employee's payroll for a month from their attendance and
/// store it; recalculating the same month replaces the earlier line.
#[utoipa::path(
    post,
    path = "/api/payroll/calculate",
    request_body = CalculatePayroll,
    responses(
        (status = 200, description = "Payroll calculated", body = PayrollCalculation),
        (status = 400, description = "Invalid month or amount"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn calculate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CalculatePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (start_date, end_date) =
        month_bounds(payload.year, payload.month).map_err(ApiError::from)?;
    let total_working_days = working_days_in_month(payload.year, payload.month, &payload.holidays)
        .map_err(ApiError::from)?;

    let filter = RecordFilter {
        employee_id: Some(payload.employee_id),
        start_date: Some(start_date),
        end_date: Some(end_date),
        ..Default::default()
    };
    let rows = load_records(pool.get_ref(), &filter).await?;
    let records: Vec<AttendanceRecord> = rows.into_iter().map(AttendanceRecord::from).collect();
    let summary = summarize_employee(payload.employee_id, &records, &config.attendance_rules);

    let input = payroll_input(&payload, &summary, total_working_days);
    let line = compute_line(&input).map_err(ApiError::from)?;
    debug!(employee_id = payload.employee_id, ?input, ?line, "Payroll computed");

    sqlx::query(
        r#"
        INSERT INTO payroll
        (employee_id, month, base_salary, total_working_days, working_days,
         overtime_hours, overtime_rate, overtime_salary, bonus, deductions, net_salary, note)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            base_salary = VALUES(base_salary),
            total_working_days = VALUES(total_working_days),
            working_days = VALUES(working_days),
            overtime_hours = VALUES(overtime_hours),
            overtime_rate = VALUES(overtime_rate),
            overtime_salary = VALUES(overtime_salary),
            bonus = VALUES(bonus),
            deductions = VALUES(deductions),
            net_salary = VALUES(net_salary),
            note = VALUES(note)
        "#,
    )
    .bind(payload.employee_id)
    .bind(start_date)
    .bind(input.base_salary)
    .bind(input.total_working_days)
    .bind(input.working_days)
    .bind(input.overtime_hours)
    .bind(input.overtime_rate)
    .bind(line.overtime_salary)
    .bind(line.bonus)
    .bind(line.deductions)
    .bind(line.net_salary)
    .bind(payload.note.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::db("Failed to save payroll"))?;

    let payroll = sqlx::query_as::<_, Payroll>(&format!(
        "{SELECT_PAYROLL} WHERE employee_id = ? AND month = ?"
    ))
    .bind(payload.employee_id)
    .bind(start_date)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::db("Failed to fetch payroll"))?;

    info!(
        payroll_id = payroll.id,
        employee_id = payroll.employee_id,
        month = %start_date,
        calculated_by = auth.user_id,
        "Payroll calculated"
    );

    Ok(HttpResponse::Ok().json(PayrollCalculation {
        payroll,
        line,
        summary,
    }))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, body = Payroll),
        (status = 403, description = "Not your payroll"),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let payroll = sqlx::query_as::<_, Payroll>(&format!("{SELECT_PAYROLL} WHERE id = ?"))
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to fetch payroll"))?
        .ok_or_else(|| ApiError::not_found("Payroll not found"))?;

    auth.require_access_to(payroll.employee_id)?;

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (page, per_page, offset) = page_window(query.page, query.per_page);

    let month = match query.month {
        Some(d) => {
            let (start, _) = month_bounds(d.year(), d.month()).map_err(ApiError::from)?;
            Some(start)
        }
        None => None,
    };

    let mut conditions = Vec::new();
    if query.employee_id.is_some() {
        conditions.push("employee_id = ?");
    }
    if month.is_some() {
        conditions.push("month = ?");
    }
    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM payroll {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(employee_id) = query.employee_id {
        count_query = count_query.bind(employee_id);
    }
    if let Some(month) = month {
        count_query = count_query.bind(month);
    }
    let total = count_query
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to count payrolls"))?;

    let list_sql =
        format!("{SELECT_PAYROLL} {where_clause} ORDER BY month DESC, employee_id LIMIT ? OFFSET ?");
    let mut list_query = sqlx::query_as::<_, Payroll>(&list_sql);
    if let Some(employee_id) = query.employee_id {
        list_query = list_query.bind(employee_id);
    }
    if let Some(month) = month {
        list_query = list_query.bind(month);
    }
    let data = list_query
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to fetch payroll list"))?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CalculatePayroll {
        CalculatePayroll {
            employee_id: 7,
            year: 2026,
            month: 1,
            base_salary: 22_000.0,
            overtime_hours: None,
            overtime_rate: None,
            bonus: None,
            deductions: None,
            holidays: Vec::new(),
            note: None,
        }
    }

    #[test]
    fn test_input_defaults() {
        let mut summary = MonthlySummary::new(7);
        summary.total_work_days = 20;

        let input = payroll_input(&request(), &summary, 22);
        assert_eq!(input.working_days, 20);
        assert_eq!(input.total_working_days, 22);
        assert_eq!(input.overtime_hours, 0.0);
        assert_eq!(input.overtime_rate, DEFAULT_OVERTIME_RATE);
        assert_eq!(input.bonus, 0.0);
        assert_eq!(input.deductions, 0.0);
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100, 200));
    }

    #[test]
    fn test_page_window_huge_page_does_not_overflow() {
        assert_eq!(
            page_window(Some(50_000_000), Some(100)),
            (50_000_000, 100, 4_999_999_900)
        );
        assert_eq!(
            page_window(Some(u32::MAX), Some(100)).2,
            (u64::from(u32::MAX) - 1) * 100
        );
    }

    #[test]
    fn test_request_holidays_optional() {
        let payload: CalculatePayroll = serde_json::from_value(serde_json::json!({
            "employee_id": 7,
            "year": 2026,
            "month": 1,
            "base_salary": 22000.0,
            "overtime_hours": 2.5
        }))
        .unwrap();
        assert!(payload.holidays.is_empty());
        assert_eq!(payload.overtime_hours, Some(2.5));

        let payload: CalculatePayroll = serde_json::from_value(serde_json::json!({
            "employee_id": 7,
            "year": 2026,
            "month": 1,
            "base_salary": 22000.0,
            "holidays": ["2026-01-01"]
        }))
        .unwrap();
        assert_eq!(payload.holidays, vec![NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()]);
    }
}
