use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::attendance::AttendanceResponse,
    auth::auth::AuthUser,
    config::Config,
    engine::{
        AttendanceRecord, AttendanceRules, Classification, MonthlySummary, calendar::month_bounds,
        classify, summarize,
    },
    error::ApiError,
    model::attendance::{AttendanceWithShift, SELECT_ATTENDANCE_WITH_SHIFT},
};

/// Which attendance rows to load
#[derive(Debug, Default)]
pub struct RecordFilter {
    pub employee_id: Option<u64>,
    pub department_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn load_records(
    pool: &MySqlPool,
    filter: &RecordFilter,
) -> Result<Vec<AttendanceWithShift>, ApiError> {
    let mut conditions = Vec::new();
    if filter.employee_id.is_some() {
        conditions.push("a.employee_id = ?");
    }
    if filter.department_id.is_some() {
        conditions.push("a.employee_id IN (SELECT id FROM employees WHERE department_id = ?)");
    }
    if filter.start_date.is_some() {
        conditions.push("a.date >= ?");
    }
    if filter.end_date.is_some() {
        conditions.push("a.date <= ?");
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{SELECT_ATTENDANCE_WITH_SHIFT} {where_clause} ORDER BY a.date DESC, a.employee_id");
    debug!(sql = %sql, filter = ?filter, "Loading attendance records");

    let mut query = sqlx::query_as::<_, AttendanceWithShift>(&sql);
    if let Some(employee_id) = filter.employee_id {
        query = query.bind(employee_id);
    }
    if let Some(department_id) = filter.department_id {
        query = query.bind(department_id);
    }
    if let Some(start) = filter.start_date {
        query = query.bind(start);
    }
    if let Some(end) = filter.end_date {
        query = query.bind(end);
    }

    query
        .fetch_all(pool)
        .await
        .map_err(ApiError::db("Failed to load attendance records"))
}

pub fn summarize_rows(rows: Vec<AttendanceWithShift>, rules: &AttendanceRules) -> Vec<MonthlySummary> {
    let records: Vec<AttendanceRecord> = rows.into_iter().map(AttendanceRecord::from).collect();
    summarize(&records, rules)
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordQuery {
    /// Defaults to the caller's own records
    pub employee_id: Option<u64>,
    /// HR/Admin only
    pub department_id: Option<u64>,
    #[param(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    #[param(example = 2026)]
    pub year: i32,
    #[param(example = 1)]
    pub month: u32,
    pub department_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct RecordsPayload {
    pub records: Vec<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct ClassifiedRecord {
    #[schema(nullable = true)]
    pub id: Option<u64>,
    #[schema(nullable = true)]
    pub employee_id: Option<u64>,
    pub classification: Classification,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub data: Vec<MonthlySummary>,
}

/// Classify posted records without touching the database
#[utoipa::path(
    post,
    path = "/api/attendance/classify",
    request_body = RecordsPayload,
    responses(
        (status = 200, description = "One classification per record, in input order", body = [ClassifiedRecord])
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn classify_records(
    config: web::Data<Config>,
    payload: web::Json<RecordsPayload>,
) -> impl Responder {
    let rules = &config.attendance_rules;

    let data: Vec<ClassifiedRecord> = payload
        .records
        .iter()
        .map(|r| ClassifiedRecord {
            id: r.id,
            employee_id: r.employee_id,
            classification: classify(r, rules),
        })
        .collect();

    HttpResponse::Ok().json(data)
}

/// Fold posted records into per-employee summaries
#[utoipa::path(
    post,
    path = "/api/attendance/summary",
    request_body = RecordsPayload,
    responses(
        (status = 200, description = "One summary per employee", body = [MonthlySummary])
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn summarize_records(
    config: web::Data<Config>,
    payload: web::Json<RecordsPayload>,
) -> impl Responder {
    HttpResponse::Ok().json(summarize(&payload.records, &config.attendance_rules))
}

/// Attendance history with live classification
#[utoipa::path(
    get,
    path = "/api/attendance/records",
    params(RecordQuery),
    responses(
        (status = 200, body = [AttendanceResponse]),
        (status = 403, description = "Not allowed to view these records")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<RecordQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match query.employee_id {
        Some(id) => {
            auth.require_access_to(id)?;
            Some(id)
        }
        None if auth.is_manager() => None,
        None => Some(auth.require_employee_id()?),
    };
    if query.department_id.is_some() {
        auth.require_hr_or_admin()?;
    }
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ApiError::bad_request("start_date must not be after end_date").into());
        }
    }

    let filter = RecordFilter {
        employee_id,
        department_id: query.department_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let rows = load_records(pool.get_ref(), &filter).await?;

    let rules = &config.attendance_rules;
    let data: Vec<AttendanceResponse> = rows
        .into_iter()
        .map(|row| AttendanceResponse::from_row(row, rules))
        .collect();

    Ok(HttpResponse::Ok().json(data))
}

/// Monthly per-employee summary (payroll input)
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(SummaryQuery),
    responses(
        (status = 200, body = SummaryResponse),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (start_date, end_date) = month_bounds(query.year, query.month).map_err(ApiError::from)?;

    let filter = RecordFilter {
        department_id: query.department_id,
        start_date: Some(start_date),
        end_date: Some(end_date),
        ..Default::default()
    };
    let rows = load_records(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(SummaryResponse {
        start_date,
        end_date,
        data: summarize_rows(rows, &config.attendance_rules),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::json;

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Config::for_tests()))
                    .route("/classify", web::post().to(classify_records))
                    .route("/summary", web::post().to(summarize_records)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_classify_endpoint() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/classify")
            .set_json(json!({
                "records": [
                    { "id": 1, "employee_id": 7, "check_in_time": "08:10", "check_out_time": "17:00",
                      "shift": { "start_time": "08:00", "end_time": "17:00" } },
                    { "id": 2, "employee_id": 7, "check_in_time": null,
                      "shift": { "start_time": "08:00", "end_time": "17:00" } },
                    { "id": 3, "check_in_time": "06:30", "check_out_time": "17:00",
                      "shift": { "start_time": "08:00", "end_time": "17:00" } }
                ]
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["classification"]["status"], "late");
        assert_eq!(body[1]["classification"]["status"], "unknown");
        assert_eq!(body[2]["classification"]["status"], "out-of-shift");
        assert_eq!(body[2]["employee_id"], serde_json::Value::Null);
    }

    #[actix_web::test]
    async fn test_summary_endpoint() {
        let app = app!();
        let shift = json!({ "start_time": "08:00", "end_time": "17:00" });
        let req = test::TestRequest::post()
            .uri("/summary")
            .set_json(json!({
                "records": [
                    { "employee_id": 7, "check_in_time": "08:10", "check_out_time": "17:00", "shift": shift },
                    { "employee_id": 7, "check_in_time": "08:20", "check_out_time": "16:00", "shift": shift },
                    { "employee_id": 7, "check_in_time": "08:00", "shift": shift },
                    { "employee_id": null, "check_in_time": "08:00", "shift": shift }
                ]
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!([{
                "employee_id": 7,
                "total_work_days": 3,
                "late_days": 2,
                "early_leave_days": 1,
                "missing_checkout_days": 1
            }])
        );
    }
}
