use crate::{
    auth::{auth::AuthUser, jwt::verify_qr_token},
    config::Config,
    engine::{AttendanceRecord, AttendanceRules, Classification, ClockTime, classify, parse_time},
    error::{ApiError, is_duplicate_key},
    model::{
        attendance::{Attendance, AttendanceWithShift, SELECT_ATTENDANCE_WITH_SHIFT},
        shift::Shift,
    },
    models::QrKind,
    utils::shift_cache::fetch_shift,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 1)]
    pub shift_id: u64,

    /// Manual entry for another employee (HR/Admin only)
    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,

    /// Manual entry time (HR/Admin only); defaults to the server's clock
    #[schema(example = "08:03", nullable = true)]
    pub check_in_time: Option<String>,

    /// Manual entry date (HR/Admin only); defaults to today
    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,

    #[schema(nullable = true)]
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = "17:02", nullable = true)]
    pub check_out_time: Option<String>,

    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct QrScanRequest {
    /// Signed payload read from the QR code
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: u64,
    pub employee_id: u64,
    #[schema(nullable = true)]
    pub shift_id: Option<u64>,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "08:03", nullable = true)]
    pub check_in_time: Option<String>,
    #[schema(example = "17:02", nullable = true)]
    pub check_out_time: Option<String>,
    #[schema(nullable = true)]
    pub note: Option<String>,
    pub classification: Classification,
}

impl AttendanceResponse {
    pub fn from_row(row: AttendanceWithShift, rules: &AttendanceRules) -> Self {
        let id = row.id;
        let employee_id = row.employee_id;
        let shift_id = row.shift_id;
        let date = row.date;

        let record = AttendanceRecord::from(row);
        let classification = classify(&record, rules);

        Self {
            id,
            employee_id,
            shift_id,
            date,
            check_in_time: record.check_in_time,
            check_out_time: record.check_out_time,
            note: record.note,
            classification,
        }
    }
}

struct Entry {
    employee_id: u64,
    date: NaiveDate,
    time: ClockTime,
}

/// Resolve who and when: employees always act on themselves at the server's
/// clock; HR/Admin may record manual entries.
fn resolve_entry(
    auth: &AuthUser,
    employee_id: Option<u64>,
    time: Option<&str>,
    date: Option<NaiveDate>,
) -> actix_web::Result<Entry> {
    let manual = time.is_some() || date.is_some() || employee_id.is_some_and(|id| Some(id) != auth.employee_id);
    if manual {
        auth.require_hr_or_admin()?;
    }

    let employee_id = match employee_id {
        Some(id) => id,
        None => auth.require_employee_id()?,
    };

    let now = Local::now();
    let time = match time {
        Some(t) => parse_time(t).map_err(ApiError::from)?,
        None => ClockTime::from(now.time()),
    };

    Ok(Entry {
        employee_id,
        date: date.unwrap_or_else(|| now.date_naive()),
        time,
    })
}

async fn fetch_record(pool: &MySqlPool, id: u64) -> Result<AttendanceWithShift, ApiError> {
    sqlx::query_as::<_, AttendanceWithShift>(&format!("{SELECT_ATTENDANCE_WITH_SHIFT} WHERE a.id = ?"))
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(ApiError::db("Failed to fetch attendance record"))
}

pub(crate) async fn active_shift(pool: &MySqlPool, shift_id: u64) -> Result<Shift, ApiError> {
    let shift = fetch_shift(pool, shift_id)
        .await
        .map_err(ApiError::db("Failed to fetch shift"))?
        .ok_or_else(|| ApiError::not_found("Shift not found"))?;

    if !shift.is_active {
        return Err(ApiError::bad_request("Shift is not active"));
    }
    Ok(shift)
}

async fn record_check_in(
    pool: &MySqlPool,
    rules: &AttendanceRules,
    entry: Entry,
    shift: &Shift,
    note: Option<&str>,
) -> Result<AttendanceResponse, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, shift_id, date, check_in, note)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.employee_id)
    .bind(shift.id)
    .bind(entry.date)
    .bind(entry.time.to_naive_time())
    .bind(note)
    .execute(pool)
    .await;

    let result = match result {
        Ok(r) => r,
        // unique (employee_id, date, shift_id)
        Err(e) if is_duplicate_key(&e) => {
            return Err(ApiError::conflict("Already checked in for this shift today"));
        }
        Err(e) => {
            tracing::error!(error = %e, employee_id = entry.employee_id, "Check-in failed");
            return Err(ApiError::Internal);
        }
    };

    let response = AttendanceResponse::from_row(fetch_record(pool, result.last_insert_id()).await?, rules);
    info!(
        employee_id = entry.employee_id,
        shift_id = shift.id,
        status = %response.classification.status,
        "Checked in"
    );
    Ok(response)
}

async fn record_check_out(
    pool: &MySqlPool,
    rules: &AttendanceRules,
    entry: Entry,
    shift_id: Option<u64>,
) -> Result<AttendanceResponse, ApiError> {
    let mut sql = String::from(
        r#"
        SELECT id, employee_id, shift_id, date, check_in, check_out, note
        FROM attendance
        WHERE employee_id = ? AND date = ? AND check_out IS NULL
        "#,
    );
    if shift_id.is_some() {
        sql.push_str(" AND shift_id = ?");
    }
    sql.push_str(" ORDER BY check_in DESC LIMIT 1");

    let mut query = sqlx::query_as::<_, Attendance>(&sql)
        .bind(entry.employee_id)
        .bind(entry.date);
    if let Some(shift_id) = shift_id {
        query = query.bind(shift_id);
    }

    let open = query
        .fetch_optional(pool)
        .await
        .map_err(ApiError::db("Failed to look up open check-in"))?
        .ok_or_else(|| ApiError::bad_request("No active check-in found for today"))?;

    if let Some(check_in) = open.check_in {
        if entry.time < ClockTime::from(check_in) {
            return Err(ApiError::bad_request("Check-out time is before check-in time"));
        }
    }

    sqlx::query("UPDATE attendance SET check_out = ? WHERE id = ? AND check_out IS NULL")
        .bind(entry.time.to_naive_time())
        .bind(open.id)
        .execute(pool)
        .await
        .map_err(ApiError::db("Check-out failed"))?;

    let response = AttendanceResponse::from_row(fetch_record(pool, open.id).await?, rules);
    info!(
        employee_id = entry.employee_id,
        attendance_id = open.id,
        status = %response.classification.status,
        "Checked out"
    );
    Ok(response)
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in successfully", body = AttendanceResponse),
        (status = 400, description = "Invalid time or inactive shift", body = Object, example = json!({
            "message": "Shift is not active"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already checked in", body = Object, example = json!({
            "message": "Already checked in for this shift today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_in", skip(auth, pool, config, payload), fields(user_id = auth.user_id, shift_id = payload.shift_id))]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let entry = resolve_entry(
        &auth,
        payload.employee_id,
        payload.check_in_time.as_deref(),
        payload.date,
    )?;
    let shift = active_shift(pool.get_ref(), payload.shift_id).await?;

    let response = record_check_in(
        pool.get_ref(),
        &config.attendance_rules,
        entry,
        &shift,
        payload.note.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(response))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = AttendanceResponse),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: Option<web::Json<CheckOutRequest>>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, time, date) = match &payload {
        Some(p) => (p.employee_id, p.check_out_time.as_deref(), p.date),
        None => (None, None, None),
    };
    let entry = resolve_entry(&auth, employee_id, time, date)?;

    let response = record_check_out(pool.get_ref(), &config.attendance_rules, entry, None).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// QR check-in / check-out
#[utoipa::path(
    post,
    path = "/api/attendance/qr",
    request_body = QrScanRequest,
    responses(
        (status = 200, description = "Checked out via QR code", body = AttendanceResponse),
        (status = 201, description = "Checked in via QR code", body = AttendanceResponse),
        (status = 400, description = "Invalid or expired QR code"),
        (status = 403, description = "QR code belongs to another department"),
        (status = 409, description = "Already checked in")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn qr_scan(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<QrScanRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let qr = verify_qr_token(payload.token.trim(), &config.jwt_secret).map_err(|e| {
        warn!(error = %e, employee_id, "Rejected QR code");
        ApiError::bad_request("Invalid or expired QR code")
    })?;

    let department_id = match auth.department_id {
        Some(d) => Some(d),
        None => sqlx::query_scalar::<_, Option<u64>>(
            "SELECT department_id FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to fetch employee department"))?
        .flatten(),
    };

    if department_id != Some(qr.department_id) {
        return Err(ApiError::forbidden("You can only check in for your department").into());
    }

    let entry = resolve_entry(&auth, None, None, None)?;
    let rules = &config.attendance_rules;

    match qr.kind {
        QrKind::CheckIn => {
            let shift = active_shift(pool.get_ref(), qr.shift_id).await?;
            let response = record_check_in(pool.get_ref(), rules, entry, &shift, None).await?;
            Ok(HttpResponse::Created().json(response))
        }
        QrKind::CheckOut => {
            let response =
                record_check_out(pool.get_ref(), rules, entry, Some(qr.shift_id)).await?;
            Ok(HttpResponse::Ok().json(response))
        }
    }
}
