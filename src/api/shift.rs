use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    engine::{ClockTime, parse_time},
    error::ApiError,
    model::shift::{Shift, ShiftResponse},
    utils::{
        db_utils::{Column, ColumnKind, build_update_sql, execute_update},
        shift_cache::{self, SELECT_SHIFT, fetch_shift},
    },
};

const SHIFT_COLUMNS: &[Column] = &[
    Column::new("name", ColumnKind::Text),
    Column::new("start_time", ColumnKind::Time),
    Column::new("end_time", ColumnKind::Time),
    Column::nullable("department_id", ColumnKind::UInt),
    Column::new("is_active", ColumnKind::Bool),
];

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = "Morning")]
    pub name: String,
    #[schema(example = "08:00")]
    pub start_time: String,
    #[schema(example = "17:00")]
    pub end_time: String,
    #[schema(example = 2, nullable = true)]
    pub department_id: Option<u64>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShiftQuery {
    /// Defaults to true
    pub active_only: Option<bool>,
    pub department_id: Option<u64>,
}

/// Shifts never span midnight.
fn validate_window(start: ClockTime, end: ClockTime) -> Result<(), ApiError> {
    if end <= start {
        return Err(ApiError::bad_request(
            "Shift end_time must be after start_time",
        ));
    }
    Ok(())
}

/// Create Shift
#[utoipa::path(
    post,
    path = "/api/shift",
    request_body = CreateShift,
    responses(
        (status = 201, description = "Shift created", body = ShiftResponse),
        (status = 400, description = "Invalid shift times"),
        (status = 403, description = "HR/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShift>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Shift name must not be empty").into());
    }

    let start = parse_time(&payload.start_time).map_err(ApiError::from)?;
    let end = parse_time(&payload.end_time).map_err(ApiError::from)?;
    validate_window(start, end)?;

    let result = sqlx::query(
        r#"
        INSERT INTO shifts (name, start_time, end_time, department_id, is_active)
        VALUES (?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(name)
    .bind(start.to_naive_time())
    .bind(end.to_naive_time())
    .bind(payload.department_id)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::db("Failed to create shift"))?;

    let shift = Shift {
        id: result.last_insert_id(),
        name: name.to_string(),
        start_time: start.to_naive_time(),
        end_time: end.to_naive_time(),
        department_id: payload.department_id,
        is_active: true,
    };
    info!(shift_id = shift.id, created_by = auth.user_id, "Shift created");

    let response = ShiftResponse::from(&shift);
    shift_cache::put(shift).await;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    get,
    path = "/api/shift",
    params(ShiftQuery),
    responses(
        (status = 200, description = "Shift list", body = [ShiftResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ShiftQuery>,
) -> actix_web::Result<impl Responder> {
    let mut conditions = Vec::new();
    if query.active_only.unwrap_or(true) {
        conditions.push("is_active = TRUE");
    }
    if query.department_id.is_some() {
        conditions.push("department_id = ?");
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!("{SELECT_SHIFT} {where_clause} ORDER BY start_time, id");
    debug!(sql = %sql, "Listing shifts");

    let mut q = sqlx::query_as::<_, Shift>(&sql);
    if let Some(department_id) = query.department_id {
        q = q.bind(department_id);
    }

    let shifts = q
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to list shifts"))?;

    let data: Vec<ShiftResponse> = shifts.iter().map(ShiftResponse::from).collect();
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    get,
    path = "/api/shift/{shift_id}",
    params(("shift_id", Path, description = "Shift ID")),
    responses(
        (status = 200, body = ShiftResponse),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn get_shift(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let shift_id = path.into_inner();

    let shift = fetch_shift(pool.get_ref(), shift_id)
        .await
        .map_err(ApiError::db("Failed to fetch shift"))?
        .ok_or_else(|| ApiError::not_found("Shift not found"))?;

    Ok(HttpResponse::Ok().json(ShiftResponse::from(&shift)))
}

/// Partial update; only name, start_time, end_time, department_id and
/// is_active may be changed.
#[utoipa::path(
    put,
    path = "/api/shift/{shift_id}",
    params(("shift_id", Path, description = "Shift ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Shift updated"),
        (status = 400, description = "Invalid field or value"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn update_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let shift_id = path.into_inner();

    let update = build_update_sql("shifts", SHIFT_COLUMNS, &body, "id", shift_id)?;

    let current = fetch_shift(pool.get_ref(), shift_id)
        .await
        .map_err(ApiError::db("Failed to fetch shift"))?
        .ok_or_else(|| ApiError::not_found("Shift not found"))?;

    // The builder has already validated any time strings present.
    let time_field = |key: &str, fallback: NaiveTime| -> Result<ClockTime, ApiError> {
        match body.get(key).and_then(Value::as_str) {
            Some(s) => Ok(parse_time(s)?),
            None => Ok(ClockTime::from(fallback)),
        }
    };
    validate_window(
        time_field("start_time", current.start_time)?,
        time_field("end_time", current.end_time)?,
    )?;

    execute_update(pool.get_ref(), update)
        .await
        .map_err(ApiError::db("Failed to update shift"))?;

    shift_cache::invalidate(shift_id).await;
    info!(shift_id, updated_by = auth.user_id, "Shift updated");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Shift updated successfully"
    })))
}

/// Shifts are referenced by attendance history, so they are deactivated
/// rather than deleted.
#[utoipa::path(
    delete,
    path = "/api/shift/{shift_id}",
    params(("shift_id", Path, description = "Shift ID")),
    responses(
        (status = 200, description = "Shift deactivated"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn deactivate_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    let shift_id = path.into_inner();

    let result = sqlx::query("UPDATE shifts SET is_active = FALSE WHERE id = ?")
        .bind(shift_id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::db("Failed to deactivate shift"))?;

    shift_cache::invalidate(shift_id).await;

    if result.rows_affected() == 0 {
        // MySQL reports 0 for an already-inactive row as well
        let exists = fetch_shift(pool.get_ref(), shift_id)
            .await
            .map_err(ApiError::db("Failed to fetch shift"))?
            .is_some();
        if !exists {
            return Err(ApiError::not_found("Shift not found").into());
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Shift deactivated"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_window() {
        let t = |s| parse_time(s).unwrap();
        assert!(validate_window(t("08:00"), t("17:00")).is_ok());
        assert!(validate_window(t("08:00"), t("08:00")).is_err());
        assert!(validate_window(t("22:00"), t("06:00")).is_err());
    }
}
