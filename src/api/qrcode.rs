use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::attendance::active_shift,
    auth::{auth::AuthUser, jwt::generate_qr_token},
    config::Config,
    error::ApiError,
    models::QrKind,
};

#[derive(Deserialize, ToSchema)]
pub struct IssueQrCode {
    #[schema(example = 1)]
    pub shift_id: u64,

    pub kind: QrKind,

    /// Required when the shift is not bound to a department
    #[schema(example = 2, nullable = true)]
    pub department_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct QrCodeResponse {
    /// Payload to render as a QR image
    pub token: String,
    pub shift_id: u64,
    pub department_id: u64,
    pub kind: QrKind,
    /// Unix timestamp (seconds)
    pub expires_at: usize,
}

/// A department-bound shift only issues codes for its own department.
fn resolve_department(
    shift_department: Option<u64>,
    requested: Option<u64>,
) -> Result<u64, ApiError> {
    match (shift_department, requested) {
        (Some(shift), Some(req)) if shift != req => Err(ApiError::bad_request(
            "Shift belongs to another department",
        )),
        (Some(shift), _) => Ok(shift),
        (None, Some(req)) => Ok(req),
        (None, None) => Err(ApiError::bad_request("department_id is required for this shift")),
    }
}

/// Issue a short-lived signed payload for a department's check-in terminal
#[utoipa::path(
    post,
    path = "/api/qrcode",
    request_body = IssueQrCode,
    responses(
        (status = 200, description = "QR payload issued", body = QrCodeResponse),
        (status = 400, description = "Inactive shift or department mismatch"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = [])),
    tag = "QR"
)]
pub async fn issue_qr_code(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<IssueQrCode>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let shift = active_shift(pool.get_ref(), payload.shift_id).await?;
    let department_id = resolve_department(shift.department_id, payload.department_id)?;

    let (token, claims) = generate_qr_token(
        shift.id,
        department_id,
        payload.kind,
        auth.user_id,
        &config.jwt_secret,
        config.qr_token_ttl,
    )
    .map_err(|e| {
        tracing::error!(error = %e, shift_id = shift.id, "Failed to sign QR payload");
        ApiError::Internal
    })?;

    info!(
        shift_id = shift.id,
        department_id,
        kind = ?claims.kind,
        issued_by = auth.user_id,
        "QR code issued"
    );

    Ok(HttpResponse::Ok().json(QrCodeResponse {
        token,
        shift_id: claims.shift_id,
        department_id: claims.department_id,
        kind: claims.kind,
        expires_at: claims.exp,
    }))
}
