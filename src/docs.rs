use crate::api::attendance::{AttendanceResponse, CheckInRequest, CheckOutRequest, QrScanRequest};
use crate::api::payroll::{CalculatePayroll, PaginatedPayrollResponse, PayrollCalculation};
use crate::api::qrcode::{IssueQrCode, QrCodeResponse};
use crate::api::report::{ClassifiedRecord, RecordsPayload, SummaryResponse};
use crate::api::shift::CreateShift;
use crate::engine::payroll::PayrollLine;
use crate::engine::{
    AttendanceRecord, AttendanceRules, AttendanceStatus, Classification, MonthlySummary,
    ShiftWindow,
};
use crate::model::payroll::Payroll;
use crate::model::shift::ShiftResponse;
use crate::models::QrKind;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance & Shift Rules

Shift scheduling, check-in/check-out capture and the attendance rules
engine of the HRM system.

### 🔹 Key Features
- **Shifts**
  - Create, list, update and deactivate shift schedules
- **Attendance**
  - Manual or QR-code check-in and check-out
  - Every record is classified: `on-time`, `late`, `early`, `late-early`,
    `out-of-shift` or `unknown`
  - Monthly per-employee summaries (work days, late days, early leaves,
    missing check-outs)
- **Payroll**
  - Prorated salary with overtime, computed from the monthly summary

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Shift management, QR issuance, monthly reports and payroll are restricted
to **Admin** and **HR**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,
        crate::api::shift::get_shift,
        crate::api::shift::update_shift,
        crate::api::shift::deactivate_shift,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::qr_scan,

        crate::api::report::classify_records,
        crate::api::report::summarize_records,
        crate::api::report::list_records,
        crate::api::report::monthly_summary,

        crate::api::qrcode::issue_qr_code,

        crate::api::payroll::calculate_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            CreateShift,
            ShiftResponse,
            CheckInRequest,
            CheckOutRequest,
            QrScanRequest,
            AttendanceResponse,
            AttendanceRecord,
            ShiftWindow,
            AttendanceRules,
            AttendanceStatus,
            Classification,
            MonthlySummary,
            RecordsPayload,
            ClassifiedRecord,
            SummaryResponse,
            QrKind,
            IssueQrCode,
            QrCodeResponse,
            CalculatePayroll,
            PayrollCalculation,
            PayrollLine,
            Payroll,
            PaginatedPayrollResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Shift", description = "Shift schedule APIs"),
        (name = "Attendance", description = "Attendance capture and classification APIs"),
        (name = "QR", description = "QR check-in code APIs"),
        (name = "Payroll", description = "Payroll calculation APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_attendance_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/shift",
            "/api/attendance",
            "/api/attendance/qr",
            "/api/attendance/summary",
            "/api/qrcode",
            "/api/payroll/calculate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
