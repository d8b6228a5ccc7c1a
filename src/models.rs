use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8,        // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
    #[serde(default)]
    pub department_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QrKind {
    CheckIn,
    CheckOut,
}

/// Payload encoded into the QR code displayed at a department's terminal.
#[derive(Debug, Serialize, Deserialize)]
pub struct QrClaims {
    pub shift_id: u64,
    pub department_id: u64,
    pub kind: QrKind,
    pub exp: usize,
    pub jti: String,
    /// Manager who issued the code
    pub issued_by: u64,
}
