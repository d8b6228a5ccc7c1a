use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, QrClaims, QrKind, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

/// Verify an access token issued by the identity service.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("not an access token".to_string());
    }

    Ok(claims)
}

pub fn generate_qr_token(
    shift_id: u64,
    department_id: u64,
    kind: QrKind,
    issued_by: u64,
    secret: &str,
    ttl: usize,
) -> Result<(String, QrClaims), jsonwebtoken::errors::Error> {
    let claims = QrClaims {
        shift_id,
        department_id,
        kind,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        issued_by,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_qr_token(token: &str, secret: &str) -> Result<QrClaims, String> {
    decode::<QrClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub fn issue_test_token(
    role: u8,
    employee_id: Option<u64>,
    department_id: Option<u64>,
    token_type: TokenType,
    secret: &str,
) -> String {
    let claims = Claims {
        user_id: 1,
        sub: "tester".to_string(),
        role,
        exp: now() + 600,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id,
        department_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_token_round_trip() {
        let (token, issued) = generate_qr_token(3, 7, QrKind::CheckIn, 1, "secret", 60).unwrap();
        let claims = verify_qr_token(&token, "secret").unwrap();
        assert_eq!(claims.shift_id, 3);
        assert_eq!(claims.department_id, 7);
        assert_eq!(claims.kind, QrKind::CheckIn);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_qr_token_rejects_wrong_secret() {
        let (token, _) = generate_qr_token(3, 7, QrKind::CheckOut, 1, "secret", 60).unwrap();
        assert!(verify_qr_token(&token, "other").is_err());
    }

    #[test]
    fn test_access_token_is_not_a_qr_token() {
        let token = issue_test_token(3, Some(10), Some(7), TokenType::Access, "secret");
        assert!(verify_qr_token(&token, "secret").is_err());
        assert!(verify_token(&token, "secret").is_ok());
    }

    #[test]
    fn test_refresh_token_is_rejected() {
        let token = issue_test_token(3, Some(10), None, TokenType::Refresh, "secret");
        assert!(verify_token(&token, "secret").is_err());
    }
}
