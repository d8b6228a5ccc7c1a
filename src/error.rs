use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

use crate::engine::{TimeError, calendar::CalendarError, payroll::PayrollError};

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "{}", message)]
    BadRequest { message: String },

    #[display(fmt = "{}", message)]
    Forbidden { message: String },

    #[display(fmt = "{}", message)]
    NotFound { message: String },

    #[display(fmt = "{}", message)]
    Conflict { message: String },

    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }

    /// Log the database error and hide it from the client.
    pub fn db(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |e| {
            tracing::error!(error = %e, "{}", context);
            ApiError::Internal
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

impl From<TimeError> for ApiError {
    fn from(e: TimeError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<CalendarError> for ApiError {
    fn from(e: CalendarError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<PayrollError> for ApiError {
    fn from(e: PayrollError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

/// Unique-key violation only; foreign-key and other integrity errors share
/// SQLSTATE 23000 but are not duplicates.
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[actix_web::test]
    async fn test_error_response_body() {
        let resp = ApiError::conflict("Already checked in today").error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["message"], "Already checked in today");
    }

    #[derive(Debug, Display, Error)]
    #[display(fmt = "integrity constraint violated")]
    struct TestDbError {
        kind_unique: bool,
    }

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "integrity constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23000"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.kind_unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    #[test]
    fn test_duplicate_key_ignores_foreign_key_failures() {
        let duplicate = sqlx::Error::Database(Box::new(TestDbError { kind_unique: true }));
        let missing_employee = sqlx::Error::Database(Box::new(TestDbError { kind_unique: false }));

        assert!(is_duplicate_key(&duplicate));
        assert!(!is_duplicate_key(&missing_employee));
        assert!(!is_duplicate_key(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_time_error_is_bad_request() {
        let err: ApiError = crate::engine::parse_time("25:00").unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("25:00"));
    }
}
