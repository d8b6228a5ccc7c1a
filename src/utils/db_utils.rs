use actix_web::error::ErrorBadRequest;
use chrono::NaiveTime;
use serde_json::Value;
use sqlx::MySqlPool;

use crate::engine::parse_time;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    Time(NaiveTime),
    Null,
}

/// How an updatable column's JSON value is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Text,
    /// `HH:mm` wall-clock time
    Time,
    UInt,
    Bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

fn convert(column: &Column, value: &Value) -> Result<SqlValue, actix_web::Error> {
    let invalid = || ErrorBadRequest(format!("Invalid value for field '{}'", column.name));

    match (column.kind, value) {
        (_, Value::Null) if column.nullable => Ok(SqlValue::Null),
        (_, Value::Null) => Err(ErrorBadRequest(format!(
            "Field '{}' cannot be null",
            column.name
        ))),
        (ColumnKind::Text, Value::String(s)) => {
            if s.trim().is_empty() {
                return Err(invalid());
            }
            Ok(SqlValue::String(s.trim().to_string()))
        }
        (ColumnKind::Time, Value::String(s)) => {
            let t = parse_time(s).map_err(ErrorBadRequest)?;
            Ok(SqlValue::Time(t.to_naive_time()))
        }
        (ColumnKind::UInt, Value::Number(n)) => n.as_u64().map(SqlValue::U64).ok_or_else(invalid),
        (ColumnKind::Bool, Value::Bool(b)) => Ok(SqlValue::Bool(*b)),
        _ => Err(invalid()),
    }
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Only whitelisted columns may appear in the payload; column names are never
/// taken from the request.
pub fn build_update_sql(
    table: &str,
    columns: &[Column],
    payload: &Value,
    id_column: &str,
    id_value: u64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    let mut assignments = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    for (key, value) in obj {
        let column = columns
            .iter()
            .find(|c| c.name == key.as_str())
            .ok_or_else(|| ErrorBadRequest(format!("Field '{}' cannot be updated", key)))?;

        assignments.push(format!("{} = ?", column.name));
        values.push(convert(column, value)?);
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        assignments.join(", "),
        id_column
    );

    // WHERE id = ?
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::new("name", ColumnKind::Text),
        Column::new("start_time", ColumnKind::Time),
        Column::nullable("department_id", ColumnKind::UInt),
        Column::new("is_active", ColumnKind::Bool),
    ];

    #[test]
    fn test_builds_update_for_whitelisted_columns() {
        let update = build_update_sql(
            "shifts",
            COLUMNS,
            &json!({ "start_time": "7:30" }),
            "id",
            4,
        )
        .unwrap();

        assert_eq!(update.sql, "UPDATE shifts SET start_time = ? WHERE id = ?");
        assert_eq!(
            update.values,
            vec![
                SqlValue::Time(NaiveTime::from_hms_opt(7, 30, 0).unwrap()),
                SqlValue::U64(4),
            ]
        );
    }

    #[test]
    fn test_nullable_column_accepts_null() {
        let update = build_update_sql(
            "shifts",
            COLUMNS,
            &json!({ "department_id": null }),
            "id",
            4,
        )
        .unwrap();

        assert_eq!(update.values, vec![SqlValue::Null, SqlValue::U64(4)]);
    }

    #[test]
    fn test_rejects_unknown_column() {
        let err = build_update_sql("shifts", COLUMNS, &json!({ "id; DROP": 1 }), "id", 1);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        for payload in [
            json!({}),
            json!([1, 2]),
            json!({ "start_time": "25:00" }),
            json!({ "name": null }),
            json!({ "name": "  " }),
            json!({ "is_active": "yes" }),
            json!({ "department_id": -3 }),
        ] {
            assert!(
                build_update_sql("shifts", COLUMNS, &payload, "id", 1).is_err(),
                "payload {payload} should be rejected"
            );
        }
    }
}
