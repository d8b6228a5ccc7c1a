use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::engine::ClockTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Shift {
    pub id: u64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub department_id: Option<u64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Morning",
        "start_time": "08:00",
        "end_time": "17:00",
        "department_id": 2,
        "is_active": true
    })
)]
pub struct ShiftResponse {
    pub id: u64,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    #[schema(nullable = true)]
    pub department_id: Option<u64>,
    pub is_active: bool,
}

impl From<&Shift> for ShiftResponse {
    fn from(s: &Shift) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            start_time: ClockTime::from(s.start_time).to_string(),
            end_time: ClockTime::from(s.end_time).to_string(),
            department_id: s.department_id,
            is_active: s.is_active,
        }
    }
}
