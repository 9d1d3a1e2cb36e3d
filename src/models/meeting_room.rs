use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRoom {
    pub id: i64,
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub equipment: String,
    pub description: String,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for a new room.
#[derive(Debug, Clone)]
pub struct NewMeetingRoom {
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub equipment: String,
    pub description: String,
}
