use sqlx::PgPool;

use crate::models::{MeetingRoom, NewMeetingRoom};

#[derive(Debug, Default)]
pub struct RoomFilter {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub equipment: Option<String>,
}

pub async fn create(pool: &PgPool, room: &NewMeetingRoom) -> Result<MeetingRoom, sqlx::Error> {
    sqlx::query_as::<_, MeetingRoom>(
        "INSERT INTO meeting_rooms (name, capacity, location, equipment, description)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&room.name)
    .bind(room.capacity)
    .bind(&room.location)
    .bind(&room.equipment)
    .bind(&room.description)
    .fetch_one(pool)
    .await
}

/// Insert rooms, skipping any whose name is already taken. Returns how many were inserted.
pub async fn insert_missing(pool: &PgPool, rooms: &[NewMeetingRoom]) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for room in rooms {
        let result = sqlx::query(
            "INSERT INTO meeting_rooms (name, capacity, location, equipment, description)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&room.name)
        .bind(room.capacity)
        .bind(&room.location)
        .bind(&room.equipment)
        .bind(&room.description)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<MeetingRoom>, sqlx::Error> {
    sqlx::query_as::<_, MeetingRoom>("SELECT * FROM meeting_rooms WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<MeetingRoom>, sqlx::Error> {
    sqlx::query_as::<_, MeetingRoom>("SELECT * FROM meeting_rooms WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn update(pool: &PgPool, room: &MeetingRoom) -> Result<MeetingRoom, sqlx::Error> {
    sqlx::query_as::<_, MeetingRoom>(
        "UPDATE meeting_rooms
         SET name = $2, capacity = $3, location = $4, equipment = $5, description = $6,
             updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(room.id)
    .bind(&room.name)
    .bind(room.capacity)
    .bind(&room.location)
    .bind(&room.equipment)
    .bind(&room.description)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM meeting_rooms WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list(
    pool: &PgPool,
    filter: &RoomFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<MeetingRoom>, sqlx::Error> {
    sqlx::query_as::<_, MeetingRoom>(
        "SELECT * FROM meeting_rooms
         WHERE ($1::text IS NULL OR name ILIKE $1)
           AND ($2::int IS NULL OR capacity = $2)
           AND ($3::text IS NULL OR equipment ILIKE $3)
         ORDER BY id LIMIT $4 OFFSET $5",
    )
    .bind(filter.name.as_ref().map(|s| format!("%{s}%")))
    .bind(filter.capacity)
    .bind(filter.equipment.as_ref().map(|s| format!("%{s}%")))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &RoomFilter) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM meeting_rooms
         WHERE ($1::text IS NULL OR name ILIKE $1)
           AND ($2::int IS NULL OR capacity = $2)
           AND ($3::text IS NULL OR equipment ILIKE $3)",
    )
    .bind(filter.name.as_ref().map(|s| format!("%{s}%")))
    .bind(filter.capacity)
    .bind(filter.equipment.as_ref().map(|s| format!("%{s}%")))
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
