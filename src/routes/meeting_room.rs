use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::meeting_rooms::RoomFilter;
use crate::error::AppError;
use crate::models::{assign_text, MeetingRoom, NewMeetingRoom};
use crate::query::{non_empty, parse_int, require_int, Page};
use crate::routes::{check_opt_len, MessageResponse};
use crate::state::SharedState;

const NAME_TAKEN: &str = "Meeting room name already exists";
const MAX_FIELD_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 100;

#[derive(Deserialize)]
pub struct CreateMeetingRoom {
    pub name: String,
    pub capacity: i32,
    pub location: String,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMeetingRoom {
    pub id: i64,
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page_no: Option<String>,
    pub page_size: Option<String>,
    pub name: Option<String>,
    pub capacity: Option<String>,
    pub equipment: Option<String>,
}

#[derive(Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomList {
    pub meeting_rooms: Vec<MeetingRoom>,
    pub total_count: i64,
}

fn check_text_fields(
    name: Option<&str>,
    location: Option<&str>,
    equipment: Option<&str>,
    description: Option<&str>,
) -> Result<(), AppError> {
    check_opt_len("name", name, MAX_FIELD_LEN)?;
    check_opt_len("location", location, MAX_FIELD_LEN)?;
    check_opt_len("equipment", equipment, MAX_FIELD_LEN)?;
    check_opt_len("description", description, MAX_DESCRIPTION_LEN)
}

fn sample_rooms() -> Vec<NewMeetingRoom> {
    [
        ("木星", 10, "一层西", "白板"),
        ("金星", 5, "二层东", ""),
        ("天王星", 30, "三层东", "白板，电视"),
    ]
    .into_iter()
    .map(|(name, capacity, location, equipment)| NewMeetingRoom {
        name: name.to_string(),
        capacity,
        location: location.to_string(),
        equipment: equipment.to_string(),
        description: String::new(),
    })
    .collect()
}

async fn find_or_404(state: &SharedState, id: i64) -> Result<MeetingRoom, AppError> {
    db::meeting_rooms::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting room not found".to_string()))
}

pub async fn init_data(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, AppError> {
    let inserted = db::meeting_rooms::insert_missing(&state.pool, &sample_rooms()).await?;
    tracing::info!(inserted, "Seeded meeting rooms");
    Ok(Json(serde_json::json!({ "inserted": inserted })))
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<RoomList>, AppError> {
    let page = Page::parse(params.page_no.as_deref(), params.page_size.as_deref())?;
    let filter = RoomFilter {
        name: non_empty(params.name),
        capacity: parse_int("capacity", params.capacity.as_deref())?,
        equipment: non_empty(params.equipment),
    };

    let meeting_rooms = db::meeting_rooms::list(&state.pool, &filter, page.size, page.offset()).await?;
    let total_count = db::meeting_rooms::count(&state.pool, &filter).await?;

    Ok(Json(RoomList {
        meeting_rooms,
        total_count,
    }))
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateMeetingRoom>,
) -> Result<Json<MeetingRoom>, AppError> {
    if req.name.trim().is_empty() || req.location.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Name and location are required".to_string(),
        ));
    }
    if req.capacity < 1 {
        return Err(AppError::BadRequest("Capacity must be at least 1".to_string()));
    }
    check_text_fields(
        Some(req.name.as_str()),
        Some(req.location.as_str()),
        req.equipment.as_deref(),
        req.description.as_deref(),
    )?;

    if db::meeting_rooms::find_by_name(&state.pool, &req.name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(NAME_TAKEN.to_string()));
    }

    let new_room = NewMeetingRoom {
        name: req.name,
        capacity: req.capacity,
        location: req.location,
        equipment: req.equipment.unwrap_or_default(),
        description: req.description.unwrap_or_default(),
    };
    let room = db::meeting_rooms::create(&state.pool, &new_room)
        .await
        .map_err(|e| AppError::on_unique(e, NAME_TAKEN))?;

    tracing::info!(room_id = room.id, "Meeting room created");
    Ok(Json(room))
}

pub async fn update(
    State(state): State<SharedState>,
    Json(req): Json<UpdateMeetingRoom>,
) -> Result<Json<MeetingRoom>, AppError> {
    check_text_fields(
        req.name.as_deref(),
        req.location.as_deref(),
        req.equipment.as_deref(),
        req.description.as_deref(),
    )?;

    let mut room = find_or_404(&state, req.id).await?;

    if let Some(name) = req.name.as_deref().filter(|n| !n.is_empty() && *n != room.name) {
        if db::meeting_rooms::find_by_name(&state.pool, name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(NAME_TAKEN.to_string()));
        }
    }

    assign_text(&mut room.name, req.name);
    assign_text(&mut room.location, req.location);
    assign_text(&mut room.equipment, req.equipment);
    assign_text(&mut room.description, req.description);
    if let Some(capacity) = req.capacity.filter(|c| *c > 0) {
        room.capacity = capacity;
    }

    let room = db::meeting_rooms::update(&state.pool, &room)
        .await
        .map_err(|e| AppError::on_unique(e, NAME_TAKEN))?;

    tracing::info!(room_id = room.id, "Meeting room updated");
    Ok(Json(room))
}

pub async fn detail(
    State(state): State<SharedState>,
    Query(params): Query<IdParams>,
) -> Result<Json<MeetingRoom>, AppError> {
    let id = require_int("id", params.id.as_deref())?;
    Ok(Json(find_or_404(&state, id).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    Query(params): Query<IdParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = require_int("id", params.id.as_deref())?;
    let room = find_or_404(&state, id).await?;

    db::meeting_rooms::delete(&state.pool, room.id).await?;

    tracing::info!(room_id = room.id, "Meeting room deleted");
    Ok(Json(MessageResponse::new("success")))
}
