pub mod app;
pub mod meeting_room;
pub mod user;

use axum::routing::{delete, get, post};
use axum::Router;
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::guard::{guarded, Access};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Reject `value` when it has more than `max` characters (the column width).
pub fn check_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// [`check_len`] for optional fields; absent values pass.
pub fn check_opt_len(field: &str, value: Option<&str>, max: usize) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| check_len(field, v, max))
}

pub fn api_routes(state: &SharedState) -> Router<SharedState> {
    Router::new()
        .merge(app_routes(state))
        .merge(user_routes(state))
        .merge(meeting_room_routes())
}

fn app_routes(state: &SharedState) -> Router<SharedState> {
    let group = Access::new().require_login();
    let open = group.resolve(&Access::new().allow_anonymous());

    Router::new()
        .route("/", guarded(get(app::hello), state, open.clone()))
        .route(
            "/aaa",
            guarded(
                get(app::aaa),
                state,
                group.resolve(&Access::new().require_permissions(&["ccc"])),
            ),
        )
        .route("/bbb", guarded(get(app::bbb), state, open))
}

fn user_routes(state: &SharedState) -> Router<SharedState> {
    let login = Access::new().require_login();

    Router::new()
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login))
        .route("/user/admin/login", post(user::admin_login))
        .route("/user/initData", post(user::init_data))
        .route("/user/refresh", get(user::refresh))
        .route("/user/info", guarded(get(user::info), state, login.clone()))
        .route(
            "/user/update_password",
            guarded(post(user::update_password), state, login.clone()),
        )
        .route(
            "/user/admin/update_password",
            guarded(post(user::update_password), state, login.clone()),
        )
        .route("/user/update", guarded(post(user::update), state, login.clone()))
        .route("/user/admin/update", guarded(post(user::update), state, login))
        .route("/user/freeze", get(user::freeze))
        .route("/user/list", get(user::list))
        .route("/user/upload", post(user::upload))
}

fn meeting_room_routes() -> Router<SharedState> {
    Router::new()
        .route("/meeting-room/initData", post(meeting_room::init_data))
        .route("/meeting-room/list", get(meeting_room::list))
        .route("/meeting-room/create", post(meeting_room::create))
        .route("/meeting-room/update", post(meeting_room::update))
        .route("/meeting-room/detail", get(meeting_room::detail))
        .route("/meeting-room/delete", delete(meeting_room::delete))
}
