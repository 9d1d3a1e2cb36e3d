use std::sync::LazyLock;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{decode_refresh, encode_token, AccessClaims, RefreshClaims};
use crate::auth::password;
use crate::db;
use crate::db::seed::SeedUser;
use crate::db::users::UserFilter;
use crate::error::AppError;
use crate::models::{assign_optional_text, assign_text, Grants, User, UserInfo};
use crate::query::{non_empty, require_int, Page};
use crate::routes::{check_len, check_opt_len, MessageResponse};
use crate::state::SharedState;
use crate::upload;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 50;
const MAX_HEAD_PIC_LEN: usize = 100;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub nick_name: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub nick_name: Option<String>,
    pub head_pic: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshParams {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page_no: Option<String>,
    pub page_size: Option<String>,
    pub username: Option<String>,
    pub nick_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_info: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub users: Vec<User>,
    pub total_count: i64,
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

/// Sign a fresh access/refresh pair from the user's current roles and permissions.
fn issue_tokens(state: &SharedState, user: &User, grants: &Grants) -> Result<TokenPair, AppError> {
    let access = AccessClaims::new(
        user.id,
        user.username.clone(),
        grants.roles.clone(),
        grants.permissions.clone(),
        state.config.access_token_ttl,
    );
    let refresh = RefreshClaims::new(user.id, state.config.refresh_token_ttl);

    Ok(TokenPair {
        access_token: encode_token(&access, &state.config.jwt_secret).map_err(AppError::Internal)?,
        refresh_token: encode_token(&refresh, &state.config.jwt_secret)
            .map_err(AppError::Internal)?,
    })
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if req.username.is_empty() || req.nick_name.is_empty() || req.email.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    check_len("username", &req.username, MAX_NAME_LEN)?;
    check_len("nickName", &req.nick_name, MAX_NAME_LEN)?;
    check_len("email", &req.email, MAX_EMAIL_LEN)?;
    validate_password(&req.password)?;
    validate_email(&req.email)?;

    if db::users::find_by_username(&state.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // The unique index catches a concurrent registration that slipped past the check above
    let user = db::users::create(&state.pool, &req.username, &pw_hash, &req.nick_name, &req.email)
        .await
        .map_err(|e| AppError::on_unique(e, "Username already exists"))?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(MessageResponse::new("Registered successfully")))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    sign_in(&state, req, false).await.map(Json)
}

pub async fn admin_login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    sign_in(&state, req, true).await.map(Json)
}

async fn sign_in(
    state: &SharedState,
    req: LoginRequest,
    is_admin: bool,
) -> Result<LoginResponse, AppError> {
    let user = db::users::find_for_login(&state.pool, &req.username, is_admin)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if user.is_frozen {
        return Err(AppError::Forbidden("Account is frozen".to_string()));
    }

    let valid = password::verify(&req.password, &user.password).map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let grants = db::roles::grants_for_user(&state.pool, user.id).await?;
    let tokens = issue_tokens(state, &user, &grants)?;

    tracing::info!(user_id = user.id, is_admin, "User logged in");

    Ok(LoginResponse {
        user_info: UserInfo::new(user, grants),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}

pub async fn refresh(
    State(state): State<SharedState>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<TokenPair>, AppError> {
    let expired = || AppError::Unauthorized("Token has expired, please log in again".to_string());

    let token = params.refresh_token.ok_or_else(expired)?;
    let claims = decode_refresh(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected refresh token: {e}");
        expired()
    })?;

    let user = db::users::find_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(expired)?;
    let grants = db::roles::grants_for_user(&state.pool, user.id).await?;

    Ok(Json(issue_tokens(&state, &user, &grants)?))
}

pub async fn info(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let mut user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    check_opt_len("nickName", req.nick_name.as_deref(), MAX_NAME_LEN)?;
    check_opt_len("email", req.email.as_deref(), MAX_EMAIL_LEN)?;
    check_opt_len("headPic", req.head_pic.as_deref(), MAX_HEAD_PIC_LEN)?;
    if let Some(email) = req.email.as_deref().filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }

    assign_text(&mut user.nick_name, req.nick_name);
    assign_text(&mut user.email, req.email);
    assign_optional_text(&mut user.head_pic, req.head_pic);

    let user = db::users::save_profile(&state.pool, &user).await?;
    tracing::info!(user_id = user.id, "User profile updated");

    Ok(Json(user))
}

pub async fn update_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_password(&req.password)?;

    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(MessageResponse::new("Password updated")))
}

pub async fn freeze(
    State(state): State<SharedState>,
    Query(params): Query<IdParams>,
) -> Result<Json<MessageResponse>, AppError> {
    let id: i64 = require_int("id", params.id.as_deref())?;

    if db::users::freeze(&state.pool, id).await? == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, "User frozen");
    Ok(Json(MessageResponse::new("success")))
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<UserList>, AppError> {
    let page = Page::parse(params.page_no.as_deref(), params.page_size.as_deref())?;
    let filter = UserFilter {
        username: non_empty(params.username),
        nick_name: non_empty(params.nick_name),
        email: non_empty(params.email),
    };

    let users = db::users::list(&state.pool, &filter, page.size, page.offset()).await?;
    let total_count = db::users::count(&state.pool, &filter).await?;

    Ok(Json(UserList { users, total_count }))
}

/// Multipart upload of an avatar image (field `file`). Returns the stored path.
pub async fn upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<String>, AppError> {
    let limit = upload::body_limit(state.config.max_upload_size);
    let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::debug!("Rejected upload body: {e}");
        AppError::BadRequest(format!("Upload is larger than {limit} bytes"))
    })?;

    let file = upload::read_file_field(&headers, body, "file")
        .await
        .map_err(AppError::BadRequest)?;
    upload::check_image(&file, state.config.max_upload_size).map_err(AppError::BadRequest)?;

    let path = upload::store(&state.config.upload_dir, &file)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

    tracing::info!(path = %path.display(), size = file.data.len(), "File uploaded");
    Ok(Json(path.to_string_lossy().into_owned()))
}

/// Seed the reference roles/permissions and the two demo accounts.
pub async fn init_data(State(state): State<SharedState>) -> Result<Json<MessageResponse>, AppError> {
    let users = [
        SeedUser {
            username: "zhangsan",
            password_hash: password::hash("111111").map_err(AppError::Internal)?,
            nick_name: "张三",
            email: "xxx@xx.com",
            is_admin: true,
            role: "管理员",
        },
        SeedUser {
            username: "lisi",
            password_hash: password::hash("222222").map_err(AppError::Internal)?,
            nick_name: "李四",
            email: "yy@yy.com",
            is_admin: false,
            role: "普通用户",
        },
    ];

    db::seed::roles_and_users(&state.pool, &users).await?;
    tracing::info!("Seeded roles, permissions and demo users");

    Ok(Json(MessageResponse::new("done")))
}
