use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Grants;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub nick_name: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile returned on login: the user plus flattened role names and permission codes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl UserInfo {
    pub fn new(user: User, grants: Grants) -> Self {
        Self {
            user,
            roles: grants.roles,
            permissions: grants.permissions,
        }
    }
}
