use sqlx::PgPool;

use crate::models::User;

/// Substring filters for the user list. `None` means "don't filter".
#[derive(Debug, Default)]
pub struct UserFilter {
    pub username: Option<String>,
    pub nick_name: Option<String>,
    pub email: Option<String>,
}

impl UserFilter {
    fn patterns(&self) -> [Option<String>; 3] {
        [&self.username, &self.nick_name, &self.email].map(|f| f.as_ref().map(|s| format!("%{s}%")))
    }
}

pub async fn create(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    nick_name: &str,
    email: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password, nick_name, email)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(username)
    .bind(password_hash)
    .bind(nick_name)
    .bind(email)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Login lookup. Admin and regular accounts sign in through separate routes.
pub async fn find_for_login(
    pool: &PgPool,
    username: &str,
    is_admin: bool,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 AND is_admin = $2")
        .bind(username)
        .bind(is_admin)
        .fetch_optional(pool)
        .await
}

pub async fn save_profile(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET nick_name = $2, email = $3, head_pic = $4, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&user.nick_name)
    .bind(&user.email)
    .bind(&user.head_pic)
    .fetch_one(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the number of rows touched (0 when the user doesn't exist).
pub async fn freeze(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_frozen = true, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list(
    pool: &PgPool,
    filter: &UserFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    let [username, nick_name, email] = filter.patterns();
    sqlx::query_as::<_, User>(
        "SELECT * FROM users
         WHERE ($1::text IS NULL OR username ILIKE $1)
           AND ($2::text IS NULL OR nick_name ILIKE $2)
           AND ($3::text IS NULL OR email ILIKE $3)
         ORDER BY id LIMIT $4 OFFSET $5",
    )
    .bind(username)
    .bind(nick_name)
    .bind(email)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &UserFilter) -> Result<i64, sqlx::Error> {
    let [username, nick_name, email] = filter.patterns();
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users
         WHERE ($1::text IS NULL OR username ILIKE $1)
           AND ($2::text IS NULL OR nick_name ILIKE $2)
           AND ($3::text IS NULL OR email ILIKE $3)",
    )
    .bind(username)
    .bind(nick_name)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}
