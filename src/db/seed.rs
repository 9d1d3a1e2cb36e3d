use sqlx::PgPool;

/// A seeded account: username, password hash, nick name, email, admin flag, role name.
pub struct SeedUser<'a> {
    pub username: &'a str,
    pub password_hash: String,
    pub nick_name: &'a str,
    pub email: &'a str,
    pub is_admin: bool,
    pub role: &'a str,
}

/// Insert the reference permissions, roles and demo accounts. Rows that already
/// exist are left alone, so running it twice is harmless.
pub async fn roles_and_users(pool: &PgPool, users: &[SeedUser<'_>]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO permissions (code, description)
         VALUES ('ccc', '访问 ccc 接口'), ('ddd', '访问 ddd 接口')
         ON CONFLICT (code) DO NOTHING",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO roles (name) VALUES ('管理员'), ('普通用户')
         ON CONFLICT (name) DO NOTHING",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT r.id, p.id FROM roles r, permissions p
         WHERE (r.name = '管理员' AND p.code IN ('ccc', 'ddd'))
            OR (r.name = '普通用户' AND p.code = 'ccc')
         ON CONFLICT DO NOTHING",
    )
    .execute(&mut *tx)
    .await?;

    for user in users {
        sqlx::query(
            "INSERT INTO users (username, password, nick_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO NOTHING",
        )
        .bind(user.username)
        .bind(&user.password_hash)
        .bind(user.nick_name)
        .bind(user.email)
        .bind(user.is_admin)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT u.id, r.id FROM users u, roles r
             WHERE u.username = $1 AND r.name = $2
             ON CONFLICT DO NOTHING",
        )
        .bind(user.username)
        .bind(user.role)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
