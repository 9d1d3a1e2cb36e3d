use sqlx::PgPool;

use crate::models::{GrantRow, Grants};

/// Role names and permission codes currently attached to a user.
pub async fn grants_for_user(pool: &PgPool, user_id: i64) -> Result<Grants, sqlx::Error> {
    let rows = sqlx::query_as::<_, GrantRow>(
        "SELECT r.name AS role_name, p.code AS permission_code
         FROM user_roles ur
         JOIN roles r ON r.id = ur.role_id
         LEFT JOIN role_permissions rp ON rp.role_id = r.id
         LEFT JOIN permissions p ON p.id = rp.permission_id
         WHERE ur.user_id = $1
         ORDER BY r.id, p.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(Grants::from_rows(rows))
}
