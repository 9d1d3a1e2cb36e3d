/// One row of the user -> role -> permission join. Roles without permissions
/// appear once with `permission_code = None`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GrantRow {
    pub role_name: String,
    pub permission_code: Option<String>,
}

/// Role names and permission codes held by a user, each deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grants {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl Grants {
    pub fn from_rows(rows: Vec<GrantRow>) -> Self {
        let mut grants = Grants::default();
        for row in rows {
            if !grants.roles.contains(&row.role_name) {
                grants.roles.push(row.role_name);
            }
            if let Some(code) = row.permission_code {
                if !grants.permissions.contains(&code) {
                    grants.permissions.push(code);
                }
            }
        }
        grants
    }
}
