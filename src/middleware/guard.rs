//! Per-route access control.
//!
//! Each route may carry an [`Access`] record saying whether the caller must be
//! logged in and which permission codes it must hold. Records can be declared
//! for a whole group of routes and for a single handler; [`Access::resolve`]
//! lets the handler-level value of each field win over the group-level one.

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Access {
    login: Option<bool>,
    permissions: Option<Vec<&'static str>>,
}

impl Access {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_login(mut self) -> Self {
        self.login = Some(true);
        self
    }

    pub fn allow_anonymous(mut self) -> Self {
        self.login = Some(false);
        self
    }

    pub fn require_permissions(mut self, codes: &[&'static str]) -> Self {
        self.permissions = Some(codes.to_vec());
        self
    }

    /// Combine a group-level record (`self`) with a handler-level one.
    pub fn resolve(&self, handler: &Access) -> Access {
        Access {
            login: handler.login.or(self.login),
            permissions: handler
                .permissions
                .clone()
                .or_else(|| self.permissions.clone()),
        }
    }

    pub fn login_required(&self) -> bool {
        self.login.unwrap_or(false)
    }

    pub fn required_permissions(&self) -> &[&'static str] {
        self.permissions.as_deref().unwrap_or(&[])
    }
}

/// Fails with `Forbidden` on the first required code the caller doesn't hold.
pub fn check_permissions(granted: &[String], required: &[&str]) -> Result<(), AppError> {
    for code in required {
        if !granted.iter().any(|g| g == code) {
            tracing::debug!("Missing permission {code}");
            return Err(AppError::Forbidden(
                "You do not have permission to access this endpoint".to_string(),
            ));
        }
    }
    Ok(())
}

/// Middleware: authenticate when the route requires login, then check permissions.
/// Requests that carry no resolved identity pass the permission stage untouched.
pub async fn enforce(
    State((state, access)): State<(SharedState, Access)>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if access.login_required() {
        let user = AuthUser::from_headers(req.headers(), &state.config.jwt_secret)?;
        req.extensions_mut().insert(user);
    }

    if let Some(user) = req.extensions().get::<AuthUser>() {
        check_permissions(&user.permissions, access.required_permissions())?;
    }

    Ok(next.run(req).await)
}

/// Attach an access record to a single route.
pub fn guarded(
    route: MethodRouter<SharedState>,
    state: &SharedState,
    access: Access,
) -> MethodRouter<SharedState> {
    route.route_layer(middleware::from_fn_with_state(
        (state.clone(), access),
        enforce,
    ))
}
