//! Authentication route handlers.
//!
//! Registration and login are role-scoped: the same login name can exist
//! once per role, and a login attempt only matches accounts under the
//! submitted role. Form failures redirect back with an `error` query
//! parameter rather than surfacing a status page.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use paddyhouse_core::Role;

use crate::middleware::{clear_current_account, set_current_account};
use crate::models::CurrentAccount;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub role: String,
    pub full_name: String,
    pub login_name: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub role: String,
    pub login_name: String,
    pub password: String,
}

/// Landing page after a successful login, per role.
const fn dashboard_for(role: Role) -> &'static str {
    match role {
        Role::Farmer => "/farmer/dashboard",
        Role::Customer => "/customer/dashboard",
        Role::Admin => "/admin/orders",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle registration form submission.
#[instrument(skip_all, fields(role = %form.role, login_name = %form.login_name))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let Ok(role) = form.role.parse::<Role>() else {
        return Redirect::to("/auth/register?error=role").into_response();
    };

    let auth = AuthService::new(state.pool());
    match auth
        .register(
            role,
            &form.full_name,
            &form.login_name,
            &form.password,
            &form.email,
        )
        .await
    {
        Ok(account) => {
            tracing::info!(account_id = %account.id, "account registered");
            Redirect::to("/auth/login?success=registered").into_response()
        }
        Err(AuthError::DuplicateLogin) => {
            Redirect::to("/auth/register?error=duplicate").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/register?error=weak_password").into_response()
        }
        Err(AuthError::MissingField(_)) => {
            Redirect::to("/auth/register?error=missing_field").into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            Redirect::to("/auth/register?error=internal").into_response()
        }
    }
}

/// Handle login form submission.
#[instrument(skip_all, fields(role = %form.role, login_name = %form.login_name))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let Ok(role) = form.role.parse::<Role>() else {
        return Redirect::to("/auth/login?error=role").into_response();
    };

    let auth = AuthService::new(state.pool());
    match auth.login(role, &form.login_name, &form.password).await {
        Ok(account) => {
            let current = CurrentAccount::from_account(&account);
            if let Err(e) = set_current_account(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            Redirect::to(dashboard_for(role)).into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            Redirect::to("/auth/login?error=internal").into_response()
        }
    }
}

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_account(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    Redirect::to("/auth/login").into_response()
}
