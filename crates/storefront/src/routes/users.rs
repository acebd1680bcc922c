//! Account route handlers: register, login, logout, current user.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use orchard_core::{AccessSignal, UserId};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
        }
    }
}

/// Who is asking: the access signal plus their profile when logged in.
#[derive(Debug, Serialize)]
pub struct MeView {
    pub access: AccessSignal,
    pub user: Option<UserView>,
}

/// Put `user` in the session and return their profile.
async fn log_in(session: &Session, user: &User) -> Result<UserView> {
    let current = CurrentUser::from(user);
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(UserView::from(&current))
}

/// Create an account and log it in.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .register(&request.name, &request.email, &request.password)
        .await?;

    let view = log_in(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Log in with email and password.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserView>> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(log_in(&session, &user).await?))
}

/// Log out. The cart stays with the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(json!({ "message": "Logged out" })))
}

/// Current access signal and profile.
#[instrument(skip(auth))]
pub async fn me(auth: OptionalAuth) -> Json<MeView> {
    Json(MeView {
        access: auth.access(),
        user: auth.0.as_ref().map(UserView::from),
    })
}
