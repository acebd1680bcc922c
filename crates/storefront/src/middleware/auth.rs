//! Authentication extractors.
//!
//! The session holds a [`CurrentUser`] after login. Handlers pick the
//! extractor matching the access they need:
//!
//! - [`RequireAuth`] rejects logged-out clients with 401.
//! - [`RequireAdmin`] additionally rejects non-admins with 403.
//! - [`OptionalAuth`] never rejects.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use orchard_core::AccessSignal;

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::session::keys;

/// Read the logged-in user, if any. Session read failures count as logged out.
async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, please login".to_string()))
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.access().can_edit_catalog() {
            tracing::warn!(user_id = %user.id, "Non-admin attempted catalog edit");
            return Err(AppError::Forbidden("Not authorized as an admin".to_string()));
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl OptionalAuth {
    /// Access signal for the cart and checkout.
    #[must_use]
    pub fn access(&self) -> AccessSignal {
        self.0
            .as_ref()
            .map_or(AccessSignal::ANONYMOUS, CurrentUser::access)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Store the logged-in user, cycling the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Clear the logged-in user (logout). The cart slot is left alone.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}
