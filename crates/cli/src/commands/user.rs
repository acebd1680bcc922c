//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant catalog editing rights
//! orchard-cli user promote -e jane@example.com
//!
//! # Revoke them
//! orchard-cli user promote -e jane@example.com --revoke
//! ```

use orchard_core::{Email, EmailError};
use orchard_storefront::db::{RepositoryError, UserRepository};
use thiserror::Error;

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No user with email: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Set a user's admin flag.
///
/// # Errors
///
/// Returns `UserCommandError::NotFound` if no account uses this email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), UserCommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_admin(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserCommandError::NotFound(email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        is_admin = user.is_admin,
        "Admin flag updated"
    );
    Ok(())
}
