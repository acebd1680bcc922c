//! Session-related types.
//!
//! Types stored in the session for authentication state and the cart slot.

use serde::{Deserialize, Serialize};

use orchard_core::{AccessSignal, Email, UserId};

use super::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Admin flag as of login.
    pub is_admin: bool,
}

impl CurrentUser {
    #[must_use]
    pub const fn access(&self) -> AccessSignal {
        AccessSignal::user(self.is_admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart slot: the encoded cart as a JSON string.
    pub const CART_ITEMS: &str = "cart_items";
}
