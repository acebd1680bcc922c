//! User domain types.

use chrono::{DateTime, Utc};

use orchard_core::{AccessSignal, Email, UserId};

/// A storefront account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, stored lowercased.
    pub email: Email,
    /// Whether this user may edit the catalog.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn access(&self) -> AccessSignal {
        AccessSignal::user(self.is_admin)
    }
}
