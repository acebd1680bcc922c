//! Access signal supplied by the authentication layer.

use serde::{Deserialize, Serialize};

/// What the current client is allowed to do.
///
/// Produced by whatever authenticates requests (the storefront derives it from
/// the session). Checkout reads only `is_authenticated`; catalog editing
/// requires `is_admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSignal {
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl AccessSignal {
    /// Nobody logged in.
    pub const ANONYMOUS: Self = Self {
        is_authenticated: false,
        is_admin: false,
    };

    /// A logged-in user, admin or not.
    #[must_use]
    pub const fn user(is_admin: bool) -> Self {
        Self {
            is_authenticated: true,
            is_admin,
        }
    }

    /// Admin rights only count for an authenticated user.
    #[must_use]
    pub const fn can_edit_catalog(&self) -> bool {
        self.is_authenticated && self.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_cannot_edit() {
        assert!(!AccessSignal::ANONYMOUS.can_edit_catalog());
        assert!(!AccessSignal::default().is_authenticated);
    }

    #[test]
    fn test_admin_flag_requires_login() {
        let forged = AccessSignal {
            is_authenticated: false,
            is_admin: true,
        };
        assert!(!forged.can_edit_catalog());
        assert!(AccessSignal::user(true).can_edit_catalog());
        assert!(!AccessSignal::user(false).can_edit_catalog());
    }
}
